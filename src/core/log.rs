use crate::db::log::{LogRow, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;

const MAX_OP_WIDTH: usize = 60;

/// Colour of the operation column.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "mark" => Colour::Green,
        "watch_start" => Colour::Cyan,
        "watch_stop" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        "vacuum" => Colour::Yellow,
        "fault" => Colour::Red,
        _ => Colour::White,
    }
}

fn op_target(row: &LogRow) -> String {
    if row.target.is_empty() {
        row.operation.clone()
    } else {
        format!("{} ({})", row.operation, row.target)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let entries = load_log(&pool.conn)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        // Widths are measured on plain text; colour is added afterwards.
        let plain: Vec<String> = entries
            .iter()
            .map(|r| truncate(&op_target(r), MAX_OP_WIDTH))
            .collect();
        let op_w = plain.iter().map(|s| s.chars().count()).max().unwrap_or(10);
        let id_w = entries
            .iter()
            .map(|r| r.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries
            .iter()
            .map(|r| r.date.len())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");

        for (row, text) in entries.iter().zip(plain) {
            let color = color_for_operation(&row.operation);
            let padding = " ".repeat(op_w.saturating_sub(text.chars().count()));

            let colored = match text.split_once(' ') {
                Some((op, rest)) => format!("{} {}", color.paint(op), rest),
                None => color.paint(text.as_str()).to_string(),
            };

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                row.id,
                row.date,
                colored,
                padding,
                row.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_targets_are_cut() {
        let s = "x".repeat(80);
        let t = truncate(&s, 60);
        assert_eq!(t.chars().count(), 60);
        assert!(t.ends_with("..."));
        assert_eq!(truncate("mark (Person 1)", 60), "mark (Person 1)");
    }
}
