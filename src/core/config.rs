use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use std::fs;
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(path: &Path) -> AppResult<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        println!("{}", content);
        Ok(())
    }

    /// Validate the effective configuration and show the values that matter
    /// for tracking.
    pub fn check(cfg: &Config) -> AppResult<()> {
        cfg.check()?;
        println!("📄 database          : {}", cfg.database);
        println!("🖼️  faces_dir         : {}", cfg.faces_path().display());
        println!("📝 logs_dir          : {}", cfg.logs_path().display());
        println!("👤 person            : {} ({})", cfg.person_name, cfg.person_role);
        println!("⏱️  absence_threshold : {}s", cfg.absence_threshold);
        println!("💾 save_interval     : {}s", cfg.save_interval);
        warning("save_interval is a legacy setting: faces are captured once per present run.");
        success("Configuration is valid.");
        Ok(())
    }

    pub fn edit(path: &Path, editor: &Option<String>) -> AppResult<()> {
        let ed = editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| {
                if cfg!(target_os = "windows") {
                    "notepad".into()
                } else {
                    "nano".into()
                }
            });

        let status = Command::new(&ed)
            .arg(path)
            .status()
            .map_err(|e| AppError::Config(format!("cannot launch '{}': {}", ed, e)))?;

        if !status.success() {
            return Err(AppError::Config(format!("editor '{}' exited with {}", ed, status)));
        }

        // Re-read to catch a broken file right away.
        Config::load_from(path)?.check()?;
        success("Configuration saved.");
        Ok(())
    }
}
