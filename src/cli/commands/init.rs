use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::AttendanceStore;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file
///  - the faces and day-log directories
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    println!("⚙️  Initializing rPresence…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", &cfg.database);
    println!("🖼️  Faces      : {}", cfg.faces_path().display());
    println!("📝 Day logs   : {}", cfg.logs_path().display());

    let store = AttendanceStore::open(&cfg.database)?;
    println!("✅ Database initialized at {}", &cfg.database);

    if let Err(e) = store.audit(
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    ) {
        eprintln!("⚠️ Failed to write internal log: {}", e);
    }

    println!("🎉 rPresence initialization completed!");
    Ok(())
}
