use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for rPresence
/// Presence tracking from an MJPEG camera feed, with a daily attendance record in SQLite
#[derive(Parser)]
#[command(
    name = "rpresence",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track the presence of a person in front of a camera and keep a daily attendance record in SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database, data directories and configuration
    Init,

    /// Manage the configuration file (view, validate or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Validate the effective configuration")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Record a presence transition by hand
    Mark {
        /// present | absent
        status: String,

        #[arg(long = "at", help = "Transition time (YYYY-MM-DD HH:MM:SS, default: now)")]
        at: Option<String>,

        #[arg(long = "person", help = "Person name (default: person_name from config)")]
        person: Option<String>,
    },

    /// List the attendance records of a day
    List {
        #[arg(long = "date", help = "Day to list (YYYY-MM-DD, default: today)")]
        date: Option<String>,
    },

    /// Show the current attendance status of a day
    Status {
        #[arg(long = "date", help = "Day to report (YYYY-MM-DD, default: today)")]
        date: Option<String>,

        #[arg(long = "json", help = "Print the full report as JSON")]
        json: bool,
    },

    /// Ingest an MJPEG stream and track presence
    Watch {
        /// MJPEG file, or '-' to read from stdin
        input: String,

        #[arg(
            long = "detections",
            value_name = "CSV",
            help = "Face detections per frame (frame,x,y,width,height)"
        )]
        detections: PathBuf,

        #[arg(long = "fps", help = "Stamp frames at a fixed rate instead of wall-clock time")]
        fps: Option<f64>,

        #[arg(
            long = "start",
            requires = "fps",
            help = "Timestamp of the first frame when --fps is used"
        )]
        start: Option<String>,
    },
}
