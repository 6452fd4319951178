pub mod config;
pub mod log;
pub mod mark;
pub mod status;
pub mod watch;
