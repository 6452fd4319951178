//! rPresence main entrypoint.

use rpresence::run;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run() {
        if e.is_fatal() {
            log::error!("startup aborted: {}", e);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
