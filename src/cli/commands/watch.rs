use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::watch::{WatchLogic, WatchOptions};
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch {
        input,
        detections,
        fps,
        start,
    } = cmd
    {
        let opts = WatchOptions {
            input: input.clone(),
            detections: detections.clone(),
            fps: *fps,
            start: start.clone(),
        };
        WatchLogic::run(cfg.clone(), &opts)?;
    }

    Ok(())
}
