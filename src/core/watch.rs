use crate::config::Config;
use crate::detection::TraceDetector;
use crate::errors::{AppError, AppResult};
use crate::pipeline::{AppContext, PresencePipeline, RunSummary};
use crate::stream::{Clock, FixedRateClock, MjpegFrameSource, SystemClock};
use crate::ui::messages::{error, info, success, warning};
use crate::utils::time::{now_local, parse_cli_datetime};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Options of a `watch` run.
pub struct WatchOptions {
    /// MJPEG file, or `-` for stdin.
    pub input: String,
    pub detections: PathBuf,
    /// Stamp frames at a fixed rate instead of reading the wall clock.
    pub fps: Option<f64>,
    pub start: Option<String>,
}

pub struct WatchLogic;

impl WatchLogic {
    pub fn run(cfg: Config, opts: &WatchOptions) -> AppResult<RunSummary> {
        // Everything that can fail for good happens before the first frame.
        let ctx = AppContext::open(cfg)?;
        let mut detector = TraceDetector::from_path(&opts.detections)?;
        let mut pipeline = ctx.pipeline()?;
        let reader = open_input(&opts.input)?;
        let replay_clock = match opts.fps {
            Some(fps) => {
                let start = match &opts.start {
                    Some(s) => parse_cli_datetime(s)?,
                    None => now_local(),
                };
                let clock = FixedRateClock::new(start, fps)
                    .map_err(|e| AppError::Config(format!("--fps {}: {}", fps, e)))?;
                Some(clock)
            }
            None => None,
        };

        let stop = Arc::new(AtomicBool::new(false));
        {
            let stop = Arc::clone(&stop);
            if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed)) {
                warning(format!("Ctrl-C handler not installed: {}", e));
            }
        }

        let person = ctx.config.person_name.clone();
        audit(&ctx, "watch_start", &person, &format!("input={}", opts.input));
        info(format!(
            "Watching {} for {} ({} frame(s) with faces in trace)",
            display_input(&opts.input),
            person,
            detector.frames_with_faces()
        ));

        let min_bytes = ctx.config.min_frame_bytes;
        let summary = match replay_clock {
            Some(clock) => drive(&mut pipeline, reader, clock, min_bytes, &mut detector, &stop),
            None => drive(
                &mut pipeline,
                reader,
                SystemClock::new(),
                min_bytes,
                &mut detector,
                &stop,
            ),
        };

        let msg = format!(
            "frames={} skipped={} transitions={} captures={} faults={}",
            summary.frames, summary.skipped, summary.transitions, summary.captures, summary.faults
        );
        audit(&ctx, "watch_stop", &person, &msg);
        if let Some(e) = &summary.transport_error {
            audit(&ctx, "fault", &opts.input, e);
        }
        print_summary(&summary, pipeline.tracker().status().to_string());

        Ok(summary)
    }
}

fn drive<C: Clock>(
    pipeline: &mut PresencePipeline,
    reader: Box<dyn Read>,
    clock: C,
    min_frame_bytes: usize,
    detector: &mut TraceDetector,
    stop: &AtomicBool,
) -> RunSummary {
    let mut source = MjpegFrameSource::new(reader, clock, min_frame_bytes);
    pipeline.run(&mut source, detector, stop)
}

fn open_input(input: &str) -> AppResult<Box<dyn Read>> {
    if input == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(input)
        .map_err(|e| AppError::Io(io::Error::new(e.kind(), format!("{}: {}", input, e))))?;
    Ok(Box::new(BufReader::new(file)))
}

fn display_input(input: &str) -> &str {
    if input == "-" { "stdin" } else { input }
}

fn audit(ctx: &AppContext, op: &str, target: &str, msg: &str) {
    if let Err(e) = ctx.store.audit(op, target, msg) {
        log::warn!("internal log write failed: {}", e);
    }
}

fn print_summary(summary: &RunSummary, final_status: String) {
    println!();
    println!("🎞️  Frames processed : {}", summary.frames);
    println!("⏭️  Frames skipped   : {}", summary.skipped);
    println!("🔁 Transitions      : {}", summary.transitions);
    println!("📸 Faces captured   : {}", summary.captures);
    println!("📍 Final status     : {}", final_status);

    if summary.faults > 0 {
        warning(format!("{} fault(s) during ingestion, see log output", summary.faults));
    }
    if let Some(e) = &summary.transport_error {
        error(format!("Stream ended early: {}", e));
    } else if summary.stopped {
        info("Stopped on request.");
    } else {
        success("End of stream.");
    }
}
