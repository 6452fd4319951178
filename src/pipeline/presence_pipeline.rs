use crate::archive::FaceArchiver;
use crate::detection::FaceDetector;
use crate::errors::{AppError, AppResult};
use crate::eventlog::EventLog;
use crate::models::{BoundingBox, Transition};
use crate::store::{AttendanceStore, RecordOutcome};
use crate::stream::{Frame, FrameSource};
use crate::tracker::PresenceTracker;
use crate::utils::time::fmt_hms;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Result of one frame. Faults are collected here, never raised.
#[derive(Debug, Default)]
pub struct FrameOutcome {
    pub transition: Option<Transition>,
    pub image: Option<PathBuf>,
    pub record: Option<RecordOutcome>,
    pub faults: Vec<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub skipped: usize,
    pub transitions: usize,
    pub captures: usize,
    pub faults: usize,
    pub stopped: bool,
    pub transport_error: Option<String>,
}

/// Frames → tracker → {store, archiver, day log}.
pub struct PresencePipeline {
    person: String,
    tracker: PresenceTracker,
    store: Arc<AttendanceStore>,
    archiver: FaceArchiver,
    event_log: EventLog,
    store_retries: u32,
}

impl PresencePipeline {
    pub fn new(
        person: &str,
        tracker: PresenceTracker,
        store: Arc<AttendanceStore>,
        archiver: FaceArchiver,
        event_log: EventLog,
        store_retries: u32,
    ) -> Self {
        Self {
            person: person.to_string(),
            tracker,
            store,
            archiver,
            event_log,
            store_retries,
        }
    }

    pub fn tracker(&self) -> &PresenceTracker {
        &self.tracker
    }

    /// Feed one frame. The tracker only requests a capture on the frame
    /// that opens a present run, so a captured image always travels with
    /// its PRESENT transition into the store.
    pub fn process(&mut self, frame: &Frame, detections: &[BoundingBox]) -> FrameOutcome {
        let obs = self.tracker.observe(frame.stamp(), detections);
        let mut out = FrameOutcome {
            transition: obs.transition,
            ..FrameOutcome::default()
        };

        if let Some(face) = obs.capture {
            match self.archiver.archive(frame, &face) {
                Ok(path) => out.image = Some(path),
                Err(e) => {
                    log::warn!("face capture on frame #{} failed: {}", frame.index(), e);
                    out.faults.push(e);
                }
            }
        }

        let Some(tr) = obs.transition else {
            return out;
        };
        let image_ref = out.image.as_ref().map(|p| p.to_string_lossy().to_string());

        match self.record_with_retry(&tr, image_ref.as_deref()) {
            Ok(rec) => out.record = Some(rec),
            Err(e) => {
                log::error!("attendance write for {} failed: {}", self.person, e);
                out.faults.push(e);
            }
        }

        // The day log mirrors applied store writes only.
        if out.record.is_some_and(|r| r.is_write()) {
            if let Err(e) = self.event_log.append(&self.person, &tr) {
                log::warn!("day log append failed: {}", e);
                out.faults.push(e);
            }
            log::info!("{} is now {} at {}", self.person, tr.status, fmt_hms(&tr.at));
        }

        out
    }

    fn record_with_retry(&self, tr: &Transition, image: Option<&str>) -> AppResult<RecordOutcome> {
        let mut attempt = 0;
        loop {
            match self
                .store
                .record_transition(&self.person, tr.at, tr.status, image)
            {
                Ok(rec) => return Ok(rec),
                Err(e) if e.is_transient() && attempt < self.store_retries => {
                    attempt += 1;
                    log::warn!("attendance write failed ({}), retry {}", e, attempt);
                    thread::sleep(RETRY_BACKOFF * attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Drive the pipeline until the source ends or `stop` is raised.
    /// `stop` is checked between frames only.
    pub fn run<S, D>(&mut self, source: &mut S, detector: &mut D, stop: &AtomicBool) -> RunSummary
    where
        S: FrameSource + ?Sized,
        D: FaceDetector + ?Sized,
    {
        let mut summary = RunSummary::default();

        loop {
            if stop.load(Ordering::Relaxed) {
                summary.stopped = true;
                break;
            }
            let Some(next) = source.next_frame() else {
                break;
            };

            let frame = match next {
                Ok(f) => f,
                Err(e @ AppError::Frame { .. }) => {
                    log::warn!("skipping frame: {}", e);
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    log::error!("frame source failed: {}", e);
                    summary.transport_error = Some(e.to_string());
                    break;
                }
            };
            summary.frames += 1;

            let detections = match detector.detect(&frame) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("detector failed on frame #{}: {}", frame.index(), e);
                    summary.skipped += 1;
                    continue;
                }
            };

            let outcome = self.process(&frame, &detections);
            summary.transitions += usize::from(outcome.transition.is_some());
            summary.captures += usize::from(outcome.image.is_some());
            summary.faults += outcome.faults.len();
        }

        summary
    }
}
