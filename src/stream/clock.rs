use crate::errors::{AppError, AppResult};
use crate::utils::time::now_local;
use chrono::{NaiveDateTime, TimeDelta};
use std::time::{Duration, Instant};

/// Slowest and fastest replay rates `FixedRateClock` accepts.
pub const MIN_FPS: f64 = 0.001;
pub const MAX_FPS: f64 = 1000.0;

/// When a frame was taken.
///
/// `wall` is local time and goes into records and logs. `elapsed` is time
/// since the clock started; it never goes backwards and is what debouncing
/// measures gaps with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub wall: NaiveDateTime,
    pub elapsed: Duration,
}

impl Stamp {
    pub fn new(wall: NaiveDateTime, elapsed: Duration) -> Self {
        Self { wall, elapsed }
    }
}

/// Source of frame timestamps.
pub trait Clock: Send {
    fn now(&mut self) -> AppResult<Stamp>;
}

/// Local wall time plus a monotonic offset, for live streams.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> AppResult<Stamp> {
        Ok(Stamp::new(now_local(), self.origin.elapsed()))
    }
}

/// `start + n / fps` for the n-th call, for replaying recorded streams.
#[derive(Debug, Clone)]
pub struct FixedRateClock {
    start: NaiveDateTime,
    step: Duration,
    /// `None` once the offset no longer fits.
    next: Option<Duration>,
}

impl FixedRateClock {
    pub fn new(start: NaiveDateTime, fps: f64) -> Result<Self, &'static str> {
        if !(fps.is_finite() && (MIN_FPS..=MAX_FPS).contains(&fps)) {
            return Err("fps must be between 0.001 and 1000");
        }
        let step = Duration::from_micros((1_000_000.0 / fps).round() as u64);
        Ok(Self {
            start,
            step,
            next: Some(Duration::ZERO),
        })
    }
}

impl Clock for FixedRateClock {
    fn now(&mut self) -> AppResult<Stamp> {
        let out_of_range = || AppError::Clock(format!("replay time past {} overflows", self.start));

        let elapsed = self.next.ok_or_else(out_of_range)?;
        let wall = TimeDelta::from_std(elapsed)
            .ok()
            .and_then(|d| self.start.checked_add_signed(d))
            .ok_or_else(out_of_range)?;

        self.next = elapsed.checked_add(self.step);
        Ok(Stamp::new(wall, elapsed))
    }
}
