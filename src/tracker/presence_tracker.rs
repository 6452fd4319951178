use crate::models::{AttendanceStatus, BoundingBox, Transition};
use crate::stream::Stamp;
use chrono::NaiveDateTime;
use std::time::Duration;

/// What one frame produced: at most one state change and at most one capture request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    pub transition: Option<Transition>,
    /// First detected face of the frame that opened a present run.
    pub capture: Option<BoundingBox>,
}

/// Debounces the per-frame "face seen" signal into PRESENT/ABSENT.
///
/// Presence is asserted on the first frame with a detection. Absence is only
/// declared once no detection has been seen for strictly more than the
/// threshold. Between the two the published state holds.
///
/// Gaps are measured on the stamp's monotonic `elapsed`, so a wall clock
/// stepping back (DST, NTP) does not stretch the debounce. Emitted wall
/// times never go backwards.
///
/// Pure state machine: no I/O, no clock. Callers feed frames in stream order.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    threshold: Duration,
    raw_present: bool,
    last_positive: Option<Duration>,
    last_elapsed: Option<Duration>,
    last_wall: Option<NaiveDateTime>,
    debounced: AttendanceStatus,
    image_captured_this_run: bool,
}

impl PresenceTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            raw_present: false,
            last_positive: None,
            last_elapsed: None,
            last_wall: None,
            debounced: AttendanceStatus::Absent,
            image_captured_this_run: false,
        }
    }

    pub fn status(&self) -> AttendanceStatus {
        self.debounced
    }

    /// Detection result of the most recent frame, before debouncing.
    pub fn raw_present(&self) -> bool {
        self.raw_present
    }

    /// Monotonic offset of the last frame with a face.
    pub fn last_positive(&self) -> Option<Duration> {
        self.last_positive
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn observe(&mut self, stamp: Stamp, detections: &[BoundingBox]) -> Observation {
        let at = match self.last_wall {
            Some(prev) if stamp.wall < prev => prev,
            _ => stamp.wall,
        };
        let elapsed = match self.last_elapsed {
            Some(prev) if stamp.elapsed < prev => prev,
            _ => stamp.elapsed,
        };
        self.last_wall = Some(at);
        self.last_elapsed = Some(elapsed);
        self.raw_present = !detections.is_empty();

        let candidate = if self.raw_present {
            self.last_positive = Some(elapsed);
            AttendanceStatus::Present
        } else {
            match self.last_positive {
                Some(seen) if elapsed.saturating_sub(seen) <= self.threshold => self.debounced,
                _ => AttendanceStatus::Absent,
            }
        };

        let mut obs = Observation::default();

        if candidate != self.debounced {
            self.debounced = candidate;
            if candidate == AttendanceStatus::Absent {
                self.image_captured_this_run = false;
            }
            obs.transition = Some(Transition::new(at, candidate));
        }

        if self.debounced.is_present()
            && !self.image_captured_this_run
            && let Some(first) = detections.first()
        {
            self.image_captured_this_run = true;
            obs.capture = Some(*first);
        }

        obs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use rstest::rstest;

    fn t(secs: f64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            + TimeDelta::milliseconds((secs * 1000.0) as i64)
    }

    /// Wall and monotonic time agree, as on a clock that never steps.
    fn at(secs: f64) -> Stamp {
        Stamp::new(t(secs), Duration::from_secs_f64(secs))
    }

    fn faces(n: usize) -> Vec<BoundingBox> {
        (0..n as u32)
            .map(|i| BoundingBox::new(10 + 60 * i, 20, 50, 50))
            .collect()
    }

    fn tracker() -> PresenceTracker {
        PresenceTracker::new(Duration::from_secs(5))
    }

    /// Feed (time, face count) pairs and collect every emitted transition.
    fn run(tr: &mut PresenceTracker, frames: &[(f64, usize)]) -> Vec<Observation> {
        frames
            .iter()
            .map(|&(s, n)| tr.observe(at(s), &faces(n)))
            .collect()
    }

    #[test]
    fn absence_declared_only_after_threshold() {
        let mut tr = tracker();
        let obs = run(
            &mut tr,
            &[(0.0, 1), (1.0, 0), (2.0, 0), (3.0, 0), (4.0, 0), (6.0, 0)],
        );

        assert_eq!(
            obs[0].transition,
            Some(Transition::new(t(0.0), AttendanceStatus::Present))
        );
        for o in &obs[1..5] {
            assert_eq!(o.transition, None);
        }
        assert_eq!(
            obs[5].transition,
            Some(Transition::new(t(6.0), AttendanceStatus::Absent))
        );
        assert_eq!(tr.last_positive(), Some(Duration::ZERO));
        assert_eq!(tr.threshold(), Duration::from_secs(5));
    }

    #[test]
    fn exactly_threshold_keeps_presence() {
        let mut tr = tracker();
        let obs = run(&mut tr, &[(0.0, 1), (5.0, 0)]);
        assert_eq!(obs[1].transition, None);
        assert_eq!(tr.status(), AttendanceStatus::Present);
    }

    #[test]
    fn capture_fires_once_per_present_run() {
        let mut tr = tracker();
        let obs = run(&mut tr, &[(0.0, 1), (1.0, 1), (10.0, 0), (11.0, 1)]);

        assert_eq!(obs[0].capture, Some(faces(1)[0]));
        assert_eq!(obs[1].capture, None);
        assert_eq!(
            obs[2].transition,
            Some(Transition::new(t(10.0), AttendanceStatus::Absent))
        );
        assert_eq!(obs[2].capture, None);
        assert_eq!(
            obs[3].transition,
            Some(Transition::new(t(11.0), AttendanceStatus::Present))
        );
        assert_eq!(obs[3].capture, Some(faces(1)[0]));
    }

    #[test]
    fn capture_uses_first_face() {
        let mut tr = tracker();
        let boxes = faces(3);
        let obs = tr.observe(at(0.0), &boxes);
        assert_eq!(obs.capture, Some(boxes[0]));
    }

    #[test]
    fn initial_empty_frames_emit_nothing() {
        let mut tr = tracker();
        let obs = run(&mut tr, &[(0.0, 0), (7.0, 0), (20.0, 0)]);
        assert!(obs.iter().all(|o| o.transition.is_none() && o.capture.is_none()));
        assert_eq!(tr.status(), AttendanceStatus::Absent);
    }

    #[test]
    fn flicker_inside_band_is_suppressed() {
        let mut tr = tracker();
        let obs = run(
            &mut tr,
            &[(0.0, 1), (2.0, 0), (4.0, 1), (8.0, 0), (9.0, 1), (13.0, 0)],
        );
        let transitions: Vec<_> = obs.iter().filter_map(|o| o.transition).collect();
        assert_eq!(transitions.len(), 1);
        assert!(obs.iter().skip(1).all(|o| o.capture.is_none()));
    }

    #[test]
    fn backwards_wall_clock_does_not_reorder_events() {
        let mut tr = tracker();
        tr.observe(Stamp::new(t(10.0), Duration::from_secs(10)), &faces(1));
        let obs = tr.observe(Stamp::new(t(3.0), Duration::from_secs(11)), &[]);
        assert_eq!(obs.transition, None);
        let obs = tr.observe(Stamp::new(t(4.0), Duration::from_secs(16)), &[]);
        // Absence is due on elapsed time; the wall time is held at the last seen value.
        assert_eq!(
            obs.transition,
            Some(Transition::new(t(10.0), AttendanceStatus::Absent))
        );
    }

    #[test]
    fn absence_still_fires_after_an_hour_step_back() {
        let mut tr = tracker();
        let before = NaiveDate::from_ymd_opt(2025, 10, 26)
            .unwrap()
            .and_hms_opt(2, 59, 59)
            .unwrap();
        tr.observe(Stamp::new(before, Duration::ZERO), &faces(1));

        // Wall time jumps back to 02:00:00 and then ticks on.
        let back = before - TimeDelta::seconds(3599);
        let transitions: Vec<(u64, Transition)> = (1..=1800u64)
            .filter_map(|s| {
                let stamp = Stamp::new(
                    back + TimeDelta::seconds(s as i64),
                    Duration::from_secs(s),
                );
                tr.observe(stamp, &[]).transition.map(|tr| (s, tr))
            })
            .collect();

        assert_eq!(transitions.len(), 1);
        let (sec, tr_absent) = transitions[0];
        assert_eq!(sec, 6);
        assert_eq!(tr_absent.status, AttendanceStatus::Absent);
        assert_eq!(tr_absent.at, before);
    }

    #[test]
    fn monotonic_time_going_back_is_held() {
        let mut tr = tracker();
        tr.observe(at(10.0), &faces(1));
        let obs = tr.observe(Stamp::new(t(20.0), Duration::from_secs(2)), &[]);
        assert_eq!(obs.transition, None);
        assert_eq!(tr.status(), AttendanceStatus::Present);
    }

    #[rstest]
    #[case(vec![1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 1])]
    #[case(vec![0, 0, 2, 0, 1, 0, 0, 0, 0, 0, 0, 0, 3, 3, 0, 0, 0, 0, 0, 0, 0])]
    #[case(vec![1, 1, 1, 1, 1, 1, 1, 1])]
    #[case(vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0])]
    fn transitions_strictly_alternate(#[case] counts: Vec<usize>) {
        let mut tr = tracker();
        let frames: Vec<(f64, usize)> = counts
            .iter()
            .enumerate()
            .map(|(i, &n)| (i as f64, n))
            .collect();
        let obs = run(&mut tr, &frames);

        let transitions: Vec<Transition> = obs.iter().filter_map(|o| o.transition).collect();
        let mut expect = AttendanceStatus::Present;
        let mut prev_at = None;
        for tr in &transitions {
            assert_eq!(tr.status, expect);
            if let Some(p) = prev_at {
                assert!(tr.at >= p);
            }
            prev_at = Some(tr.at);
            expect = match expect {
                AttendanceStatus::Present => AttendanceStatus::Absent,
                AttendanceStatus::Absent => AttendanceStatus::Present,
            };
        }

        let presents = transitions
            .iter()
            .filter(|t| t.status == AttendanceStatus::Present)
            .count();
        let captures = obs.iter().filter(|o| o.capture.is_some()).count();
        assert_eq!(captures, presents);

        // A capture never comes without the PRESENT transition that opened its run.
        for o in obs.iter().filter(|o| o.capture.is_some()) {
            assert_eq!(
                o.transition.map(|t| t.status),
                Some(AttendanceStatus::Present)
            );
        }
    }
}
