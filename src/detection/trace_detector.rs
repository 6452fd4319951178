use super::face_detector::FaceDetector;
use crate::errors::{AppError, AppResult};
use crate::models::BoundingBox;
use crate::stream::frame::Frame;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TraceRow {
    frame: usize,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Replays detections recorded by an external detector.
///
/// CSV with header `frame,x,y,width,height`, one row per face. Frames with
/// no rows had no face.
#[derive(Debug, Default, Clone)]
pub struct TraceDetector {
    boxes: HashMap<usize, Vec<BoundingBox>>,
}

impl TraceDetector {
    /// Load the trace. A missing or unreadable file means there is no
    /// detector to run with, which is fatal.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::DetectorUnavailable(format!("{}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
            .map_err(|e| AppError::DetectorUnavailable(format!("{}: {}", path.display(), e)))
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut boxes: HashMap<usize, Vec<BoundingBox>> = HashMap::new();
        for row in rdr.deserialize() {
            let r: TraceRow = row?;
            boxes
                .entry(r.frame)
                .or_default()
                .push(BoundingBox::new(r.x, r.y, r.width, r.height));
        }
        Ok(Self { boxes })
    }

    /// Number of frames with at least one face.
    pub fn frames_with_faces(&self) -> usize {
        self.boxes.len()
    }
}

impl FaceDetector for TraceDetector {
    fn detect(&mut self, frame: &Frame) -> AppResult<Vec<BoundingBox>> {
        Ok(self.boxes.get(&frame.index()).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Stamp;
    use chrono::NaiveDate;
    use image::{DynamicImage, RgbImage};
    use std::time::Duration;

    fn frame(index: usize) -> Frame {
        let at = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Frame::new(
            DynamicImage::ImageRgb8(RgbImage::new(4, 4)),
            index,
            Stamp::new(at, Duration::from_secs(index as u64)),
        )
    }

    #[test]
    fn replays_boxes_per_frame() {
        let csv = "frame,x,y,width,height\n\
                   # warm-up frames have no faces\n\
                   2, 10, 12, 50, 50\n\
                   2, 80, 12, 40, 40\n\
                   5, 0, 0, 60, 60\n";
        let mut det = TraceDetector::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(det.frames_with_faces(), 2);
        assert!(det.detect(&frame(0)).unwrap().is_empty());
        assert_eq!(
            det.detect(&frame(2)).unwrap(),
            vec![BoundingBox::new(10, 12, 50, 50), BoundingBox::new(80, 12, 40, 40)]
        );
        assert_eq!(det.detect(&frame(5)).unwrap().len(), 1);
    }

    #[test]
    fn missing_trace_is_fatal() {
        let err = TraceDetector::from_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, AppError::DetectorUnavailable(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn malformed_row_is_rejected() {
        let csv = "frame,x,y,width,height\n1,2,3\n";
        assert!(TraceDetector::from_reader(csv.as_bytes()).is_err());
    }
}
