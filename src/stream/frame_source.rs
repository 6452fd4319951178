use super::clock::Clock;
use super::frame::Frame;
use super::mjpeg::MjpegSplitter;
use crate::errors::{AppError, AppResult};
use image::ImageFormat;
use std::io::Read;

/// Supplies decoded frames in stream order.
///
/// `Some(Err(AppError::Frame { .. }))` is a single bad frame: skip it and
/// keep reading. Any other error means the transport is gone.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<AppResult<Frame>>;
}

/// JPEG frames out of an MJPEG byte stream, stamped on arrival.
pub struct MjpegFrameSource<R: Read, C: Clock> {
    splitter: MjpegSplitter<R>,
    clock: C,
    index: usize,
}

impl<R: Read, C: Clock> MjpegFrameSource<R, C> {
    pub fn new(reader: R, clock: C, min_frame_bytes: usize) -> Self {
        Self {
            splitter: MjpegSplitter::new(reader, min_frame_bytes),
            clock,
            index: 0,
        }
    }
}

impl<R: Read, C: Clock> FrameSource for MjpegFrameSource<R, C> {
    fn next_frame(&mut self) -> Option<AppResult<Frame>> {
        let jpg = match self.splitter.next()? {
            Ok(jpg) => jpg,
            Err(e) => return Some(Err(AppError::Io(e))),
        };
        // A clock that ran out of range ends the stream.
        let stamp = match self.clock.now() {
            Ok(s) => s,
            Err(e) => return Some(Err(e)),
        };
        let index = self.index;
        self.index += 1;

        let decoded = image::load_from_memory_with_format(&jpg, ImageFormat::Jpeg)
            .map_err(|e| AppError::Frame {
                index,
                reason: e.to_string(),
            })
            .and_then(|img| {
                if img.width() == 0 || img.height() == 0 {
                    Err(AppError::Frame {
                        index,
                        reason: "empty image".into(),
                    })
                } else {
                    Ok(Frame::new(img, index, stamp))
                }
            });
        Some(decoded)
    }
}
