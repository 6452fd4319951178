use super::clock::Stamp;
use chrono::NaiveDateTime;
use image::DynamicImage;
use std::time::Duration;

/// A decoded camera frame with its position in the stream and capture time.
#[derive(Clone, Debug)]
pub struct Frame {
    image: DynamicImage,
    index: usize,
    stamp: Stamp,
}

impl Frame {
    pub fn new(image: DynamicImage, index: usize, stamp: Stamp) -> Self {
        Self {
            image,
            index,
            stamp,
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// Local capture time.
    pub fn at(&self) -> NaiveDateTime {
        self.stamp.wall
    }

    pub fn elapsed(&self) -> Duration {
        self.stamp.elapsed
    }
}
