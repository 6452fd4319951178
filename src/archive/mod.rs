pub mod face_archiver;

pub use face_archiver::{FaceArchiver, list_images};
