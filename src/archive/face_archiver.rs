use crate::errors::{AppError, AppResult};
use crate::models::BoundingBox;
use crate::stream::frame::Frame;
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "person_";

/// Saves one face crop per present run as `person_<n>.<ext>`.
///
/// `n` starts after the highest index already in the directory, so names
/// are never reused, not even across restarts. An index is consumed even
/// when the write fails.
pub struct FaceArchiver {
    dir: PathBuf,
    ext: String,
    next_index: u64,
}

impl FaceArchiver {
    pub fn new(dir: &Path, ext: &str) -> AppResult<Self> {
        fs::create_dir_all(dir)?;
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        let next_index = scan_indices(dir, &ext)?
            .into_iter()
            .max()
            .map_or(0, |n| n + 1);
        Ok(Self {
            dir: dir.to_path_buf(),
            ext,
            next_index,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    fn take_path(&mut self) -> PathBuf {
        let n = self.next_index;
        self.next_index += 1;
        self.dir.join(format!("{FILE_PREFIX}{n}.{}", self.ext))
    }

    /// Crop `face` out of `frame` and write it.
    pub fn archive(&mut self, frame: &Frame, face: &BoundingBox) -> AppResult<PathBuf> {
        let path = self.take_path();

        let b = face.clamp_to(frame.width(), frame.height()).ok_or_else(|| {
            AppError::Other(format!(
                "face box {:?} lies outside the {}x{} frame",
                face,
                frame.width(),
                frame.height()
            ))
        })?;

        let crop = frame.image().crop_imm(b.x, b.y, b.width, b.height);
        // JPEG has no alpha channel.
        DynamicImage::ImageRgb8(crop.to_rgb8()).save(&path)?;

        log::info!("Saved face as {}", path.display());
        Ok(path)
    }
}

fn parse_index(file_name: &str, ext: &str) -> Option<u64> {
    file_name
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(ext)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

fn scan_indices(dir: &Path, ext: &str) -> AppResult<Vec<u64>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        if let Some(n) = parse_index(&name.to_string_lossy(), ext) {
            out.push(n);
        }
    }
    Ok(out)
}

/// File names of archived faces, oldest first. A missing directory is empty.
pub fn list_images(dir: &Path, ext: &str) -> AppResult<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    let suffix = format!(".{ext}");

    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.to_ascii_lowercase().ends_with(&suffix) {
            names.push(name);
        }
    }

    names.sort_by(|a, b| {
        let ka = parse_index(a, &ext).unwrap_or(u64::MAX);
        let kb = parse_index(b, &ext).unwrap_or(u64::MAX);
        ka.cmp(&kb).then_with(|| a.cmp(b))
    });
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Stamp;
    use chrono::NaiveDate;
    use image::RgbImage;
    use std::time::Duration;

    fn frame(w: u32, h: u32) -> Frame {
        let img = RgbImage::from_fn(w, h, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let at = NaiveDate::from_ymd_opt(2025, 2, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Frame::new(DynamicImage::ImageRgb8(img), 0, Stamp::new(at, Duration::ZERO))
    }

    #[test]
    fn names_are_sequential_from_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut arch = FaceArchiver::new(dir.path(), "jpg").unwrap();
        let f = frame(120, 100);

        let a = arch.archive(&f, &BoundingBox::new(10, 10, 40, 40)).unwrap();
        let b = arch.archive(&f, &BoundingBox::new(50, 20, 40, 40)).unwrap();

        assert_eq!(a.file_name().unwrap(), "person_0.jpg");
        assert_eq!(b.file_name().unwrap(), "person_1.jpg");

        let saved = image::open(&a).unwrap();
        assert_eq!((saved.width(), saved.height()), (40, 40));
    }

    #[test]
    fn counter_resumes_after_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("person_0.jpg"), b"x").unwrap();
        fs::write(dir.path().join("person_7.jpg"), b"x").unwrap();
        fs::write(dir.path().join("person_99.png"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let arch = FaceArchiver::new(dir.path(), "jpg").unwrap();
        assert_eq!(arch.next_index(), 8);
    }

    #[test]
    fn box_is_clamped_to_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut arch = FaceArchiver::new(dir.path(), "jpg").unwrap();
        let path = arch
            .archive(&frame(64, 64), &BoundingBox::new(40, 40, 100, 100))
            .unwrap();
        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (24, 24));
    }

    #[test]
    fn failed_write_still_consumes_the_index() {
        let dir = tempfile::tempdir().unwrap();
        let faces = dir.path().join("faces");
        let mut arch = FaceArchiver::new(&faces, "jpg").unwrap();

        fs::remove_dir_all(&faces).unwrap();
        fs::write(&faces, b"not a directory").unwrap();

        let err = arch.archive(&frame(64, 64), &BoundingBox::new(0, 0, 32, 32));
        assert!(err.is_err());
        assert!(err.unwrap_err().is_transient());
        assert_eq!(arch.next_index(), 1);
    }

    #[test]
    fn box_outside_frame_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut arch = FaceArchiver::new(dir.path(), "jpg").unwrap();
        assert!(arch
            .archive(&frame(32, 32), &BoundingBox::new(40, 40, 10, 10))
            .is_err());
    }

    #[test]
    fn listing_sorts_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for n in [10, 2, 0] {
            fs::write(dir.path().join(format!("person_{n}.jpg")), b"x").unwrap();
        }
        fs::write(dir.path().join("legacy.JPG"), b"x").unwrap();
        fs::write(dir.path().join("skip.png"), b"x").unwrap();

        let names = list_images(dir.path(), "jpg").unwrap();
        assert_eq!(
            names,
            vec!["person_0.jpg", "person_2.jpg", "person_10.jpg", "legacy.JPG"]
        );
    }

    #[test]
    fn listing_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_images(&dir.path().join("none"), "jpg").unwrap().is_empty());
    }
}
