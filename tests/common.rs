#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

pub fn rpc() -> Command {
    cargo_bin_cmd!("rpresence")
}

/// Fresh directory for one test: DB, faces and day logs all land inside it.
pub fn temp_dir_for(name: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(&format!("rpresence_{}_", name))
        .tempdir()
        .expect("create temp dir")
}

/// Path of the test DB inside `dir`; the file itself is not created.
pub fn setup_test_db(dir: &TempDir, name: &str) -> String {
    dir.path()
        .join(format!("{}.sqlite", name))
        .to_string_lossy()
        .to_string()
}

/// `init` in test mode: schema and data dirs, no config file.
pub fn init_db(db_path: &str) {
    rpc()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Random-looking pixels so the encoded JPEG stays above the size filter.
pub fn noisy_jpeg(seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let img = RgbImage::from_fn(64, 48, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let b = state.to_le_bytes();
        image::Rgb([b[0], b[1], b[2]])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Jpeg)
        .expect("encode jpeg");
    out.into_inner()
}

/// Write `n` frames as a multipart MJPEG body.
pub fn write_mjpeg(path: &Path, n: u32) {
    let mut body = Vec::new();
    for i in 0..n {
        body.extend_from_slice(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(&noisy_jpeg(i + 1));
        body.extend_from_slice(b"\r\n");
    }
    std::fs::write(path, body).expect("write mjpeg");
}

pub fn status_json(db_path: &str, date: &str) -> serde_json::Value {
    let out = rpc()
        .args(["--db", db_path, "status", "--date", date, "--json"])
        .output()
        .expect("run status");
    assert!(out.status.success(), "status failed: {:?}", out);
    serde_json::from_slice(&out.stdout).expect("status output is JSON")
}
