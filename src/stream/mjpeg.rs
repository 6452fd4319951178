use std::io::{self, Read};

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

pub const READ_CHUNK: usize = 1024;
/// A frame that grows past this without an EOI marker is dropped.
pub const MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

fn find(haystack: &[u8], needle: &[u8; 2], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(2)
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Splits a multipart MJPEG byte stream into JPEG payloads.
///
/// Only the SOI/EOI markers are looked at, so multipart boundaries and
/// headers are skipped as garbage. Payloads of `min_bytes` or less are
/// dropped (keep-alive and thumbnail noise from cheap cameras).
pub struct MjpegSplitter<R: Read> {
    reader: R,
    buf: Vec<u8>,
    min_bytes: usize,
    dropped: usize,
    eof: bool,
}

impl<R: Read> MjpegSplitter<R> {
    pub fn new(reader: R, min_bytes: usize) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(READ_CHUNK * 64),
            min_bytes,
            dropped: 0,
            eof: false,
        }
    }

    /// Payloads discarded as too small or oversized so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Take the next complete payload already in the buffer, if any.
    fn extract(&mut self) -> Option<Vec<u8>> {
        loop {
            let Some(start) = find(&self.buf, &SOI, 0) else {
                // Keep a trailing 0xFF: it may be the first half of an SOI.
                let keep = usize::from(self.buf.last() == Some(&0xFF));
                self.buf.drain(..self.buf.len() - keep);
                return None;
            };
            if start > 0 {
                self.buf.drain(..start);
            }

            let Some(end) = find(&self.buf, &EOI, SOI.len()) else {
                if self.buf.len() > MAX_FRAME_BYTES {
                    log::warn!("MJPEG frame exceeds {MAX_FRAME_BYTES} bytes without EOI, resyncing");
                    self.dropped += 1;
                    self.buf.drain(..SOI.len());
                    continue;
                }
                return None;
            };

            let jpg: Vec<u8> = self.buf.drain(..end + EOI.len()).collect();
            if jpg.len() > self.min_bytes {
                return Some(jpg);
            }
            self.dropped += 1;
        }
    }
}

impl<R: Read> Iterator for MjpegSplitter<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(jpg) = self.extract() {
                return Some(Ok(jpg));
            }
            if self.eof {
                return None;
            }
            match self.reader.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.eof = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
