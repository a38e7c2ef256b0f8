//! `Range` header parsing
//!
//! Only a single `bytes=<start>-<end>` interval is understood. Either bound may
//! be omitted: a missing start means 0 and a missing end means the last byte.
//! Bounds are clamped into the file, and `end` never falls below `start`, so a
//! well-formed header always yields at least one byte. Multi-range requests
//! are rejected as malformed.

use super::error::RequestError;

/// Inclusive byte interval within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered (always at least 1)
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a file of `file_size` bytes
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, file_size)
    }
}

/// Parse a `Range` header value against a file of `file_size` bytes
///
/// Returns `Ok(None)` for an empty file, where no byte is addressable and the
/// whole (empty) body is served instead.
pub fn parse_range(header: &str, file_size: u64) -> Result<Option<ByteRange>, RequestError> {
    let malformed = || RequestError::MalformedRange {
        header: header.to_string(),
    };

    let ranges = header.trim().strip_prefix("bytes=").ok_or_else(malformed)?;
    if ranges.contains(',') {
        return Err(malformed());
    }

    let (start, end) = ranges.split_once('-').ok_or_else(malformed)?;
    let start = parse_bound(start).ok_or_else(malformed)?;
    let end = parse_bound(end).ok_or_else(malformed)?;

    if file_size == 0 {
        return Ok(None);
    }

    let last = file_size - 1;
    let start = start.unwrap_or(0).min(last);
    let end = end.unwrap_or(last).min(last).max(start);

    Ok(Some(ByteRange { start, end }))
}

/// `Some(None)` for an omitted bound, `None` when the bound is not a decimal u64
fn parse_bound(raw: &str) -> Option<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(None);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok().map(Some)
}
