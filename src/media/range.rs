//! `Range: bytes=...` parsing.
//!
//! Only the first range of a multi-range header is honored.

use crate::error::{AppError, AppResult};

/// Inclusive byte span inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeSpec {
    FromTo(u64, Option<u64>),
    Suffix(u64),
}

/// Parses a `Range` header value against a file of `size` bytes.
///
/// Malformed values are `BadRequest`; well-formed ranges outside the file are
/// `RangeNotSatisfiable`. An end beyond the file is clamped to the last byte.
pub fn parse_range(value: &str, size: u64) -> AppResult<ByteRange> {
    let spec = parse_spec(value)
        .ok_or_else(|| AppError::BadRequest(format!("invalid Range header: {}", value.trim())))?;

    if size == 0 {
        return Err(AppError::RangeNotSatisfiable { size });
    }
    let last = size - 1;

    match spec {
        RangeSpec::FromTo(start, end) => {
            let end = end.unwrap_or(last).min(last);
            if start > end {
                return Err(AppError::RangeNotSatisfiable { size });
            }
            Ok(ByteRange { start, end })
        }
        RangeSpec::Suffix(0) => Err(AppError::RangeNotSatisfiable { size }),
        RangeSpec::Suffix(n) => Ok(ByteRange { start: size.saturating_sub(n), end: last }),
    }
}

fn parse_spec(value: &str) -> Option<RangeSpec> {
    let rest = value.trim().strip_prefix("bytes=")?;
    let first = rest.split(',').next()?.trim();
    let (start, end) = first.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());

    match (start.is_empty(), end.is_empty()) {
        (false, _) => {
            let start = parse_u64(start)?;
            let end = if end.is_empty() { None } else { Some(parse_u64(end)?) };
            if end.is_some_and(|e| e < start) {
                return None;
            }
            Some(RangeSpec::FromTo(start, end))
        }
        (true, false) => Some(RangeSpec::Suffix(parse_u64(end)?)),
        (true, true) => None,
    }
}

// u64::from_str akzeptiert ein führendes '+', das ist in Range-Headern nicht erlaubt.
fn parse_u64(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
