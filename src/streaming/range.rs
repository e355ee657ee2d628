//! `Range: bytes=START-END` parsing.
//!
//! Only single ranges with an explicit start are supported. Suffix ranges
//! (`bytes=-500`) and multi-range requests are rejected as malformed.

use cinevault_common::Error;

/// A satisfiable, inclusive byte window of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Inclusive; always `<= size - 1`.
    pub end: u64,
    /// Total size of the resource.
    pub size: u64,
}

impl ByteRange {
    /// Number of bytes in the window.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` header.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("range must use the bytes unit")]
    MissingUnit,

    #[error("invalid range start: {0:?}")]
    InvalidStart(String),

    #[error("invalid range end: {0:?}")]
    InvalidEnd(String),

    #[error("range not satisfiable for {size} bytes")]
    Unsatisfiable { size: u64 },
}

impl From<RangeError> for Error {
    fn from(e: RangeError) -> Self {
        match e {
            RangeError::Unsatisfiable { size } => Error::RangeNotSatisfiable { size },
            other => Error::invalid_range(other.to_string()),
        }
    }
}

/// Parse a `Range` header value against a resource of `size` bytes.
///
/// An empty end means "to end of file"; an end past the last byte is clamped.
///
/// # Examples
///
/// ```
/// use cinevault::streaming::range::parse_range;
///
/// let range = parse_range("bytes=10-999999", 100).unwrap();
/// assert_eq!((range.start, range.end, range.len()), (10, 99, 90));
/// assert_eq!(range.content_range(), "bytes 10-99/100");
/// ```
pub fn parse_range(value: &str, size: u64) -> Result<ByteRange, RangeError> {
    let window = value
        .trim()
        .strip_prefix("bytes=")
        .ok_or(RangeError::MissingUnit)?;

    let mut parts = window.splitn(2, '-');
    let start_str = parts.next().unwrap_or_default().trim();
    let end_str = parts.next().map(str::trim);

    let start: u64 = start_str
        .parse()
        .map_err(|_| RangeError::InvalidStart(start_str.to_string()))?;

    let end = match end_str {
        Some(s) if !s.is_empty() => Some(
            s.parse::<u64>()
                .map_err(|_| RangeError::InvalidEnd(s.to_string()))?,
        ),
        _ => None,
    };

    if start >= size {
        return Err(RangeError::Unsatisfiable { size });
    }
    let last = size - 1;
    let end = end.unwrap_or(last).min(last);
    if start > end {
        return Err(RangeError::Unsatisfiable { size });
    }

    Ok(ByteRange { start, end, size })
}
