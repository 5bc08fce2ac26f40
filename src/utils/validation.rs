//! Centralized input limits and content checks.

/// Maximum number of data rows accepted from a single file (DOS protection)
pub const MAX_ROWS: usize = 500_000;

/// Maximum size of a single input file in bytes
pub const MAX_INPUT_BYTES: u64 = 256 * 1024 * 1024;

/// Check if adding another row would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    if count >= MAX_ROWS {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {MAX_ROWS}"
        ))
    } else {
        None
    }
}

/// Content validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Input is empty")]
    Empty,
    #[error("Input is {0} bytes; the maximum is {MAX_INPUT_BYTES}")]
    TooLarge(u64),
    #[error("Input appears to be binary, not text")]
    Binary,
}

/// Reject empty, oversized or binary input before parsing it as text.
///
/// A NUL byte anywhere in the first 8 KiB counts as binary.
///
/// # Errors
///
/// Returns the matching `ValidationError`.
pub fn validate_text_content(content: &[u8]) -> Result<(), ValidationError> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::Empty);
    }
    let len = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if len > MAX_INPUT_BYTES {
        return Err(ValidationError::TooLarge(len));
    }
    if content.iter().take(8192).any(|&b| b == 0) {
        return Err(ValidationError::Binary);
    }
    Ok(())
}
