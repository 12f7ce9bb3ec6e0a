//! Shared helpers
//!
//! Base64 payload decoding and small formatting utilities.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::{Result, ValidationError};

/// Decode a base64 payload sent by a tool client
///
/// Accepts standard and URL-safe alphabets, with or without padding, wrapped
/// lines, and an optional `data:<mime>;base64,` prefix.
pub fn decode_base64(name: &str, data: &str) -> Result<Vec<u8>> {
    let data = match data.find(";base64,") {
        Some(idx) if data.starts_with("data:") => &data[idx + ";base64,".len()..],
        _ => data,
    };
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();

    STANDARD
        .decode(&cleaned)
        .or_else(|_| URL_SAFE.decode(&cleaned))
        .or_else(|_| STANDARD_NO_PAD.decode(&cleaned))
        .or_else(|_| URL_SAFE_NO_PAD.decode(&cleaned))
        .map_err(|e| {
            ValidationError::InvalidParameter {
                name: name.to_string(),
                message: e.to_string(),
            }
            .into()
        })
}

/// Encode bytes as standard padded base64
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Treat empty or whitespace-only strings as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Keep only the ASCII digits of a phone number
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
