//! Utility functions for text cleanup, log previews and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Sanitizing raw text fragments pulled out of article markup
//! - Leading-character capitalization for category labels
//! - String truncation for logging
//! - File system validation for output directories

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Strip noise characters from raw extracted text fragments.
///
/// Removes double quotes, non-breaking spaces, newlines, tabs and carriage
/// returns, and turns every `-` into a plain space so the downstream
/// delimiter-based cleaning stage never sees a stray separator.
///
/// Order and length of `fragments` are preserved; nothing is dropped here.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize(&["e-f".to_string()]), vec!["e f".to_string()]);
/// ```
pub fn sanitize<S: AsRef<str>>(fragments: &[S]) -> Vec<String> {
    fragments
        .iter()
        .map(|fragment| {
            fragment
                .as_ref()
                .chars()
                .filter(|c| !matches!(c, '"' | '\u{a0}' | '\n' | '\t' | '\r'))
                .map(|c| if c == '-' { ' ' } else { c })
                .collect()
        })
        .collect()
}

/// Capitalize the first character of a string.
///
/// Only the leading character changes; the rest keeps its casing.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(upcase("worldpolitics"), "Worldpolitics");
/// assert_eq!(upcase("wORLD"), "WORLD");
/// assert_eq!(upcase(""), "");
/// ```
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (backing off to a char boundary) with an
/// ellipsis and byte count appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
