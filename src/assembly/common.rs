//! Common utilities for document assembly.
//!
//! Shared helpers for Typst escaping, filename construction, and template
//! asset locations.

use chrono::Local;
use std::path::Path;

/// Escape special characters for Typst string literals.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}

/// Escape user text for insertion into Typst markup context.
///
/// Substituted values must render verbatim, so every character Typst would
/// otherwise interpret (function calls, styling, references, math) is
/// backslash-escaped. Newlines become explicit line breaks.
pub fn escape_typst_markup(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' | '#' | '[' | ']' | '*' | '_' | '`' | '@' | '$' | '<' | '>' | '~' | '/' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str(" \\ "),
            _ => out.push(ch),
        }
    }
    out
}

/// Sanitize a string for use in filenames.
pub fn sanitize_component(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !last_dash && !result.is_empty() {
                result.push('-');
                last_dash = true;
            }
        }
    }

    if result.is_empty() {
        return fallback.to_string();
    }

    result.trim_matches('-').to_string()
}

/// Compact local timestamp used in generated filenames.
pub fn filename_timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// Short random token so concurrent requests can never collide on filename.
pub fn request_token() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

/// Get the bundled template assets directory.
pub fn default_template_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}
