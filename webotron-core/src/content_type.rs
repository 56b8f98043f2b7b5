//! Content-Type resolution for uploaded objects.

/// Used when the key's extension maps to no known MIME type.
pub const FALLBACK_CONTENT_TYPE: &str = "text/plain";

/// Guess the Content-Type for an object key from its extension.
pub fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}
