//! Log sanitization utilities
//!
//! Keeps API tokens and large zone dumps out of debug/error logs.

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters of a secret left visible by [`mask_secret`].
const SECRET_VISIBLE_PREFIX: usize = 4;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a response body or payload for safe logging.
///
/// Returns the original string if it's within the limit, otherwise the first
/// `TRUNCATE_LIMIT` bytes with a suffix giving the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask a secret such as the bearer token: `abcdef123` -> `abcd****`.
///
/// Secrets no longer than the visible prefix are fully masked.
pub fn mask_secret(secret: &str) -> String {
    if secret.len() <= SECRET_VISIBLE_PREFIX {
        "****".to_string()
    } else {
        format!(
            "{}****",
            &secret[..floor_char_boundary(secret, SECRET_VISIBLE_PREFIX)]
        )
    }
}
