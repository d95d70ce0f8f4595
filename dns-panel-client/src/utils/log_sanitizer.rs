//! Log sanitization utilities
//!
//! Response bodies (TXT values, certificate PEM blobs, validation dumps) can be
//! long and multi-line. These helpers keep debug/error logs to one bounded line.

/// Maximum number of bytes of a body to include in log output.
const TRUNCATE_LIMIT: usize = 256;

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

/// Truncate a string for safe logging and fold it onto a single line.
pub fn truncate_for_log(s: &str) -> String {
    let folded = if s.contains(['\n', '\r']) {
        s.split(['\n', '\r'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        s.to_string()
    };

    if folded.len() <= TRUNCATE_LIMIT {
        folded
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &folded[..floor_char_boundary(&folded, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}
