//! Utility modules.

/// Date/time serialization helpers for backend timestamps.
pub mod datetime;

/// Serde helpers for opaque identifiers sent as numbers or strings.
pub mod id;

/// Log sanitization utilities to keep logs short and single-line.
pub mod log_sanitizer;
