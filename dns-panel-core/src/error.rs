//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use dns_panel_client::ApiError;

/// Core layer error type
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Record absent from both the edit cache and a fresh fetch
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Resource absent from the current page
    #[error("{kind} not found: {id}")]
    ResourceNotFound { kind: &'static str, id: String },

    /// A user-requested page lies outside the server's page range
    #[error("Page {page} is out of range ({total_pages} pages)")]
    PageOutOfRange { page: u32, total_pages: u32 },

    /// Form input rejected before submission
    #[error("Validation error: {0}")]
    Validation(String),

    /// No record view / resource list is open
    #[error("No active view")]
    NoActiveView,

    /// The action control already has a request in flight
    #[error("Action already in progress: {0}")]
    ControlBusy(String),

    /// Invalid controller configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend error (converting from client library)
    #[error("{0}")]
    Api(#[from] ApiError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::RecordNotFound(_)
            | Self::ResourceNotFound { .. }
            | Self::PageOutOfRange { .. }
            | Self::Validation(_)
            | Self::NoActiveView
            | Self::ControlBusy(_) => true,
            Self::Api(e) => e.is_expected(),
            Self::Config(_) => false,
        }
    }

    /// Message shown to the user in a notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    /// Log at `warn` or `error` depending on [`is_expected`](Self::is_expected).
    pub(crate) fn log(&self, action: &str) {
        if self.is_expected() {
            log::warn!("{action} failed: {self}");
        } else {
            log::error!("{action} failed: {self}");
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
