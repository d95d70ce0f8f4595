use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for every call against the panel backend.
///
/// Variants map onto the failure taxonomy a caller has to tell apart:
/// transport failures ([`Network`](Self::Network), [`Timeout`](Self::Timeout)),
/// non-2xx responses carrying the backend's `detail` ([`Http`](Self::Http)),
/// undecodable bodies ([`Parse`](Self::Parse)) and arguments rejected before
/// any request was sent ([`InvalidParameter`](Self::InvalidParameter)).
///
/// None of these are retried automatically; the user re-triggers the action.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ApiError {
    /// Connection refused, DNS failure, reset, unreadable body, ...
    #[error("Network error: {detail}")]
    Network {
        /// Error details.
        detail: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {detail}")]
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {detail}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Human-readable `detail` from the error envelope, or the raw body.
        detail: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to parse response: {detail}")]
    Parse {
        /// Details about the parse failure.
        detail: String,
    },

    /// An argument was rejected before the request was built.
    #[error("Invalid parameter '{param}': {detail}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },
}

impl ApiError {
    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Http { status, .. } => (400..500).contains(status),
            Self::InvalidParameter { .. } => true,
            Self::Network { .. } | Self::Timeout { .. } | Self::Parse { .. } => false,
        }
    }

    /// Whether the backend reported the addressed resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// Whether this is a transport-level failure (no usable response).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// The message suitable for showing to a user, without the status prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Backend error envelope: `{ "detail": ... }`.
///
/// `detail` is either a plain string or, for request validation failures, a
/// list of `{ loc, msg, type }` objects.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationItem>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidationItem {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
}

impl ErrorDetail {
    /// Flatten the detail into a single line.
    pub fn into_message(self) -> String {
        match self {
            Self::Message(msg) => msg,
            Self::Validation(items) => items
                .into_iter()
                .map(|item| {
                    let field = item
                        .loc
                        .iter()
                        .filter(|part| part.as_str() != Some("body"))
                        .map(|part| match part {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".");
                    if field.is_empty() {
                        item.msg
                    } else {
                        format!("{field}: {}", item.msg)
                    }
                })
                .collect::<Vec<_>>()
                .join("; "),
            Self::Other(value) => value.to_string(),
        }
    }
}

/// Build the [`ApiError::Http`] for a non-success response body.
///
/// Falls back to the raw body (or the status code alone) when the body is not
/// a `detail` envelope.
pub(crate) fn http_error(status: u16, body: &str) -> ApiError {
    let detail = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.detail.into_message(),
        Err(_) if body.trim().is_empty() => format!("request failed with status {status}"),
        Err(_) => body.trim().to_string(),
    };
    ApiError::Http { status, detail }
}
