//! HTTP plumbing shared by every endpoint call.
//!
//! One request in, one `(status, body)` out. Requests are never retried: a
//! failed call surfaces to the caller, and the user re-triggers the action.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::{http_error, ApiError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP helper functions.
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request and read the full response body.
    ///
    /// # Arguments
    /// * `request_builder` - fully configured request (URL, query, body)
    /// * `method_name` - HTTP method, for logging
    /// * `path` - request path, for logging
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` whatever the status
    /// * `Err(ApiError::Timeout | ApiError::Network)` when no response was read
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        path: &str,
    ) -> Result<(u16, String)> {
        log::debug!("{method_name} {path}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ApiError::Network {
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("{method_name} {path} -> {status_code}");

        let response_text = response.text().await.map_err(|e| ApiError::Network {
            detail: format!("Failed to read response body: {e}"),
        })?;

        log::debug!("Response Body: {}", truncate_for_log(&response_text));

        Ok((status_code, response_text))
    }

    /// Map a non-2xx response to [`ApiError::Http`], passing 2xx bodies through.
    pub fn ensure_success(status_code: u16, response_text: String) -> Result<String> {
        if (200..300).contains(&status_code) {
            Ok(response_text)
        } else {
            let err = http_error(status_code, &response_text);
            if err.is_expected() {
                log::warn!("Request rejected: {err}");
            } else {
                log::error!("Request failed: {err}");
            }
            Err(err)
        }
    }

    /// Parse a JSON response body.
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(ApiError::Parse)` - the body does not match `T`
    pub fn parse_json<T>(response_text: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("JSON parse failed: {e}");
            log::error!("Raw response: {}", truncate_for_log(response_text));
            ApiError::Parse {
                detail: e.to_string(),
            }
        })
    }
}
