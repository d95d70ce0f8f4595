//! # dns-panel-client
//!
//! Typed REST client for the DNS panel backend: DNS records plus the
//! provider, domain and certificate collections.
//!
//! ## Feature Flags
//!
//! ### TLS Backend
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dns_panel_client::{ClientConfig, RecordApi, RecordQuery, RestClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_base_url("http://127.0.0.1:8000")?;
//!     let client = RestClient::new(&config)?;
//!
//!     let page = client
//!         .list_records("3", &RecordQuery::new(1, 5, "www"))
//!         .await?;
//!     for record in &page.items {
//!         println!("{} {} -> {}", record.name, record.record_type, record.value);
//!     }
//!     println!(
//!         "page {} of {}",
//!         page.pagination.page, page.pagination.total_pages
//!     );
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`Result<T, ApiError>`](ApiError):
//!
//! - [`ApiError::Network`] / [`ApiError::Timeout`]: no usable response
//! - [`ApiError::Http`]: non-2xx, carrying the backend's `detail` message
//! - [`ApiError::Parse`]: the body did not match the expected shape
//! - [`ApiError::InvalidParameter`]: rejected before sending
//!
//! Nothing is retried automatically.

mod client;
mod error;
mod http_client;
mod traits;
mod types;
mod utils;

pub use client::{ClientConfig, RestClient};

pub use error::{ApiError, Result};

pub use traits::{RecordApi, ResourceApi};

pub use types::{
    CertificateSummary, CreateRecordRequest, DnsRecord, DnsRecordType, DomainSummary, ListQuery,
    Page, PageMeta, ProviderSummary, RecordPage, RecordQuery, Resource, UpdateRecordRequest,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

pub use utils::datetime;
pub use utils::log_sanitizer::truncate_for_log;
