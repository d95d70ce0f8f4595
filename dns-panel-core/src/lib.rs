//! DNS Panel Core Library
//!
//! View-model layer of the DNS panel, including:
//! - Record list controller (paging, search, add / edit / delete)
//! - Resource list controllers (providers, domains, certificates)
//!
//! The library is presentation-independent: the backend is reached through
//! [`dns_panel_client::RecordApi`] / [`dns_panel_client::ResourceApi`] and the
//! display through the [`traits::RecordView`] / [`traits::ResourceView`]
//! traits, both injected by the platform layer.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{RecordListController, ResourceListController};
pub use traits::{BusyIndicator, NoticeSink, RecordView, ResourceView};
