use std::time::Duration;

use dns_panel_client::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::error::{CoreError, CoreResult};

/// 默认搜索防抖（毫秒）
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 250;
/// 列表提示自动消失（秒）
const DEFAULT_LIST_NOTICE_SECS: u64 = 3;
/// 表单提示自动消失（秒）
const DEFAULT_FORM_NOTICE_SECS: u64 = 5;

/// Tunables shared by the list controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Fixed page size for list fetches.
    pub page_size: u32,
    /// Page size of the unfiltered fetch used when an edit target is not cached.
    pub edit_lookup_page_size: u32,
    /// Quiet period before a search keystroke turns into a fetch.
    pub search_debounce: Duration,
    /// Auto-dismiss delay of list-scoped notices.
    pub list_notice_ttl: Duration,
    /// Auto-dismiss delay of form-scoped notices.
    pub form_notice_ttl: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            edit_lookup_page_size: MAX_PAGE_SIZE,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            list_notice_ttl: Duration::from_secs(DEFAULT_LIST_NOTICE_SECS),
            form_notice_ttl: Duration::from_secs(DEFAULT_FORM_NOTICE_SECS),
        }
    }
}

impl ControllerConfig {
    /// Reject page sizes the backend would refuse.
    pub fn validate(&self) -> CoreResult<()> {
        for (field, value) in [
            ("page_size", self.page_size),
            ("edit_lookup_page_size", self.edit_lookup_page_size),
        ] {
            if !(1..=MAX_PAGE_SIZE).contains(&value) {
                return Err(CoreError::Config(format!(
                    "{field} must be between 1 and {MAX_PAGE_SIZE}, got {value}"
                )));
            }
        }
        Ok(())
    }
}
