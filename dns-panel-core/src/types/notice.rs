use std::time::Duration;

use serde::Serialize;

/// Where a notice is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeScope {
    /// Outer list (fetch, delete and toggle results)
    List,
    /// Inside the add form
    AddForm,
    /// Inside the edit form
    EditForm,
}

impl NoticeScope {
    /// Whether the notice lives inside a form.
    pub fn is_form(self) -> bool {
        !matches!(self, Self::List)
    }
}

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient, auto-dismissing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Unique per controller; used to dismiss exactly this notice.
    pub id: u64,
    pub scope: NoticeScope,
    pub level: NoticeLevel,
    pub message: String,
    /// Delay before the notice is dismissed.
    #[serde(skip)]
    pub ttl: Duration,
}
