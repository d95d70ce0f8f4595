use serde::Serialize;

use super::{RecordDraft, RecordForm};

/// Pagination button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageNav {
    First,
    Prev,
    Next,
    Last,
}

/// A user action on the record view, routed through
/// [`RecordListController::dispatch`](crate::services::RecordListController::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordCommand {
    Open { domain_id: String, domain_name: String },
    LoadPage { page: u32, search: String },
    Navigate(PageNav),
    Search(String),
    ClearSearch,
    Refresh,
    OpenAddForm,
    SubmitAdd(RecordDraft),
    CancelForm,
    Edit(String),
    SubmitEdit(RecordForm),
    Delete(String),
    Close,
}
