//! 视图模型：由快照纯函数推导，视图层只负责展示

use dns_panel_client::{DnsRecord, DnsRecordType, Page, PageMeta, RecordPage};
use serde::Serialize;

/// The domain a record view is open for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainRef {
    pub id: String,
    pub name: String,
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    pub id: String,
    pub name: String,
    pub record_type: DnsRecordType,
    pub value: String,
    pub ttl: u32,
    pub priority: Option<u16>,
    pub enabled: bool,
}

impl RecordRow {
    pub fn from_record(record: &DnsRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            record_type: record.record_type,
            value: record.value.clone(),
            ttl: record.ttl,
            priority: record.priority,
            enabled: record.enabled,
        }
    }

    /// Priority column text (`-` when absent).
    pub fn priority_label(&self) -> String {
        self.priority.map_or_else(|| "-".to_string(), |p| p.to_string())
    }

    pub fn status_label(&self) -> &'static str {
        if self.enabled {
            "enabled"
        } else {
            "disabled"
        }
    }
}

/// State of the first / previous / next / last buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControls {
    pub page: u32,
    pub total_pages: u32,
    pub total: u32,
    pub first_enabled: bool,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub last_enabled: bool,
    /// Hidden for a single page.
    pub visible: bool,
}

impl PaginationControls {
    pub fn from_meta(meta: &PageMeta) -> Self {
        Self {
            page: meta.page,
            total_pages: meta.total_pages,
            total: meta.total,
            first_enabled: meta.has_prev,
            prev_enabled: meta.has_prev,
            next_enabled: meta.has_next,
            last_enabled: meta.has_next,
            visible: meta.total_pages > 1,
        }
    }

    /// e.g. `page 1 of 2 (7 records)`
    pub fn label(&self) -> String {
        format!(
            "page {} of {} ({} records)",
            self.page,
            self.total_pages.max(1),
            self.total
        )
    }
}

/// Everything the record table renders, derived from one fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSnapshot {
    pub domain: DomainRef,
    pub rows: Vec<RecordRow>,
    pub pagination: PaginationControls,
    /// Search term that produced this page (`""` when unfiltered).
    pub search: String,
}

impl RecordSnapshot {
    pub fn from_page(domain: &DomainRef, page: &RecordPage, search: &str) -> Self {
        Self {
            domain: domain.clone(),
            rows: page.items.iter().map(RecordRow::from_record).collect(),
            pagination: PaginationControls::from_meta(&page.pagination),
            search: search.to_string(),
        }
    }

    /// Text to show instead of the table when there are no rows.
    pub fn empty_message(&self) -> Option<String> {
        if !self.rows.is_empty() {
            None
        } else if self.search.is_empty() {
            Some("no records yet".to_string())
        } else {
            Some(format!("no records match \"{}\"", self.search))
        }
    }
}

/// Observable state of one record view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "record_id", rename_all = "snake_case")]
pub enum ViewState {
    Closed,
    /// A list fetch is in flight: the first load or a reload of the page
    /// already shown.
    Loading,
    Loaded,
    AddOpen,
    EditOpen(String),
    /// Loaded state decorated with an error banner after a failed fetch.
    Error,
}

/// Everything a resource list renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSnapshot<R> {
    pub items: Vec<R>,
    pub pagination: PaginationControls,
    pub search: String,
}

impl<R: Clone> ResourceSnapshot<R> {
    pub fn from_page(page: &Page<R>, search: &str) -> Self {
        Self {
            items: page.items.clone(),
            pagination: PaginationControls::from_meta(&page.pagination),
            search: search.to_string(),
        }
    }
}
