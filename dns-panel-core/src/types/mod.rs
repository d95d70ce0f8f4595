//! 类型定义模块

mod command;
mod config;
mod control;
mod form;
mod notice;
mod view_model;

pub use command::{PageNav, RecordCommand};
pub use config::ControllerConfig;
pub use control::{ActionControl, ActionOutcome};
pub use form::{submitted_priority, FormKind, RecordDraft, RecordForm, DEFAULT_TTL};
pub use notice::{Notice, NoticeLevel, NoticeScope};
pub use view_model::{
    DomainRef, PaginationControls, RecordRow, RecordSnapshot, ResourceSnapshot, ViewState,
};

// Re-export client 库的公共类型
pub use dns_panel_client::{
    CertificateSummary, CreateRecordRequest, DnsRecord, DnsRecordType, DomainSummary, ListQuery,
    Page, PageMeta, ProviderSummary, RecordPage, RecordQuery, Resource, UpdateRecordRequest,
};
