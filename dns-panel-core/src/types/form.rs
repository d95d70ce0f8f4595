use dns_panel_client::{DnsRecord, DnsRecordType};
use serde::{Deserialize, Serialize};

/// 后端默认 TTL
pub const DEFAULT_TTL: u32 = 600;

/// Which record form is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Add,
    Edit,
}

/// Add-form input. `label` is relative to the open domain (`@` or empty for
/// the apex) unless it is already fully qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub label: String,
    pub record_type: DnsRecordType,
    pub value: String,
    pub ttl: u32,
    pub enabled: bool,
    /// MX only; left to the backend default when absent.
    #[serde(default)]
    pub priority: Option<u16>,
}

impl Default for RecordDraft {
    fn default() -> Self {
        Self {
            label: String::new(),
            record_type: DnsRecordType::A,
            value: String::new(),
            ttl: DEFAULT_TTL,
            enabled: true,
            priority: None,
        }
    }
}

/// Edit-form state, pre-populated from the record being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordForm {
    pub record_id: String,
    /// Fully-qualified name or a label relative to the domain.
    pub name: String,
    pub record_type: DnsRecordType,
    pub value: String,
    pub ttl: u32,
    pub enabled: bool,
    #[serde(default)]
    pub priority: Option<u16>,
}

impl RecordForm {
    pub fn from_record(record: &DnsRecord) -> Self {
        Self {
            record_id: record.id.clone(),
            name: record.name.clone(),
            record_type: record.record_type,
            value: record.value.clone(),
            ttl: record.ttl,
            enabled: record.enabled,
            priority: record.priority,
        }
    }
}

/// Priority actually transmitted: only MX carries one, and an empty field is
/// omitted so the backend applies its default.
pub fn submitted_priority(record_type: DnsRecordType, priority: Option<u16>) -> Option<u16> {
    priority.filter(|_| record_type.uses_priority())
}
