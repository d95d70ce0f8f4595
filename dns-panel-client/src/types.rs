use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Fixed page size used by the record view.
pub const DEFAULT_PAGE_SIZE: u32 = 5;
/// Upper bound accepted for any page size sent to the backend.
pub const MAX_PAGE_SIZE: u32 = 100;

// ============ Pagination ============

/// Pagination metadata attached to every page.
///
/// Pages are 1-indexed. `page` lies within `[1, total_pages]` whenever
/// `total_pages > 0`; enforcing that is the backend's job, the client only
/// renders what it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Page size used for this request.
    pub page_size: u32,
    /// Total number of items across all pages.
    pub total: u32,
    /// Number of pages (`0` when there are no items).
    pub total_pages: u32,
    /// Whether a previous page exists.
    pub has_prev: bool,
    /// Whether a next page exists.
    pub has_next: bool,
}

impl PageMeta {
    /// Build metadata for `page` of a `total`-item collection, computing the
    /// derived fields.
    pub fn new(page: u32, page_size: u32, total: u32) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size);
        Self {
            page,
            page_size,
            total,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    /// Whether `page` lies inside `[1, total_pages]` (always true for an empty
    /// collection on page 1).
    pub fn is_in_range(&self) -> bool {
        if self.total_pages == 0 {
            self.page == 1
        } else {
            (1..=self.total_pages).contains(&self.page)
        }
    }
}

/// Query parameters for paged, searchable list endpoints.
///
/// # Default
///
/// The default is `page = 1, page_size = 5`, with no search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed).
    pub page: u32,
    /// Number of items per page.
    pub page_size: u32,
    /// Optional free-text filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Query for the records endpoint.
pub type RecordQuery = ListQuery;

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

impl ListQuery {
    /// Build a query; the search term is trimmed and an empty term means no filter.
    pub fn new(page: u32, page_size: u32, search: &str) -> Self {
        let search = search.trim();
        Self {
            page,
            page_size,
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }

    /// Clamp pagination values to valid ranges.
    ///
    /// - `page` is clamped to `>= 1`
    /// - `page_size` is clamped to `1..=MAX_PAGE_SIZE`
    /// - `search` is trimmed and dropped when empty
    #[must_use]
    pub fn validated(&self) -> Self {
        Self::new(
            self.page.max(1),
            self.page_size.clamp(1, MAX_PAGE_SIZE),
            self.search.as_deref().unwrap_or_default(),
        )
    }

    /// Query-string pairs in the order the backend documents them.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// One page of a collection: a fully replacing snapshot, never merged with
/// another page.
///
/// On the records endpoint the item array is named `records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in the current page, in server order.
    #[serde(alias = "records")]
    pub items: Vec<T>,
    /// Pagination metadata.
    pub pagination: PageMeta,
    /// The search term that produced this page, if any.
    #[serde(default)]
    pub search: Option<String>,
}

impl<T> Page<T> {
    /// The effective search term (`""` when unfiltered).
    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }

    /// Find an item by predicate.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| pred(item))
    }
}

impl<T: Clone> Page<T> {
    /// Paginate a full, unpaginated collection on the client side.
    pub fn from_full_list(all: &[T], query: &ListQuery) -> Self {
        let total = u32::try_from(all.len()).unwrap_or(u32::MAX);
        let meta = PageMeta::new(query.page, query.page_size, total);
        let start = (query.page.saturating_sub(1) as usize).saturating_mul(meta.page_size as usize);
        let items = all
            .iter()
            .skip(start)
            .take(meta.page_size as usize)
            .cloned()
            .collect();
        Self {
            items,
            pagination: meta,
            search: query.search.clone(),
        }
    }
}

/// Paginated records response.
pub type RecordPage = Page<DnsRecord>;

// ============ DNS Record Types ============

/// DNS record type.
///
/// Wire-encoded as the backend's integer codes (`A = 1` … `NS = 6`);
/// uppercase names are also accepted when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RecordTypeRepr", into = "u8")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Name server record.
    Ns,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordTypeRepr {
    Code(u8),
    Name(String),
}

impl DnsRecordType {
    /// All supported record types, in form order.
    pub const ALL: [Self; 6] = [Self::A, Self::Aaaa, Self::Cname, Self::Mx, Self::Txt, Self::Ns];

    /// Backend integer code.
    pub fn code(self) -> u8 {
        match self {
            Self::A => 1,
            Self::Aaaa => 2,
            Self::Cname => 3,
            Self::Mx => 4,
            Self::Txt => 5,
            Self::Ns => 6,
        }
    }

    /// Look up a type by backend integer code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Uppercase display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
        }
    }

    /// Whether the `priority` field is meaningful for this type.
    pub fn uses_priority(self) -> bool {
        matches!(self, Self::Mx)
    }

    /// Input hint for the value field.
    pub fn value_hint(self) -> &'static str {
        match self {
            Self::A => "IPv4 address, e.g. 192.168.1.1",
            Self::Aaaa => "IPv6 address, e.g. 2001:db8::1",
            Self::Cname => "target host, e.g. example.com",
            Self::Mx => "mail server host, e.g. mail.example.com",
            Self::Txt => "quoted text, e.g. \"v=spf1 include:_spf.google.com ~all\"",
            Self::Ns => "name server, e.g. ns1.example.com",
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DnsRecordType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| unsupported_type(trimmed));
        }
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| unsupported_type(trimmed))
    }
}

fn unsupported_type(raw: &str) -> ApiError {
    ApiError::InvalidParameter {
        param: "type".to_string(),
        detail: format!("unsupported record type: {raw}"),
    }
}

impl TryFrom<RecordTypeRepr> for DnsRecordType {
    type Error = String;

    fn try_from(repr: RecordTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            RecordTypeRepr::Code(code) => {
                Self::from_code(code).ok_or_else(|| format!("unknown record type code {code}"))
            }
            RecordTypeRepr::Name(name) => name.parse().map_err(|e: ApiError| e.to_string()),
        }
    }
}

impl From<DnsRecordType> for u8 {
    fn from(t: DnsRecordType) -> Self {
        t.code()
    }
}

/// A DNS record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Server-assigned record identifier.
    #[serde(with = "crate::utils::id")]
    pub id: String,
    /// Owning domain identifier.
    #[serde(with = "crate::utils::id")]
    pub domain_id: String,
    /// Fully-qualified record name (equals the domain name for apex records).
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record value; its meaning depends on the type.
    pub value: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Whether the record is enabled.
    pub enabled: bool,
    /// MX priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,

    /// When the record was created, if known.
    #[serde(default, with = "crate::utils::datetime")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    /// When the record was last updated, if known.
    #[serde(default, with = "crate::utils::datetime")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl DnsRecord {
    /// Free-text match on name or value, case-insensitive.
    pub fn matches(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term) || contains_ignore_case(&self.value, term)
    }
}

/// Request body for creating a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    /// Owning domain identifier.
    #[serde(with = "crate::utils::id")]
    pub domain_id: String,
    /// Fully-qualified record name.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record value.
    pub value: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Whether the record is enabled.
    pub enabled: bool,
    /// MX priority; omitted so the backend applies its default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

/// Request body for replacing a record's mutable fields.
///
/// Every mutable field is always sent (full replace). `priority` is the one
/// optional field: when absent the backend keeps or defaults it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecordRequest {
    /// Fully-qualified record name.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record value.
    pub value: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Whether the record is enabled.
    pub enabled: bool,
    /// MX priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

// ============ Resource Types ============

/// A collection exposed by the backend that can be listed, deleted and has
/// one boolean flag that can be toggled.
///
/// Implemented by [`ProviderSummary`], [`DomainSummary`] and
/// [`CertificateSummary`]; one generic client and one generic list controller
/// serve all three.
pub trait Resource: Clone + DeserializeOwned + Send + Sync + 'static {
    /// Collection path, with a trailing slash (e.g. `/api/providers/`).
    const COLLECTION_PATH: &'static str;
    /// Name of the togglable boolean field in update bodies.
    const FLAG_FIELD: &'static str;
    /// Query parameter used to scope the list to a parent, if supported.
    const PARENT_PARAM: Option<&'static str> = None;
    /// Human-readable singular noun, for notices.
    const KIND: &'static str;

    /// Resource identifier.
    fn id(&self) -> &str;
    /// Current value of the togglable flag.
    fn flag(&self) -> bool;
    /// Client-side search predicate, used when the endpoint is unpaginated.
    fn matches(&self, term: &str) -> bool;
}

/// DNS service provider account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSummary {
    /// Provider identifier.
    #[serde(with = "crate::utils::id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Provider kind (backend integer code).
    #[serde(rename = "type")]
    pub provider_type: u8,
    /// Whether the provider is enabled.
    pub enabled: bool,
    /// Last connection test status.
    #[serde(default)]
    pub status: String,
}

impl Resource for ProviderSummary {
    const COLLECTION_PATH: &'static str = "/api/providers/";
    const FLAG_FIELD: &'static str = "enabled";
    const KIND: &'static str = "provider";

    fn id(&self) -> &str {
        &self.id
    }

    fn flag(&self) -> bool {
        self.enabled
    }

    fn matches(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term)
    }
}

/// Domain (zone) managed through a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSummary {
    /// Domain identifier.
    #[serde(with = "crate::utils::id")]
    pub id: String,
    /// Domain name (e.g. `example.com`).
    pub name: String,
    /// Owning provider identifier.
    #[serde(with = "crate::utils::id")]
    pub provider_id: String,
    /// Whether the domain is enabled.
    pub enabled: bool,
    /// Whether DDNS auto update is on.
    #[serde(default)]
    pub auto_update: bool,
}

impl Resource for DomainSummary {
    const COLLECTION_PATH: &'static str = "/api/domains/";
    const FLAG_FIELD: &'static str = "enabled";
    const PARENT_PARAM: Option<&'static str> = Some("provider_id");
    const KIND: &'static str = "domain";

    fn id(&self) -> &str {
        &self.id
    }

    fn flag(&self) -> bool {
        self.enabled
    }

    fn matches(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term)
    }
}

/// TLS certificate tracked by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateSummary {
    /// Certificate identifier.
    #[serde(with = "crate::utils::id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning domain identifier.
    #[serde(with = "crate::utils::id")]
    pub domain_id: String,
    /// Certificate status (backend integer code).
    pub status: u8,
    /// Whether automatic renewal is on.
    pub auto_renew: bool,
    /// Expiry, if issued.
    #[serde(default, with = "crate::utils::datetime")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_after: Option<chrono::DateTime<chrono::Utc>>,
}

impl Resource for CertificateSummary {
    const COLLECTION_PATH: &'static str = "/api/certificates/";
    const FLAG_FIELD: &'static str = "auto_renew";
    const KIND: &'static str = "certificate";

    fn id(&self) -> &str {
        &self.id
    }

    fn flag(&self) -> bool {
        self.auto_renew
    }

    fn matches(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
