//! `reqwest` implementation of [`RecordApi`] and [`ResourceApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{RecordApi, ResourceApi};
use crate::types::{
    CreateRecordRequest, DnsRecord, ListQuery, Page, RecordPage, RecordQuery, Resource,
    UpdateRecordRequest,
};

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`RestClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://127.0.0.1:8000`. Any path component is
    /// kept as a prefix for every API path.
    pub base_url: Url,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Config with default timeouts.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Parse a base URL string into a config with default timeouts.
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url.trim()).map_err(|e| ApiError::InvalidParameter {
            param: "base_url".to_string(),
            detail: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidParameter {
                param: "base_url".to_string(),
                detail: format!("unsupported scheme: {}", url.scheme()),
            });
        }
        Ok(Self::new(url))
    }
}

/// REST client for the panel backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base: String,
}

impl RestClient {
    /// Build a client from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network {
                detail: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for an API path starting with `/`.
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Send, check status and return the body of a successful response.
    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<String> {
        let (status, body) = HttpUtils::execute_request(builder, method.as_str(), path).await?;
        HttpUtils::ensure_success(status, body)
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T> {
        let body = self.send(method, path, builder).await?;
        HttpUtils::parse_json(&body)
    }

    async fn put_json<B: Serialize + Sync, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.request(Method::PUT, path).json(body);
        self.send_json(Method::PUT, path, builder).await
    }

    async fn delete_path(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, builder).await.map(|_| ())
    }
}

/// Percent-encode a single path segment.
fn segment(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::InvalidParameter {
            param: "id".to_string(),
            detail: "identifier must not be empty".to_string(),
        });
    }
    Ok(urlencoding::encode(id).into_owned())
}

fn records_path(domain_id: &str) -> Result<String> {
    Ok(format!("/api/domains/{}/records", segment(domain_id)?))
}

fn record_path(record_id: &str) -> Result<String> {
    Ok(format!("/api/domains/records/{}", segment(record_id)?))
}

fn resource_path<R: Resource>(id: &str) -> Result<String> {
    Ok(format!("{}{}", R::COLLECTION_PATH, segment(id)?))
}

#[async_trait]
impl RecordApi for RestClient {
    async fn list_records(&self, domain_id: &str, query: &RecordQuery) -> Result<RecordPage> {
        let path = records_path(domain_id)?;
        let query = query.validated();
        let builder = self
            .request(Method::GET, &path)
            .query(&query.to_query_pairs());
        let envelope: ListEnvelope<DnsRecord> = self.send_json(Method::GET, &path, builder).await?;
        Ok(envelope.into_page(&query, DnsRecord::matches))
    }

    async fn create_record(
        &self,
        domain_id: &str,
        req: &CreateRecordRequest,
    ) -> Result<DnsRecord> {
        let path = records_path(domain_id)?;
        let builder = self.request(Method::POST, &path).json(req);
        self.send_json(Method::POST, &path, builder).await
    }

    async fn update_record(
        &self,
        record_id: &str,
        req: &UpdateRecordRequest,
    ) -> Result<DnsRecord> {
        let path = record_path(record_id)?;
        self.put_json(&path, req).await
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        let path = record_path(record_id)?;
        self.delete_path(&path).await
    }
}

/// List endpoints answer either with a page object or with the full array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

impl<T: Clone> ListEnvelope<T> {
    /// A full array is filtered with `matches` and paged locally.
    fn into_page(self, query: &ListQuery, matches: impl Fn(&T, &str) -> bool) -> Page<T> {
        match self {
            Self::Paged(page) => page,
            Self::Plain(all) => {
                let term = query.search.as_deref().unwrap_or_default();
                let matching: Vec<T> = all.into_iter().filter(|r| matches(r, term)).collect();
                Page::from_full_list(&matching, query)
            }
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for RestClient {
    async fn list(&self, parent_id: Option<&str>, query: &ListQuery) -> Result<Page<R>> {
        let path = R::COLLECTION_PATH;
        let query = query.validated();
        let mut pairs = query.to_query_pairs();
        if let (Some(param), Some(parent)) = (R::PARENT_PARAM, parent_id) {
            pairs.push((param, parent.to_string()));
        }
        let builder = self.request(Method::GET, path).query(&pairs);
        let envelope: ListEnvelope<R> = self.send_json(Method::GET, path, builder).await?;
        Ok(envelope.into_page(&query, R::matches))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = resource_path::<R>(id)?;
        self.delete_path(&path).await
    }

    async fn set_flag(&self, id: &str, value: bool) -> Result<R> {
        let path = resource_path::<R>(id)?;
        let mut body = serde_json::Map::new();
        body.insert(R::FLAG_FIELD.to_string(), serde_json::Value::Bool(value));
        self.put_json(&path, &body).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{DomainSummary, ProviderSummary, Resource};

    #[test]
    fn base_url_must_be_http() {
        assert!(ClientConfig::from_base_url("http://127.0.0.1:8000").is_ok());
        assert!(ClientConfig::from_base_url(" https://panel.example.com/ ").is_ok());
        assert!(matches!(
            ClientConfig::from_base_url("ftp://panel.example.com"),
            Err(ApiError::InvalidParameter { .. })
        ));
        assert!(ClientConfig::from_base_url("not a url").is_err());
    }

    #[test]
    fn urls_keep_base_prefix() {
        let config = ClientConfig::from_base_url("https://panel.example.com/admin/");
        let Ok(config) = config else {
            panic!("base url should parse");
        };
        let Ok(client) = RestClient::new(&config) else {
            panic!("client should build");
        };
        assert_eq!(
            client.url("/api/providers/"),
            "https://panel.example.com/admin/api/providers/"
        );
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(records_path("3").ok().as_deref(), Some("/api/domains/3/records"));
        assert_eq!(
            record_path("a/b").ok().as_deref(),
            Some("/api/domains/records/a%2Fb")
        );
        assert_eq!(
            resource_path::<DomainSummary>("7").ok().as_deref(),
            Some("/api/domains/7")
        );
        assert!(record_path("  ").is_err());
    }

    #[test]
    fn plain_array_is_searched_and_paged_locally() {
        let body = r#"[
            {"id":1,"name":"Aliyun","type":2,"enabled":true},
            {"id":2,"name":"Huawei A","type":1,"enabled":true},
            {"id":3,"name":"Huawei B","type":1,"enabled":false}
        ]"#;
        let envelope: std::result::Result<ListEnvelope<ProviderSummary>, _> =
            serde_json::from_str(body);
        let Ok(envelope) = envelope else {
            panic!("plain array should parse");
        };
        let page = envelope.into_page(&ListQuery::new(1, 1, "huawei"), ProviderSummary::matches);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "2");
        assert_eq!(page.pagination.total, 2);
        assert!(page.pagination.has_next);
    }

    #[test]
    fn plain_record_array_out_of_range_page_is_empty() {
        let body = r#"[
            {"id":1,"domain_id":3,"name":"example.com","type":1,"value":"192.0.2.1","ttl":600,"enabled":true},
            {"id":2,"domain_id":3,"name":"www.example.com","type":3,"value":"example.com","ttl":600,"enabled":true}
        ]"#;
        let envelope: std::result::Result<ListEnvelope<DnsRecord>, _> = serde_json::from_str(body);
        let Ok(envelope) = envelope else {
            panic!("record array should parse");
        };
        let page = envelope.into_page(&ListQuery::new(2, 5, ""), DnsRecord::matches);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 2);
        assert!(!page.pagination.is_in_range());
    }

    #[test]
    fn paged_object_is_used_as_is() {
        let body = r#"{"items":[{"id":5,"name":"example.com","provider_id":1,"enabled":true}],
            "pagination":{"page":1,"page_size":5,"total":1,"total_pages":1,
                          "has_prev":false,"has_next":false}}"#;
        let envelope: std::result::Result<ListEnvelope<DomainSummary>, _> =
            serde_json::from_str(body);
        let Ok(envelope) = envelope else {
            panic!("page object should parse");
        };
        let page = envelope.into_page(&ListQuery::default(), DomainSummary::matches);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total_pages, 1);
    }
}
