//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;

use dns_panel_client::{
    ClientConfig, CreateRecordRequest, DnsRecord, DnsRecordType, RecordApi, RecordQuery,
    RestClient,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_env {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 测试记录名前缀，清理时按此前缀匹配
pub const TEST_LABEL_PREFIX: &str = "_test-";

/// 生成唯一的测试记录标签
pub fn generate_test_label() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("{TEST_LABEL_PREFIX}{}", &uuid.to_string()[..8])
}

/// 测试上下文 - 封装客户端和测试域名
pub struct TestContext {
    pub client: RestClient,
    /// 测试域名 ID
    pub domain_id: String,
    /// 测试域名（用于拼接完整记录名）
    pub domain: String,
}

impl TestContext {
    /// 从环境变量创建测试上下文
    ///
    /// - `DNS_PANEL_TEST_BASE_URL`
    /// - `DNS_PANEL_TEST_DOMAIN_ID`
    /// - `DNS_PANEL_TEST_DOMAIN`
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("DNS_PANEL_TEST_BASE_URL").ok()?;
        let domain_id = env::var("DNS_PANEL_TEST_DOMAIN_ID").ok()?;
        let domain = env::var("DNS_PANEL_TEST_DOMAIN").ok()?;

        let config = ClientConfig::from_base_url(&base_url).ok()?;
        let client = RestClient::new(&config).ok()?;

        Some(Self {
            client,
            domain_id,
            domain,
        })
    }

    /// 完整记录名
    pub fn fqdn(&self, label: &str) -> String {
        format!("{label}.{}", self.domain)
    }

    /// 创建一条 TXT 测试记录
    pub async fn create_test_record(&self, label: &str) -> Option<DnsRecord> {
        let request = CreateRecordRequest {
            domain_id: self.domain_id.clone(),
            name: self.fqdn(label),
            record_type: DnsRecordType::Txt,
            value: "\"integration-test\"".to_string(),
            ttl: 600,
            enabled: true,
            priority: None,
        };
        self.client
            .create_record(&self.domain_id, &request)
            .await
            .ok()
    }

    /// 清理测试记录
    pub async fn cleanup_record(&self, record_id: &str) {
        let _ = self.client.delete_record(record_id).await;
    }

    /// 查找并清理所有测试记录（名称以 _test- 开头）
    pub async fn cleanup_all_test_records(&self) {
        let query = RecordQuery::new(1, 100, TEST_LABEL_PREFIX);
        if let Ok(page) = self.client.list_records(&self.domain_id, &query).await {
            for record in page.items {
                if record.name.starts_with(TEST_LABEL_PREFIX) {
                    let _ = self.client.delete_record(&record.id).await;
                }
            }
        }
    }
}
