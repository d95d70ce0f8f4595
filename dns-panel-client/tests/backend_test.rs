//! 面板后端集成测试
//!
//! 运行方式:
//! ```bash
//! DNS_PANEL_TEST_BASE_URL=http://127.0.0.1:8000 DNS_PANEL_TEST_DOMAIN_ID=1 \
//! DNS_PANEL_TEST_DOMAIN=example.com \
//!     cargo test -p dns-panel-client --test backend_test -- --ignored --nocapture --test-threads=1
//! ```

mod common;

use common::{generate_test_label, TestContext};
use dns_panel_client::{
    ApiError, CertificateSummary, DnsRecordType, DomainSummary, ListQuery, ProviderSummary,
    RecordApi, RecordQuery, ResourceApi, UpdateRecordRequest,
};

const REQUIRED_ENV: [&str; 3] = [
    "DNS_PANEL_TEST_BASE_URL",
    "DNS_PANEL_TEST_DOMAIN_ID",
    "DNS_PANEL_TEST_DOMAIN",
];

// ============ 基础测试 ============

#[tokio::test]
#[ignore]
async fn test_list_records_first_page() {
    skip_if_no_env!(REQUIRED_ENV[0], REQUIRED_ENV[1], REQUIRED_ENV[2]);

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let page = require_ok!(
        ctx.client
            .list_records(&ctx.domain_id, &RecordQuery::default())
            .await,
        "list_records 调用失败"
    );

    let meta = &page.pagination;
    assert_eq!(meta.page, 1);
    assert!(page.items.len() <= meta.page_size as usize);
    assert_eq!(
        page.items.len() as u32,
        meta.page_size.min(meta.total),
        "首页行数应为 min(page_size, total)"
    );
    assert!(!meta.has_prev);

    println!("✓ list_records 测试通过，共 {} 条记录", meta.total);
}

#[tokio::test]
#[ignore]
async fn test_list_records_is_idempotent() {
    skip_if_no_env!(REQUIRED_ENV[0], REQUIRED_ENV[1], REQUIRED_ENV[2]);

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let query = RecordQuery::default();
    let first = require_ok!(ctx.client.list_records(&ctx.domain_id, &query).await);
    let second = require_ok!(ctx.client.list_records(&ctx.domain_id, &query).await);
    assert_eq!(first, second, "无变更时两次读取结果应一致");

    println!("✓ 幂等读取测试通过");
}

#[tokio::test]
#[ignore]
async fn test_unknown_record_is_http_error() {
    skip_if_no_env!(REQUIRED_ENV[0], REQUIRED_ENV[1], REQUIRED_ENV[2]);

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let result = ctx.client.delete_record("999999999").await;
    assert!(
        matches!(&result, Err(ApiError::Http { .. })),
        "删除不存在的记录应返回 HTTP 错误: {result:?}"
    );

    println!("✓ 错误映射测试通过: {result:?}");
}

#[tokio::test]
#[ignore]
async fn test_resource_lists() {
    skip_if_no_env!(REQUIRED_ENV[0], REQUIRED_ENV[1], REQUIRED_ENV[2]);

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let query = ListQuery::default();

    let providers: dns_panel_client::Page<ProviderSummary> =
        require_ok!(ctx.client.list(None, &query).await, "providers 列表失败");
    let domains: dns_panel_client::Page<DomainSummary> =
        require_ok!(ctx.client.list(None, &query).await, "domains 列表失败");
    let certificates: dns_panel_client::Page<CertificateSummary> =
        require_ok!(ctx.client.list(None, &query).await, "certificates 列表失败");

    println!(
        "✓ 资源列表测试通过: {} providers, {} domains, {} certificates",
        providers.pagination.total, domains.pagination.total, certificates.pagination.total
    );
}

// ============ CRUD 测试 ============

#[tokio::test]
#[ignore]
async fn test_record_crud() {
    skip_if_no_env!(REQUIRED_ENV[0], REQUIRED_ENV[1], REQUIRED_ENV[2]);

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let label = generate_test_label();
    println!("测试记录: {label}");

    // 1. 创建记录
    let created = require_some!(ctx.create_test_record(&label).await, "create_record 失败");
    assert_eq!(created.name, ctx.fqdn(&label));
    println!("  ✓ 创建成功: id={}", created.id);

    // 2. 按名称搜索能找到
    let query = RecordQuery::new(1, 100, &label);
    let page = require_ok!(ctx.client.list_records(&ctx.domain_id, &query).await);
    assert!(
        page.items.iter().any(|r| r.id == created.id),
        "创建的记录应该能被找到"
    );
    println!("  ✓ 验证存在");

    // 3. 全量替换：A -> MX，携带 priority
    let update = UpdateRecordRequest {
        name: created.name.clone(),
        record_type: DnsRecordType::Mx,
        value: "mail.example.com".to_string(),
        ttl: 1200,
        enabled: true,
        priority: Some(20),
    };
    let updated = ctx.client.update_record(&created.id, &update).await;
    if updated.is_err() {
        ctx.cleanup_record(&created.id).await;
    }
    let updated = require_ok!(updated, "update_record 失败");
    assert_eq!(updated.ttl, 1200, "TTL 应该被更新为 1200");
    assert_eq!(updated.record_type, DnsRecordType::Mx);
    assert_eq!(updated.priority, Some(20));
    println!("  ✓ 更新成功");

    // 4. 删除记录
    require_ok!(
        ctx.client.delete_record(&created.id).await,
        "delete_record 失败"
    );
    println!("  ✓ 删除成功");

    // 5. 验证已删除
    let page = require_ok!(ctx.client.list_records(&ctx.domain_id, &query).await);
    assert!(
        !page.items.iter().any(|r| r.id == created.id),
        "记录应该已被删除"
    );
    println!("  ✓ 验证删除");
}

// ============ 清理测试 ============

/// 清理所有残留的测试记录（手动运行）
#[tokio::test]
#[ignore]
async fn test_cleanup_test_records() {
    skip_if_no_env!(REQUIRED_ENV[0], REQUIRED_ENV[1], REQUIRED_ENV[2]);

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    ctx.cleanup_all_test_records().await;
    println!("✓ 清理完成");
}
