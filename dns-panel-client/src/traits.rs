use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    CreateRecordRequest, DnsRecord, ListQuery, Page, RecordPage, RecordQuery, Resource,
    UpdateRecordRequest,
};

/// DNS 记录接口
///
/// 后端负责分页与搜索，客户端只透传参数；每次调用都是一次独立请求，不做重试。
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// 获取某个域名下的记录（分页 + 搜索）
    ///
    /// `GET /api/domains/{domain_id}/records?page=&page_size=&search=`
    async fn list_records(&self, domain_id: &str, query: &RecordQuery) -> Result<RecordPage>;

    /// 创建记录
    ///
    /// `POST /api/domains/{domain_id}/records`，请求体中同样携带 `domain_id`
    async fn create_record(&self, domain_id: &str, req: &CreateRecordRequest)
        -> Result<DnsRecord>;

    /// 更新记录（全量替换可变字段）
    ///
    /// `PUT /api/domains/records/{record_id}`
    async fn update_record(&self, record_id: &str, req: &UpdateRecordRequest)
        -> Result<DnsRecord>;

    /// 删除记录
    ///
    /// `DELETE /api/domains/records/{record_id}`
    async fn delete_record(&self, record_id: &str) -> Result<()>;
}

/// 通用资源接口（服务商、域名、证书）
///
/// 列表端点既可能返回分页对象，也可能返回完整数组；后者在客户端完成过滤与分页，
/// 对调用方而言两者没有区别。
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    /// 获取资源列表
    ///
    /// `parent_id` 仅在 [`Resource::PARENT_PARAM`] 存在时生效。
    async fn list(&self, parent_id: Option<&str>, query: &ListQuery) -> Result<Page<R>>;

    /// 删除资源
    async fn delete(&self, id: &str) -> Result<()>;

    /// 设置资源的开关字段（[`Resource::FLAG_FIELD`]），返回更新后的资源
    async fn set_flag(&self, id: &str, value: bool) -> Result<R>;
}
