//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dns_panel_client::{
    ApiError, CreateRecordRequest, DnsRecord, DnsRecordType, ListQuery, Page, RecordApi,
    RecordPage, RecordQuery, Resource, ResourceApi, Result as ApiResult, UpdateRecordRequest,
};
use serde::de::DeserializeOwned;
use tokio::sync::{Notify, RwLock};

use crate::traits::{BusyIndicator, NoticeSink, RecordView, ResourceView};
use crate::types::{
    ActionControl, DomainRef, FormKind, Notice, NoticeScope, RecordForm, RecordSnapshot,
    ResourceSnapshot,
};

pub const DOMAIN_ID: &str = "1";
pub const DOMAIN: &str = "example.com";

/// 构造测试记录
pub fn record(id: u32, label: &str, record_type: DnsRecordType, value: &str) -> DnsRecord {
    let name = if label == "@" {
        DOMAIN.to_string()
    } else {
        format!("{label}.{DOMAIN}")
    };
    DnsRecord {
        id: id.to_string(),
        domain_id: DOMAIN_ID.to_string(),
        name,
        record_type,
        value: value.to_string(),
        ttl: 600,
        enabled: true,
        priority: (record_type == DnsRecordType::Mx).then_some(10),
        created_at: None,
        updated_at: None,
    }
}

/// `count` 条 A 记录：host1 .. hostN
pub fn a_records(count: u32) -> Vec<DnsRecord> {
    (1..=count)
        .map(|i| record(i, &format!("host{i}"), DnsRecordType::A, &format!("10.0.0.{i}")))
        .collect()
}

fn not_found() -> ApiError {
    ApiError::Http {
        status: 404,
        detail: "解析记录不存在".to_string(),
    }
}

// ===== MockRecordApi =====

/// In-memory records backend that paginates and searches server-side.
pub struct MockRecordApi {
    records: RwLock<Vec<DnsRecord>>,
    next_id: AtomicU64,
    /// 下一次对应操作返回的错误（"list" / "create" / "update" / "delete"）
    failures: Mutex<HashMap<&'static str, ApiError>>,
    /// 按搜索词挂起 list 请求，直到测试放行
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    list_calls: Mutex<Vec<RecordQuery>>,
    last_create: Mutex<Option<CreateRecordRequest>>,
    last_update: Mutex<Option<UpdateRecordRequest>>,
}

impl MockRecordApi {
    pub fn new(records: Vec<DnsRecord>) -> Self {
        let next_id = records
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            records: RwLock::new(records),
            next_id: AtomicU64::new(next_id),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            list_calls: Mutex::new(Vec::new()),
            last_create: Mutex::new(None),
            last_update: Mutex::new(None),
        }
    }

    pub fn fail_next(&self, operation: &'static str, err: ApiError) {
        self.failures.lock().unwrap().insert(operation, err);
    }

    /// Hold list requests searching for `search` until the returned handle is
    /// notified.
    pub fn gate(&self, search: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(search.to_string(), Arc::clone(&notify));
        notify
    }

    pub fn list_calls(&self) -> Vec<RecordQuery> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn last_create(&self) -> Option<CreateRecordRequest> {
        self.last_create.lock().unwrap().clone()
    }

    pub fn last_update(&self) -> Option<UpdateRecordRequest> {
        self.last_update.lock().unwrap().clone()
    }

    pub async fn records(&self) -> Vec<DnsRecord> {
        self.records.read().await.clone()
    }

    pub async fn remove_directly(&self, record_id: &str) {
        self.records.write().await.retain(|r| r.id != record_id);
    }

    fn take_failure(&self, operation: &'static str) -> ApiResult<()> {
        match self.failures.lock().unwrap().remove(operation) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordApi for MockRecordApi {
    async fn list_records(&self, domain_id: &str, query: &RecordQuery) -> ApiResult<RecordPage> {
        self.list_calls.lock().unwrap().push(query.clone());
        let gate = self
            .gates
            .lock()
            .unwrap()
            .get(query.search.as_deref().unwrap_or_default())
            .cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.take_failure("list")?;

        let records = self.records.read().await;
        let filtered: Vec<DnsRecord> = records
            .iter()
            .filter(|r| r.domain_id == domain_id)
            .filter(|r| query.search.as_deref().is_none_or(|term| r.matches(term)))
            .cloned()
            .collect();
        Ok(Page::from_full_list(&filtered, query))
    }

    async fn create_record(
        &self,
        domain_id: &str,
        request: &CreateRecordRequest,
    ) -> ApiResult<DnsRecord> {
        *self.last_create.lock().unwrap() = Some(request.clone());
        self.take_failure("create")?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = DnsRecord {
            id: id.to_string(),
            domain_id: domain_id.to_string(),
            name: request.name.clone(),
            record_type: request.record_type,
            value: request.value.clone(),
            ttl: request.ttl,
            enabled: request.enabled,
            priority: request.priority,
            created_at: None,
            updated_at: None,
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        record_id: &str,
        request: &UpdateRecordRequest,
    ) -> ApiResult<DnsRecord> {
        *self.last_update.lock().unwrap() = Some(request.clone());
        self.take_failure("update")?;

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(not_found)?;
        record.name.clone_from(&request.name);
        record.record_type = request.record_type;
        record.value.clone_from(&request.value);
        record.ttl = request.ttl;
        record.enabled = request.enabled;
        // 未传 priority 时保留原值
        if request.priority.is_some() {
            record.priority = request.priority;
        }
        Ok(record.clone())
    }

    async fn delete_record(&self, record_id: &str) -> ApiResult<()> {
        self.take_failure("delete")?;
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != record_id);
        if records.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

// ===== MockResourceApi =====

/// In-memory resource collection; `set_flag` edits the item through a JSON
/// round trip so any [`Resource`] works.
pub struct MockResourceApi<R> {
    items: RwLock<Vec<R>>,
    failures: Mutex<HashMap<&'static str, ApiError>>,
    /// set_flag 挂起直到放行
    flag_gate: Mutex<Option<Arc<Notify>>>,
    parents: Mutex<Vec<Option<String>>>,
}

impl<R: Resource + serde::Serialize> MockResourceApi<R> {
    pub fn new(items: Vec<R>) -> Self {
        Self {
            items: RwLock::new(items),
            failures: Mutex::new(HashMap::new()),
            flag_gate: Mutex::new(None),
            parents: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next(&self, operation: &'static str, err: ApiError) {
        self.failures.lock().unwrap().insert(operation, err);
    }

    pub fn gate_flag(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.flag_gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn parents(&self) -> Vec<Option<String>> {
        self.parents.lock().unwrap().clone()
    }

    pub async fn items(&self) -> Vec<R> {
        self.items.read().await.clone()
    }

    fn take_failure(&self, operation: &'static str) -> ApiResult<()> {
        match self.failures.lock().unwrap().remove(operation) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn with_flag<R: Resource + serde::Serialize>(item: &R, value: bool) -> ApiResult<R> {
    let mut json = serde_json::to_value(item).map_err(|e| ApiError::Parse {
        detail: e.to_string(),
    })?;
    json[R::FLAG_FIELD] = serde_json::Value::Bool(value);
    from_value(json)
}

fn from_value<R: DeserializeOwned>(json: serde_json::Value) -> ApiResult<R> {
    serde_json::from_value(json).map_err(|e| ApiError::Parse {
        detail: e.to_string(),
    })
}

#[async_trait]
impl<R: Resource + serde::Serialize> ResourceApi<R> for MockResourceApi<R> {
    async fn list(&self, parent_id: Option<&str>, query: &ListQuery) -> ApiResult<Page<R>> {
        self.parents
            .lock()
            .unwrap()
            .push(parent_id.map(str::to_string));
        self.take_failure("list")?;
        let filtered: Vec<R> = self
            .items
            .read()
            .await
            .iter()
            .filter(|item| query.search.as_deref().is_none_or(|term| item.matches(term)))
            .cloned()
            .collect();
        Ok(Page::from_full_list(&filtered, query))
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.take_failure("delete")?;
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn set_flag(&self, id: &str, value: bool) -> ApiResult<R> {
        let gate = self.flag_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.take_failure("set_flag")?;
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(not_found)?;
        *item = with_flag(item, value)?;
        Ok(item.clone())
    }
}

// ===== RecordingView =====

/// Every call the controller made on the view, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Attach(DomainRef),
    Render,
    OpenAdd,
    OpenEdit(String),
    CloseForm(FormKind),
    Detach,
    Flag(String, bool),
    Confirm(String),
}

/// View that records what it was told to show.
pub struct RecordingView<R = ()> {
    confirm_answer: AtomicBool,
    events: Mutex<Vec<ViewEvent>>,
    renders: Mutex<Vec<RecordSnapshot>>,
    resource_renders: Mutex<Vec<ResourceSnapshot<R>>>,
    notices: Mutex<Vec<Notice>>,
    dismissed: Mutex<Vec<u64>>,
    busy: Mutex<Vec<(ActionControl, bool)>>,
}

impl<R> RecordingView<R> {
    pub fn new() -> Self {
        Self {
            confirm_answer: AtomicBool::new(true),
            events: Mutex::new(Vec::new()),
            renders: Mutex::new(Vec::new()),
            resource_renders: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
            dismissed: Mutex::new(Vec::new()),
            busy: Mutex::new(Vec::new()),
        }
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    pub fn last_render(&self) -> Option<RecordSnapshot> {
        self.renders.lock().unwrap().last().cloned()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn notices_in(&self, scope: NoticeScope) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(|n| n.scope == scope)
            .collect()
    }

    pub fn dismissed(&self) -> Vec<u64> {
        self.dismissed.lock().unwrap().clone()
    }

    pub fn busy_calls(&self) -> Vec<(ActionControl, bool)> {
        self.busy.lock().unwrap().clone()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl<R: Clone> RecordingView<R> {
    pub fn last_resource_render(&self) -> Option<ResourceSnapshot<R>> {
        self.resource_renders.lock().unwrap().last().cloned()
    }
}

impl<R: Send + Sync> BusyIndicator for RecordingView<R> {
    fn set_busy(&self, control: &ActionControl, busy: bool) {
        self.busy.lock().unwrap().push((control.clone(), busy));
    }
}

impl<R: Send + Sync> NoticeSink for RecordingView<R> {
    fn show_notice(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }

    fn dismiss_notice(&self, _scope: NoticeScope, id: u64) {
        self.dismissed.lock().unwrap().push(id);
    }
}

#[async_trait]
impl RecordView for RecordingView {
    fn attach(&self, domain: &DomainRef) {
        self.push(ViewEvent::Attach(domain.clone()));
    }

    fn render(&self, snapshot: &RecordSnapshot) {
        self.push(ViewEvent::Render);
        self.renders.lock().unwrap().push(snapshot.clone());
    }

    fn open_add_form(&self) {
        self.push(ViewEvent::OpenAdd);
    }

    fn open_edit_form(&self, form: &RecordForm) {
        self.push(ViewEvent::OpenEdit(form.record_id.clone()));
    }

    fn close_form(&self, kind: FormKind) {
        self.push(ViewEvent::CloseForm(kind));
    }

    fn detach(&self) {
        self.push(ViewEvent::Detach);
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.push(ViewEvent::Confirm(prompt.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: Resource> ResourceView<R> for RecordingView<R> {
    fn render(&self, snapshot: &ResourceSnapshot<R>) {
        self.push(ViewEvent::Render);
        self.resource_renders.lock().unwrap().push(snapshot.clone());
    }

    fn show_flag(&self, id: &str, value: bool) {
        self.push(ViewEvent::Flag(id.to_string(), value));
    }

    fn detach(&self) {
        self.push(ViewEvent::Detach);
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.push(ViewEvent::Confirm(prompt.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }
}
