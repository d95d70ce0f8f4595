//! DNS 记录列表控制器
//!
//! 一个会话对应一个打开的域名记录视图。分页、搜索与请求排序由
//! [`PagedList`] 负责；这里在会话上附加编辑缓存与表单状态，关闭视图时一并丢弃。
//!
//! - 每次成功的列表请求整体替换快照与缓存，从不局部修补
//! - 增删改成功后重新加载当前页与当前搜索词
//! - 所有失败在操作内部转为提示，不向外传播

use std::sync::Arc;

use async_trait::async_trait;
use dns_panel_client::{ApiError, DnsRecord, ListQuery, RecordApi, RecordPage, RecordQuery};

use super::paged_list::{busy, no_active_view, ListBackend, ListPhase, ListSession, PagedList};
use crate::error::{CoreError, CoreResult};
use crate::traits::RecordView;
use crate::types::{
    submitted_priority, ActionControl, ActionOutcome, ControllerConfig, CreateRecordRequest,
    DomainRef, FormKind, NoticeLevel, NoticeScope, PageNav, RecordCommand, RecordDraft,
    RecordForm, RecordSnapshot, UpdateRecordRequest, ViewState,
};
use crate::utils::record_name::resolve_record_name;

/// Best-effort copy of the last fetched records, used to open the edit form
/// without a round trip.
#[derive(Debug, Default)]
struct PendingEditCache {
    records: Vec<DnsRecord>,
}

impl PendingEditCache {
    fn replace(&mut self, records: &[DnsRecord]) {
        self.records = records.to_vec();
    }

    fn invalidate(&mut self) {
        self.records.clear();
    }

    fn find(&self, record_id: &str) -> Option<&DnsRecord> {
        self.records.iter().find(|r| r.id == record_id)
    }
}

#[derive(Debug, Clone)]
enum OpenForm {
    /// Holds the last submitted draft when a submission failed.
    Add(Option<RecordDraft>),
    Edit(RecordForm),
}

impl OpenForm {
    fn kind(&self) -> FormKind {
        match self {
            Self::Add(_) => FormKind::Add,
            Self::Edit(_) => FormKind::Edit,
        }
    }
}

/// Record state carried by each session on top of the paged list.
#[derive(Debug, Default)]
struct RecordLayer {
    cache: PendingEditCache,
    form: Option<OpenForm>,
}

struct RecordSource {
    api: Arc<dyn RecordApi>,
    view: Arc<dyn RecordView>,
}

#[async_trait]
impl ListBackend for RecordSource {
    type Item = DnsRecord;
    type Scope = DomainRef;
    type Extra = RecordLayer;
    type View = dyn RecordView;

    fn subject(&self) -> String {
        "records".to_string()
    }

    fn view(&self) -> &Arc<dyn RecordView> {
        &self.view
    }

    async fn fetch_page(
        &self,
        domain: &DomainRef,
        query: &ListQuery,
    ) -> Result<RecordPage, ApiError> {
        log::debug!(
            "Loading records of domain {}: page {}, search {:?}",
            domain.id,
            query.page,
            query.search.as_deref().unwrap_or_default()
        );
        self.api.list_records(&domain.id, query).await
    }

    fn show(&self, session: &mut ListSession<Self>) {
        let Some(page) = &session.snapshot else {
            return;
        };
        session.extra.cache.replace(&page.items);
        self.view
            .render(&RecordSnapshot::from_page(&session.scope, page, &session.search));
    }
}

type Session = ListSession<RecordSource>;

/// 记录列表控制器
pub struct RecordListController {
    list: PagedList<RecordSource>,
}

impl RecordListController {
    /// 使用默认配置创建控制器
    #[must_use]
    pub fn new(api: Arc<dyn RecordApi>, view: Arc<dyn RecordView>) -> Self {
        Self::build(api, view, ControllerConfig::default())
    }

    /// 使用自定义配置创建控制器
    pub fn with_config(
        api: Arc<dyn RecordApi>,
        view: Arc<dyn RecordView>,
        config: ControllerConfig,
    ) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self::build(api, view, config))
    }

    fn build(api: Arc<dyn RecordApi>, view: Arc<dyn RecordView>, config: ControllerConfig) -> Self {
        Self {
            list: PagedList::new(RecordSource { api, view }, config),
        }
    }

    // ===== 状态查询 =====

    /// Derived state of the record view.
    pub fn view_state(&self) -> ViewState {
        self.list
            .with_session(|s| match (&s.extra.form, s.phase) {
                (Some(OpenForm::Add(_)), _) => ViewState::AddOpen,
                (Some(OpenForm::Edit(form)), _) => ViewState::EditOpen(form.record_id.clone()),
                (None, ListPhase::Loading) => ViewState::Loading,
                (None, ListPhase::Loaded) => ViewState::Loaded,
                (None, ListPhase::Error) => ViewState::Error,
            })
            .unwrap_or(ViewState::Closed)
    }

    /// The domain of the open view.
    pub fn domain(&self) -> Option<DomainRef> {
        self.list.with_session(|s| s.scope.clone())
    }

    /// What is currently rendered.
    pub fn snapshot(&self) -> Option<RecordSnapshot> {
        self.list
            .with_session(|s| {
                s.snapshot
                    .as_ref()
                    .map(|page| RecordSnapshot::from_page(&s.scope, page, &s.search))
            })
            .flatten()
    }

    /// Search term of the displayed page (`None` when no view is open).
    pub fn search_term(&self) -> Option<String> {
        self.list.with_session(|s| s.search.clone())
    }

    /// Record from the edit cache.
    pub fn cached_record(&self, record_id: &str) -> Option<DnsRecord> {
        self.list
            .with_session(|s| s.extra.cache.find(record_id).cloned())
            .flatten()
    }

    /// Draft kept after a failed add, for re-filling the form.
    pub fn retained_draft(&self) -> Option<RecordDraft> {
        self.list
            .with_session(|s| match &s.extra.form {
                Some(OpenForm::Add(draft)) => draft.clone(),
                _ => None,
            })
            .flatten()
    }

    /// Edit form state, if the edit form is open.
    pub fn edit_form(&self) -> Option<RecordForm> {
        self.list
            .with_session(|s| match &s.extra.form {
                Some(OpenForm::Edit(form)) => Some(form.clone()),
                _ => None,
            })
            .flatten()
    }

    pub fn is_busy(&self, control: &ActionControl) -> bool {
        self.list.is_busy(control)
    }

    // ===== 命令分发 =====

    /// Single entry point for view events.
    pub async fn dispatch(&self, command: RecordCommand) -> ActionOutcome {
        match command {
            RecordCommand::Open {
                domain_id,
                domain_name,
            } => self.open_domain(&domain_id, &domain_name).await,
            RecordCommand::LoadPage { page, search } => self.load_page(page, &search).await,
            RecordCommand::Navigate(nav) => self.navigate(nav).await,
            RecordCommand::Search(term) => self.search(&term).await,
            RecordCommand::ClearSearch => self.clear_search().await,
            RecordCommand::Refresh => self.refresh().await,
            RecordCommand::OpenAddForm => self.open_add_form(),
            RecordCommand::SubmitAdd(draft) => self.add_record(draft).await,
            RecordCommand::CancelForm => self.cancel_form(),
            RecordCommand::Edit(record_id) => self.edit_record(&record_id).await,
            RecordCommand::SubmitEdit(form) => self.submit_edit(form).await,
            RecordCommand::Delete(record_id) => self.delete_record(&record_id).await,
            RecordCommand::Close => self.close_view(),
        }
    }

    // ===== 列表 =====

    /// Open a record view for a domain, replacing any open one.
    pub async fn open_domain(&self, domain_id: &str, domain_name: &str) -> ActionOutcome {
        let domain = DomainRef {
            id: domain_id.trim().to_string(),
            name: domain_name.trim().trim_end_matches('.').to_string(),
        };
        if let Some(previous) = self.list.open(domain.clone(), RecordLayer::default()) {
            log::debug!("Replacing record view of {}", previous.scope.name);
        }
        self.view().attach(&domain);
        log::info!("Opened record view for {} ({})", domain.name, domain.id);
        self.list.load_page(1, "").await
    }

    /// Fetch `page` filtered by `search` and make it the displayed snapshot.
    pub async fn load_page(&self, page: u32, search: &str) -> ActionOutcome {
        self.list.load_page(page, search).await
    }

    /// Debounced search; always restarts from page 1.
    pub async fn search(&self, term: &str) -> ActionOutcome {
        self.list.search(term).await
    }

    /// Drop the filter immediately.
    pub async fn clear_search(&self) -> ActionOutcome {
        self.list.clear_search().await
    }

    /// First / previous / next / last.
    pub async fn navigate(&self, nav: PageNav) -> ActionOutcome {
        self.list.navigate(nav).await
    }

    /// Reload the current page and search.
    pub async fn refresh(&self) -> ActionOutcome {
        self.list.refresh().await
    }

    /// Discard the session and detach the view.
    pub fn close_view(&self) -> ActionOutcome {
        match self.list.close() {
            Some(session) => {
                self.view().detach();
                log::info!("Closed record view for {}", session.scope.name);
                ActionOutcome::Applied
            }
            None => ActionOutcome::Cancelled,
        }
    }

    // ===== 表单 =====

    pub fn open_add_form(&self) -> ActionOutcome {
        let opened = self.list.with_session(|s| {
            s.extra.form = Some(OpenForm::Add(None));
            self.view().open_add_form();
        });
        opened.map_or_else(|| no_active_view("Open add form"), |()| ActionOutcome::Applied)
    }

    pub fn cancel_form(&self) -> ActionOutcome {
        let closed = self.list.with_session(|s| {
            s.extra.form.take().map(|form| {
                self.view().close_form(form.kind());
            })
        });
        match closed {
            None => no_active_view("Cancel form"),
            Some(None) => ActionOutcome::Cancelled,
            Some(Some(())) => ActionOutcome::Applied,
        }
    }

    /// Create a record; on success reload the current page and search.
    pub async fn add_record(&self, draft: RecordDraft) -> ActionOutcome {
        let Some((generation, domain)) = self
            .list
            .with_session(|s| (s.generation, s.scope.clone()))
        else {
            return no_active_view("Add record");
        };
        let Some(_guard) = self.list.acquire(ActionControl::SubmitAdd) else {
            return busy(&ActionControl::SubmitAdd);
        };

        let request = match build_create_request(&domain, &draft) {
            Ok(request) => request,
            Err(e) => return self.fail_form(generation, OpenForm::Add(Some(draft)), e),
        };
        log::debug!("Creating {} record {}", request.record_type, request.name);

        let record = match self.api().create_record(&domain.id, &request).await {
            Ok(record) => record,
            Err(e) => return self.fail_form(generation, OpenForm::Add(Some(draft)), e.into()),
        };

        if !self.settle_change(generation, FormKind::Add) {
            return ActionOutcome::Stale;
        }
        log::info!("Record {} created: {}", record.id, record.name);
        self.list.post(
            NoticeScope::List,
            NoticeLevel::Success,
            format!("record {} added", record.name),
        );
        self.list.reload_after_change().await
    }

    /// Open the edit form, looking the record up in the cache first and in an
    /// unfiltered fetch otherwise.
    pub async fn edit_record(&self, record_id: &str) -> ActionOutcome {
        let Some((generation, domain_id, cached)) = self.list.with_session(|s| {
            (
                s.generation,
                s.scope.id.clone(),
                s.extra.cache.find(record_id).cloned(),
            )
        }) else {
            return no_active_view("Edit record");
        };

        let record = match cached {
            Some(record) => record,
            None => {
                log::debug!("Record {record_id} not cached, fetching first page unfiltered");
                let query = RecordQuery::new(1, self.list.config().edit_lookup_page_size, "");
                let fetched = match self.api().list_records(&domain_id, &query).await {
                    Ok(page) => page,
                    Err(e) => return self.list.fail_in_list(generation, "Edit record", e.into()),
                };
                let found = self.list.with_current(generation, |s| {
                    s.extra.cache.replace(&fetched.items);
                    s.extra.cache.find(record_id).cloned()
                });
                match found {
                    None => return ActionOutcome::Stale,
                    Some(None) => {
                        return self.list.fail_in_list(
                            generation,
                            "Edit record",
                            CoreError::RecordNotFound(record_id.to_string()),
                        )
                    }
                    Some(Some(record)) => record,
                }
            }
        };

        let form = RecordForm::from_record(&record);
        let opened = self.list.with_current(generation, |s| {
            self.view().open_edit_form(&form);
            s.extra.form = Some(OpenForm::Edit(form));
        });
        opened.map_or(ActionOutcome::Stale, |()| ActionOutcome::Applied)
    }

    /// Replace every mutable field of a record.
    pub async fn submit_edit(&self, form: RecordForm) -> ActionOutcome {
        let Some((generation, domain)) = self
            .list
            .with_session(|s| (s.generation, s.scope.clone()))
        else {
            return no_active_view("Edit record");
        };
        let Some(_guard) = self.list.acquire(ActionControl::SubmitEdit) else {
            return busy(&ActionControl::SubmitEdit);
        };

        let request = match build_update_request(&domain, &form) {
            Ok(request) => request,
            Err(e) => return self.fail_form(generation, OpenForm::Edit(form), e),
        };
        log::debug!("Updating record {} to {}", form.record_id, request.name);

        let record = match self.api().update_record(&form.record_id, &request).await {
            Ok(record) => record,
            Err(e) => return self.fail_form(generation, OpenForm::Edit(form), e.into()),
        };

        if !self.settle_change(generation, FormKind::Edit) {
            return ActionOutcome::Stale;
        }
        log::info!("Record {} updated", record.id);
        self.list.post(
            NoticeScope::List,
            NoticeLevel::Success,
            format!("record {} updated", record.name),
        );
        self.list.reload_after_change().await
    }

    /// Delete after confirmation; the current page is reloaded as the server
    /// paginates it afterwards.
    pub async fn delete_record(&self, record_id: &str) -> ActionOutcome {
        let Some((generation, description)) = self.list.with_session(|s| {
            let description = s.extra.cache.find(record_id).map_or_else(
                || record_id.to_string(),
                |r| format!("{} {} {}", r.name, r.record_type, r.value),
            );
            (s.generation, description)
        }) else {
            return no_active_view("Delete record");
        };
        let control = ActionControl::Delete(record_id.to_string());
        let Some(_guard) = self.list.acquire(control.clone()) else {
            return busy(&control);
        };

        if !self
            .view()
            .confirm(&format!("Delete record {description}?"))
            .await
        {
            log::debug!("Deletion of record {record_id} declined");
            return ActionOutcome::Cancelled;
        }
        if !self.list.is_current(generation) {
            return ActionOutcome::Stale;
        }

        if let Err(e) = self.api().delete_record(record_id).await {
            return self.list.fail_in_list(generation, "Delete record", e.into());
        }

        if self
            .list
            .with_current(generation, |s| s.extra.cache.invalidate())
            .is_none()
        {
            return ActionOutcome::Stale;
        }
        log::info!("Record {record_id} deleted");
        self.list.post(
            NoticeScope::List,
            NoticeLevel::Success,
            format!("record {description} deleted"),
        );
        self.list.reload_after_change().await
    }

    // ===== 内部实现 =====

    fn api(&self) -> &dyn RecordApi {
        &*self.list.backend().api
    }

    fn view(&self) -> &Arc<dyn RecordView> {
        &self.list.backend().view
    }

    /// Close the submitted form and drop the cache after a successful change.
    /// `false` if the session was replaced meanwhile.
    fn settle_change(&self, generation: u64, kind: FormKind) -> bool {
        self.list
            .with_current(generation, |s| {
                if s.extra.form.as_ref().map(OpenForm::kind) == Some(kind) {
                    s.extra.form = None;
                    self.view().close_form(kind);
                }
                s.extra.cache.invalidate();
            })
            .is_some()
    }

    /// Keep the submitted form open with its input and show `err` inside it.
    fn fail_form(&self, generation: u64, form: OpenForm, err: CoreError) -> ActionOutcome {
        let (scope, action) = match &form {
            OpenForm::Add(_) => (NoticeScope::AddForm, "Add record"),
            OpenForm::Edit(_) => (NoticeScope::EditForm, "Edit record"),
        };
        if self
            .list
            .with_current(generation, |s| self.keep_form(s, form))
            .is_none()
        {
            return ActionOutcome::Stale;
        }
        self.list.fail(scope, action, err)
    }

    /// Store `form` as the open form, (re)opening it in the view unless the
    /// same form is already shown.
    fn keep_form(&self, session: &mut Session, form: OpenForm) {
        let shown = match (&session.extra.form, &form) {
            (Some(OpenForm::Add(_)), OpenForm::Add(_)) => true,
            (Some(OpenForm::Edit(open)), OpenForm::Edit(submitted)) => {
                open.record_id == submitted.record_id
            }
            _ => false,
        };
        if !shown {
            if let Some(other) = &session.extra.form {
                self.view().close_form(other.kind());
            }
            match &form {
                OpenForm::Add(_) => self.view().open_add_form(),
                OpenForm::Edit(form) => self.view().open_edit_form(form),
            }
        }
        session.extra.form = Some(form);
    }
}

/// 必填字段检查
fn check_required(value: &str, ttl: u32) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation("value is required".to_string()));
    }
    if ttl == 0 {
        return Err(CoreError::Validation(
            "ttl must be a positive number of seconds".to_string(),
        ));
    }
    Ok(())
}

fn build_create_request(domain: &DomainRef, draft: &RecordDraft) -> CoreResult<CreateRecordRequest> {
    let name = resolve_record_name(&draft.label, &domain.name)?;
    check_required(&draft.value, draft.ttl)?;
    Ok(CreateRecordRequest {
        domain_id: domain.id.clone(),
        name,
        record_type: draft.record_type,
        value: draft.value.trim().to_string(),
        ttl: draft.ttl,
        enabled: draft.enabled,
        priority: submitted_priority(draft.record_type, draft.priority),
    })
}

fn build_update_request(domain: &DomainRef, form: &RecordForm) -> CoreResult<UpdateRecordRequest> {
    let name = resolve_record_name(&form.name, &domain.name)?;
    check_required(&form.value, form.ttl)?;
    Ok(UpdateRecordRequest {
        name,
        record_type: form.record_type,
        value: form.value.trim().to_string(),
        ttl: form.ttl,
        enabled: form.enabled,
        priority: submitted_priority(form.record_type, form.priority),
    })
}

#[cfg(test)]
#[path = "record_list_controller_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;
