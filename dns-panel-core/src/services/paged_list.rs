//! 分页列表核心
//!
//! 记录列表与资源列表共用的部分：会话代数、请求序号、分页导航、搜索防抖、
//! 控件互斥与快照整体替换。上层控制器通过 [`ListBackend`] 提供数据来源和
//! 渲染方式，并在会话的 `extra` 中保存各自的附加状态（编辑缓存、表单、开关）。

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use dns_panel_client::{ApiError, ListQuery, Page, PageMeta};

use crate::error::CoreError;
use crate::services::notice_board::NoticeBoard;
use crate::services::sequencing::{
    lock, BusyControls, BusyGuard, Debouncer, RequestSequence, Ticket,
};
use crate::traits::{BusyIndicator, NoticeSink};
use crate::types::{
    ActionControl, ActionOutcome, ControllerConfig, NoticeLevel, NoticeScope, PageNav,
};

/// Where a list fetch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchOrigin {
    /// Page / search chosen by the user: an out-of-range page keeps the
    /// previous snapshot.
    User,
    /// Reload of the current page: server pagination is trusted as returned.
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListPhase {
    Loading,
    Loaded,
    Error,
}

/// Data source and display of one kind of paged list.
#[async_trait]
pub(crate) trait ListBackend: Send + Sync {
    type Item: Clone + Send + Sync;
    /// What a session lists, e.g. one domain or the children of a parent.
    type Scope: Clone + Send + Sync;
    /// Per-session state owned by the controller built on top.
    type Extra: Send;
    type View: BusyIndicator + NoticeSink + ?Sized + 'static;

    /// Used in log lines and load failure notices, e.g. `records`.
    fn subject(&self) -> String;

    fn view(&self) -> &Arc<Self::View>;

    async fn fetch_page(
        &self,
        scope: &Self::Scope,
        query: &ListQuery,
    ) -> Result<Page<Self::Item>, ApiError>;

    /// Render `session.snapshot`. Called with the session lock held right
    /// after a fetched page replaced the snapshot.
    fn show(&self, session: &mut ListSession<Self>);
}

/// One open list.
pub(crate) struct ListSession<B: ListBackend + ?Sized> {
    pub generation: u64,
    pub scope: B::Scope,
    /// Search term of the displayed snapshot.
    pub search: String,
    pub snapshot: Option<Page<B::Item>>,
    pub phase: ListPhase,
    pub extra: B::Extra,
    requests: RequestSequence,
}

impl<B: ListBackend + ?Sized> ListSession<B> {
    fn current_page(&self) -> u32 {
        self.snapshot.as_ref().map_or(1, |p| p.pagination.page)
    }
}

struct ListState<B: ListBackend> {
    next_generation: u64,
    session: Option<ListSession<B>>,
}

/// Page targeted by a pagination button, `None` when the button is disabled.
pub fn target_page(meta: &PageMeta, nav: PageNav) -> Option<u32> {
    match nav {
        PageNav::First => meta.has_prev.then_some(1),
        PageNav::Prev => meta.has_prev.then(|| meta.page.saturating_sub(1).max(1)),
        PageNav::Next => meta.page.checked_add(1).filter(|_| meta.has_next),
        PageNav::Last => meta.has_next.then_some(meta.total_pages),
    }
}

/// Paged, searchable list with at most one applied response per request
/// sequence.
pub(crate) struct PagedList<B: ListBackend> {
    backend: B,
    config: ControllerConfig,
    state: Mutex<ListState<B>>,
    busy: BusyControls,
    notices: NoticeBoard,
    debounce: Debouncer,
}

impl<B: ListBackend> PagedList<B> {
    pub fn new(backend: B, config: ControllerConfig) -> Self {
        Self {
            backend,
            notices: NoticeBoard::new(&config),
            config,
            state: Mutex::new(ListState {
                next_generation: 0,
                session: None,
            }),
            busy: BusyControls::default(),
            debounce: Debouncer::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.lock_state().session.is_some()
    }

    pub fn is_busy(&self, control: &ActionControl) -> bool {
        self.busy.is_busy(control)
    }

    // ===== 会话 =====

    /// Start a new session; the replaced one, if any, is returned and every
    /// response still in flight for it becomes stale.
    pub fn open(&self, scope: B::Scope, extra: B::Extra) -> Option<ListSession<B>> {
        self.debounce.bump();
        let mut state = self.lock_state();
        state.next_generation += 1;
        let session = ListSession {
            generation: state.next_generation,
            scope,
            search: String::new(),
            snapshot: None,
            phase: ListPhase::Loading,
            extra,
            requests: RequestSequence::default(),
        };
        state.session.replace(session)
    }

    /// Discard the session.
    pub fn close(&self) -> Option<ListSession<B>> {
        self.debounce.bump();
        self.lock_state().session.take()
    }

    // ===== 分页与搜索 =====

    /// Fetch `page` filtered by `search` and make it the displayed snapshot.
    pub async fn load_page(&self, page: u32, search: &str) -> ActionOutcome {
        self.fetch(page, search, FetchOrigin::User).await
    }

    /// Debounced search; always restarts from page 1.
    pub async fn search(&self, term: &str) -> ActionOutcome {
        if !self.debounce.settle(self.config.search_debounce).await {
            log::debug!("Search \"{term}\" superseded by a newer keystroke");
            return ActionOutcome::Stale;
        }
        self.load_page(1, term).await
    }

    /// Drop the filter immediately.
    pub async fn clear_search(&self) -> ActionOutcome {
        self.debounce.bump();
        self.load_page(1, "").await
    }

    /// First / previous / next / last.
    pub async fn navigate(&self, nav: PageNav) -> ActionOutcome {
        let Some(target) = self.with_session(|s| {
            s.snapshot
                .as_ref()
                .and_then(|page| target_page(&page.pagination, nav))
                .map(|page| (page, s.search.clone()))
        }) else {
            return no_active_view("Navigate");
        };
        let Some((page, search)) = target else {
            log::debug!("Pagination button {nav:?} is disabled");
            return ActionOutcome::Cancelled;
        };
        let Some(_guard) = self.acquire(ActionControl::Pagination) else {
            return busy(&ActionControl::Pagination);
        };
        self.load_page(page, &search).await
    }

    /// Reload the current page and search.
    pub async fn refresh(&self) -> ActionOutcome {
        let Some(_guard) = self.acquire(ActionControl::Refresh) else {
            return busy(&ActionControl::Refresh);
        };
        self.reload_current().await
    }

    /// Reload after a successful change: `Applied` unless the reload failed.
    pub async fn reload_after_change(&self) -> ActionOutcome {
        match self.reload_current().await {
            failed @ ActionOutcome::Failed(_) => failed,
            _ => ActionOutcome::Applied,
        }
    }

    async fn reload_current(&self) -> ActionOutcome {
        let Some((page, search)) = self.with_session(|s| (s.current_page(), s.search.clone()))
        else {
            return ActionOutcome::Stale;
        };
        self.fetch(page, &search, FetchOrigin::Reload).await
    }

    async fn fetch(&self, page: u32, search: &str, origin: FetchOrigin) -> ActionOutcome {
        let page = page.max(1);
        let search = search.trim();
        let Some((ticket, scope)) = self.with_session(|s| {
            s.phase = ListPhase::Loading;
            (s.requests.issue(s.generation), s.scope.clone())
        }) else {
            return no_active_view(&format!("Load {}", self.backend.subject()));
        };

        let query = ListQuery::new(page, self.config.page_size, search);
        let result = self.backend.fetch_page(&scope, &query).await;
        self.apply(ticket, page, search, origin, result)
    }

    fn apply(
        &self,
        ticket: Ticket,
        requested_page: u32,
        search: &str,
        origin: FetchOrigin,
        result: Result<Page<B::Item>, ApiError>,
    ) -> ActionOutcome {
        let subject = self.backend.subject();
        let mut state = self.lock_state();
        let Some(session) = state
            .session
            .as_mut()
            .filter(|s| s.generation == ticket.generation)
        else {
            log::debug!("Discarding {subject} response for a closed view");
            return ActionOutcome::Stale;
        };
        if !session.requests.is_latest(ticket) {
            log::debug!("Discarding stale {subject} response #{}", ticket.seq);
            return ActionOutcome::Stale;
        }

        let page = match result {
            Ok(page) if origin == FetchOrigin::User && !page.pagination.is_in_range() => {
                Err(CoreError::PageOutOfRange {
                    page: requested_page,
                    total_pages: page.pagination.total_pages,
                })
            }
            Ok(page) => Ok(page),
            Err(e) => Err(CoreError::from(e)),
        };

        match page {
            Ok(page) => {
                session.search = search.to_string();
                session.snapshot = Some(page);
                session.phase = ListPhase::Loaded;
                self.backend.show(session);
                ActionOutcome::Applied
            }
            Err(e) => {
                e.log(&format!("Load {subject}"));
                session.phase = ListPhase::Error;
                self.post(
                    NoticeScope::List,
                    NoticeLevel::Error,
                    format!("failed to load {subject}: {}", e.user_message()),
                );
                ActionOutcome::Failed(e)
            }
        }
    }

    // ===== 控件与提示 =====

    /// Mark `control` busy for as long as the guard lives.
    pub fn acquire(&self, control: ActionControl) -> Option<BusyGuard<'_, B::View>> {
        self.busy.try_acquire(control, &**self.backend.view())
    }

    pub fn post(&self, scope: NoticeScope, level: NoticeLevel, message: impl Into<String>) {
        self.notices.post(self.backend.view(), scope, level, message);
    }

    /// Log `err` and show it in `scope`.
    pub fn fail(&self, scope: NoticeScope, action: &str, err: CoreError) -> ActionOutcome {
        err.log(action);
        self.post(scope, NoticeLevel::Error, err.user_message());
        ActionOutcome::Failed(err)
    }

    /// Like [`fail`](Self::fail) in the list scope, unless the session has
    /// been replaced meanwhile.
    pub fn fail_in_list(&self, generation: u64, action: &str, err: CoreError) -> ActionOutcome {
        if !self.is_current(generation) {
            return ActionOutcome::Stale;
        }
        self.fail(NoticeScope::List, action, err)
    }

    // ===== 会话访问 =====

    pub fn with_session<T>(&self, f: impl FnOnce(&mut ListSession<B>) -> T) -> Option<T> {
        self.lock_state().session.as_mut().map(f)
    }

    /// Run `f` only if session `generation` is still the open one.
    pub fn with_current<T>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut ListSession<B>) -> T,
    ) -> Option<T> {
        self.lock_state()
            .session
            .as_mut()
            .filter(|s| s.generation == generation)
            .map(f)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.with_current(generation, |_| ()).is_some()
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState<B>> {
        lock(&self.state)
    }
}

pub(crate) fn no_active_view(action: &str) -> ActionOutcome {
    let err = CoreError::NoActiveView;
    err.log(action);
    ActionOutcome::Failed(err)
}

pub(crate) fn busy(control: &ActionControl) -> ActionOutcome {
    ActionOutcome::Failed(CoreError::ControlBusy(control.to_string()))
}
