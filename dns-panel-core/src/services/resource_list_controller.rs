//! 资源列表控制器（服务商 / 域名 / 证书）
//!
//! 分页、搜索防抖、请求排序和控件互斥规则与记录列表相同，由 [`PagedList`]
//! 提供；这里额外提供删除和布尔开关的乐观切换。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dns_panel_client::{ApiError, ListQuery, Page, Resource, ResourceApi};

use super::optimistic_toggle::OptimisticToggle;
use super::paged_list::{busy, no_active_view, ListBackend, ListSession, PagedList};
use crate::error::{CoreError, CoreResult};
use crate::traits::ResourceView;
use crate::types::{
    ActionControl, ActionOutcome, ControllerConfig, NoticeLevel, NoticeScope, PageNav,
    ResourceSnapshot,
};

/// 每行开关的本地状态，按资源 id 索引
type Toggles = HashMap<String, OptimisticToggle>;

/// Track the flags of the rendered rows. Rows that left the page are dropped
/// unless a change of theirs is still in flight.
fn sync_toggles<R: Resource>(toggles: &mut Toggles, items: &[R]) {
    toggles.retain(|id, toggle| {
        toggle.is_in_flight() || items.iter().any(|item| item.id() == id.as_str())
    });
    for item in items {
        toggles
            .entry(item.id().to_string())
            .and_modify(|t| t.sync(item.flag()))
            .or_insert_with(|| OptimisticToggle::new(item.flag()));
    }
}

struct ResourceSource<R: Resource> {
    api: Arc<dyn ResourceApi<R>>,
    view: Arc<dyn ResourceView<R>>,
}

#[async_trait]
impl<R: Resource> ListBackend for ResourceSource<R> {
    type Item = R;
    /// Parent id the list is scoped to.
    type Scope = Option<String>;
    type Extra = Toggles;
    type View = dyn ResourceView<R>;

    fn subject(&self) -> String {
        format!("{} list", R::KIND)
    }

    fn view(&self) -> &Arc<dyn ResourceView<R>> {
        &self.view
    }

    async fn fetch_page(
        &self,
        parent_id: &Option<String>,
        query: &ListQuery,
    ) -> Result<Page<R>, ApiError> {
        self.api.list(parent_id.as_deref(), query).await
    }

    fn show(&self, session: &mut ListSession<Self>) {
        let Some(page) = &session.snapshot else {
            return;
        };
        sync_toggles(&mut session.extra, &page.items);
        self.view.render(&ResourceSnapshot::from_page(page, &session.search));
        for (id, toggle) in &session.extra {
            if toggle.is_in_flight() {
                self.view.show_flag(id, toggle.displayed());
            }
        }
    }
}

/// Paged, searchable list of one resource kind.
pub struct ResourceListController<R: Resource> {
    list: PagedList<ResourceSource<R>>,
}

impl<R: Resource> ResourceListController<R> {
    #[must_use]
    pub fn new(api: Arc<dyn ResourceApi<R>>, view: Arc<dyn ResourceView<R>>) -> Self {
        Self::build(api, view, ControllerConfig::default())
    }

    pub fn with_config(
        api: Arc<dyn ResourceApi<R>>,
        view: Arc<dyn ResourceView<R>>,
        config: ControllerConfig,
    ) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self::build(api, view, config))
    }

    fn build(
        api: Arc<dyn ResourceApi<R>>,
        view: Arc<dyn ResourceView<R>>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            list: PagedList::new(ResourceSource { api, view }, config),
        }
    }

    pub fn is_open(&self) -> bool {
        self.list.is_open()
    }

    pub fn snapshot(&self) -> Option<ResourceSnapshot<R>> {
        self.list
            .with_session(|s| {
                s.snapshot
                    .as_ref()
                    .map(|page| ResourceSnapshot::from_page(page, &s.search))
            })
            .flatten()
    }

    /// Flag value currently shown for `id`.
    pub fn displayed_flag(&self, id: &str) -> Option<bool> {
        self.list
            .with_session(|s| s.extra.get(id).map(OptimisticToggle::displayed))
            .flatten()
    }

    pub fn is_busy(&self, control: &ActionControl) -> bool {
        self.list.is_busy(control)
    }

    /// Open the list, optionally scoped to a parent (e.g. domains of one
    /// provider).
    pub async fn open(&self, parent_id: Option<&str>) -> ActionOutcome {
        self.list.open(parent_id.map(str::to_string), Toggles::new());
        log::info!("Opened {} list", R::KIND);
        self.list.load_page(1, "").await
    }

    pub async fn load_page(&self, page: u32, search: &str) -> ActionOutcome {
        self.list.load_page(page, search).await
    }

    pub async fn search(&self, term: &str) -> ActionOutcome {
        self.list.search(term).await
    }

    pub async fn clear_search(&self) -> ActionOutcome {
        self.list.clear_search().await
    }

    pub async fn navigate(&self, nav: PageNav) -> ActionOutcome {
        self.list.navigate(nav).await
    }

    pub async fn refresh(&self) -> ActionOutcome {
        self.list.refresh().await
    }

    pub fn close(&self) -> ActionOutcome {
        if self.list.close().is_none() {
            return ActionOutcome::Cancelled;
        }
        self.view().detach();
        log::info!("Closed {} list", R::KIND);
        ActionOutcome::Applied
    }

    /// Delete after confirmation and reload the current page.
    pub async fn delete(&self, id: &str) -> ActionOutcome {
        let action = format!("Delete {}", R::KIND);
        let Some(generation) = self.list.with_session(|s| s.generation) else {
            return no_active_view(&action);
        };
        let control = ActionControl::Delete(id.to_string());
        let Some(_guard) = self.list.acquire(control.clone()) else {
            return busy(&control);
        };
        if !self.view().confirm(&format!("Delete {} {id}?", R::KIND)).await {
            return ActionOutcome::Cancelled;
        }
        if !self.list.is_current(generation) {
            return ActionOutcome::Stale;
        }

        if let Err(e) = self.api().delete(id).await {
            return self.list.fail_in_list(generation, &action, e.into());
        }
        if self
            .list
            .with_current(generation, |s| s.extra.remove(id))
            .is_none()
        {
            return ActionOutcome::Stale;
        }
        log::info!("Deleted {} {id}", R::KIND);
        self.list.post(
            NoticeScope::List,
            NoticeLevel::Success,
            format!("{} {id} deleted", R::KIND),
        );
        self.list.reload_after_change().await
    }

    /// Show `desired` immediately, then persist it; a failure restores the
    /// value shown before the click.
    pub async fn toggle(&self, id: &str, desired: bool) -> ActionOutcome {
        let Some(generation) = self.list.with_session(|s| s.generation) else {
            return no_active_view("Toggle");
        };
        let control = ActionControl::Toggle(id.to_string());
        let Some(_guard) = self.list.acquire(control.clone()) else {
            return busy(&control);
        };

        let begun = self.list.with_current(generation, |s| {
            let toggle = s.extra.get_mut(id)?;
            let rollback_to = toggle.begin(desired)?;
            self.view().show_flag(id, desired);
            Some(rollback_to)
        });
        match begun {
            None => return ActionOutcome::Stale,
            Some(None) => {
                let err = CoreError::ResourceNotFound {
                    kind: R::KIND,
                    id: id.to_string(),
                };
                return self.list.fail_in_list(generation, "Toggle", err);
            }
            Some(Some(_)) => {}
        }

        match self.api().set_flag(id, desired).await {
            Ok(updated) => {
                let value = updated.flag();
                let applied = self.list.with_current(generation, |s| {
                    if let Some(toggle) = s.extra.get_mut(id) {
                        toggle.commit(value);
                    }
                    self.view().show_flag(id, value);
                });
                if applied.is_none() {
                    return ActionOutcome::Stale;
                }
                self.list.post(
                    NoticeScope::List,
                    NoticeLevel::Success,
                    format!("{} {id} {}", R::KIND, if value { "on" } else { "off" }),
                );
                self.list.reload_after_change().await
            }
            Err(e) => {
                let rolled_back = self.list.with_current(generation, |s| {
                    if let Some(previous) = s.extra.get_mut(id).map(OptimisticToggle::rollback) {
                        self.view().show_flag(id, previous);
                    }
                });
                if rolled_back.is_none() {
                    return ActionOutcome::Stale;
                }
                self.list.fail_in_list(generation, "Toggle", e.into())
            }
        }
    }

    fn api(&self) -> &dyn ResourceApi<R> {
        &*self.list.backend().api
    }

    fn view(&self) -> &Arc<dyn ResourceView<R>> {
        &self.list.backend().view
    }
}
