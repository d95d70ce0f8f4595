//! 提示消息：显示后按作用域延迟自动消失

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::traits::NoticeSink;
use crate::types::{ControllerConfig, Notice, NoticeLevel, NoticeScope};

/// Issues notices and schedules their dismissal.
#[derive(Debug)]
pub struct NoticeBoard {
    next_id: AtomicU64,
    list_ttl: Duration,
    form_ttl: Duration,
}

impl NoticeBoard {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            list_ttl: config.list_notice_ttl,
            form_ttl: config.form_notice_ttl,
        }
    }

    /// Show a notice on `view` and dismiss it after the scope's delay.
    pub fn post<V>(
        &self,
        view: &Arc<V>,
        scope: NoticeScope,
        level: NoticeLevel,
        message: impl Into<String>,
    ) -> Notice
    where
        V: NoticeSink + ?Sized + 'static,
    {
        let notice = Notice {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            scope,
            level,
            message: message.into(),
            ttl: if scope.is_form() {
                self.form_ttl
            } else {
                self.list_ttl
            },
        };
        view.show_notice(&notice);
        schedule_dismiss(Arc::clone(view), &notice);
        notice
    }
}

fn schedule_dismiss<V>(view: Arc<V>, notice: &Notice)
where
    V: NoticeSink + ?Sized + 'static,
{
    let (scope, id, ttl) = (notice.scope, notice.id, notice.ttl);
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                view.dismiss_notice(scope, id);
            });
        }
        Err(_) => log::debug!("No async runtime, notice {id} will not auto-dismiss"),
    }
}
