//! 视图层抽象 Trait 定义
//!
//! 控制器只通过这些 Trait 驱动展示层，由平台层注入实现。

mod record_view;
mod resource_view;

pub use record_view::RecordView;
pub use resource_view::ResourceView;

use crate::types::{ActionControl, Notice, NoticeScope};

/// Busy indicator for action controls.
pub trait BusyIndicator: Send + Sync {
    /// Disable `control` and show a busy indicator (or restore it).
    fn set_busy(&self, control: &ActionControl, busy: bool);
}

/// Surface that displays transient notices.
pub trait NoticeSink: Send + Sync {
    /// Show a notice.
    fn show_notice(&self, notice: &Notice);

    /// Remove a notice once its delay has elapsed. Unknown ids are ignored.
    fn dismiss_notice(&self, scope: NoticeScope, id: u64);
}
