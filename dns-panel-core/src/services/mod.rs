//! 业务逻辑服务层
//!
//! - `RecordListController`: 单个域名的记录列表视图模型
//! - `ResourceListController`: 服务商 / 域名 / 证书列表
//!
//! 两者都建立在同一个分页列表核心之上。

mod notice_board;
mod optimistic_toggle;
mod paged_list;
mod record_list_controller;
mod resource_list_controller;
mod sequencing;

pub use notice_board::NoticeBoard;
pub use optimistic_toggle::OptimisticToggle;
pub use paged_list::target_page;
pub use record_list_controller::RecordListController;
pub use resource_list_controller::ResourceListController;
pub use sequencing::{BusyControls, BusyGuard, Debouncer, RequestSequence, Ticket};
