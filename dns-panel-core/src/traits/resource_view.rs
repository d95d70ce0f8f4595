//! Resource list view abstract Trait

use async_trait::async_trait;

use super::{BusyIndicator, NoticeSink};
use crate::types::{Resource, ResourceSnapshot};

/// Display surface of a provider / domain / certificate list.
///
/// Same re-entrancy rule as [`RecordView`](super::RecordView).
#[async_trait]
pub trait ResourceView<R: Resource>: BusyIndicator + NoticeSink {
    /// Replace every rendered row and the pagination controls.
    fn render(&self, snapshot: &ResourceSnapshot<R>);

    /// Set the displayed value of one row's flag control.
    fn show_flag(&self, id: &str, value: bool);

    /// Tear the surface down.
    fn detach(&self);

    /// Ask the user to confirm a destructive action.
    async fn confirm(&self, prompt: &str) -> bool;
}
