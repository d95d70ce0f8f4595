//! Record view abstract Trait

use async_trait::async_trait;

use super::{BusyIndicator, NoticeSink};
use crate::types::{DomainRef, FormKind, RecordForm, RecordSnapshot};

/// Display surface of one domain's record list.
///
/// Platform implementation:
/// - CLI: `TerminalView`
///
/// Callbacks are invoked while the controller's session lock is held and must
/// not call back into the controller.
#[async_trait]
pub trait RecordView: BusyIndicator + NoticeSink {
    /// Open (or reuse) the surface for `domain`.
    fn attach(&self, domain: &DomainRef);

    /// Replace every rendered row and the pagination controls.
    fn render(&self, snapshot: &RecordSnapshot);

    /// Show an empty add form.
    fn open_add_form(&self);

    /// Show the edit form pre-populated from `form`.
    fn open_edit_form(&self, form: &RecordForm);

    /// Close a form.
    fn close_form(&self, kind: FormKind);

    /// Tear the surface down.
    fn detach(&self);

    /// Ask the user to confirm a destructive action.
    ///
    /// # Arguments
    /// * `prompt` - question shown to the user
    async fn confirm(&self, prompt: &str) -> bool;
}
