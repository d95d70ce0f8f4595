use std::fmt;

use crate::error::CoreError;

/// An affordance that triggers a request.
///
/// Each control has at most one request in flight; unrelated controls stay
/// usable meanwhile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionControl {
    /// First / previous / next / last buttons
    Pagination,
    Refresh,
    SubmitAdd,
    SubmitEdit,
    /// Delete button of one row
    Delete(String),
    /// Flag checkbox of one row
    Toggle(String),
}

impl fmt::Display for ActionControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pagination => f.write_str("pagination"),
            Self::Refresh => f.write_str("refresh"),
            Self::SubmitAdd => f.write_str("submit-add"),
            Self::SubmitEdit => f.write_str("submit-edit"),
            Self::Delete(id) => write!(f, "delete:{id}"),
            Self::Toggle(id) => write!(f, "toggle:{id}"),
        }
    }
}

/// Result of one controller operation.
///
/// Operations never return an error past their boundary: a `Failed` outcome
/// has already been shown to the user as a notice.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// The operation's result reached the view.
    Applied,
    /// Superseded by a newer request, or the view was closed meanwhile.
    Stale,
    /// Declined by the user, or nothing to do.
    Cancelled,
    /// The operation failed.
    Failed(CoreError),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}
