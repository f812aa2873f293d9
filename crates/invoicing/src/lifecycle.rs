//! Invoice lifecycle state machine.
//!
//! ```text
//!   (none) --create(draft)--> draft --post--> posted
//!   (none) --create(posted)-------------------^  |
//!   draft  <--------------unpost-----------------+
//!   draft  --update--> draft
//!   draft  --delete--> (none)
//! ```
//!
//! Pure: the controller consults [`transition`] before issuing a request and
//! only applies the resulting state once the server has accepted it.

use billbook_core::{DomainError, DomainResult};

use crate::types::InvoiceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    Create(InvoiceStatus),
    Update,
    Delete,
    Post,
    Unpost,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Create(_) => "create",
            LifecycleAction::Update => "update",
            LifecycleAction::Delete => "delete",
            LifecycleAction::Post => "post",
            LifecycleAction::Unpost => "unpost",
        }
    }

    /// Post, unpost and delete only run after the user confirms.
    pub fn requires_confirmation(&self) -> bool {
        matches!(
            self,
            LifecycleAction::Post | LifecycleAction::Unpost | LifecycleAction::Delete
        )
    }

    /// Confirmation prompt shown before the action.
    pub fn confirmation_prompt(&self) -> Option<&'static str> {
        match self {
            LifecycleAction::Post => {
                Some("Post this invoice? Ledger entries will be generated.")
            }
            LifecycleAction::Unpost => {
                Some("Unpost this invoice? Its ledger entries will be reversed.")
            }
            LifecycleAction::Delete => Some("Delete this draft invoice?"),
            _ => None,
        }
    }
}

impl core::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State after applying `action` to an invoice in `current` (`None` when it
/// does not exist). `Ok(None)` means the invoice is gone.
pub fn transition(
    current: Option<InvoiceStatus>,
    action: LifecycleAction,
) -> DomainResult<Option<InvoiceStatus>> {
    use InvoiceStatus::{Draft, Posted};
    use LifecycleAction::*;

    match (current, action) {
        (None, Create(status)) => Ok(Some(status)),
        (Some(Draft), Update) => Ok(Some(Draft)),
        (Some(Draft), Post) => Ok(Some(Posted)),
        (Some(Posted), Unpost) => Ok(Some(Draft)),
        (Some(Draft), Delete) => Ok(None),
        (None, _) => Err(DomainError::not_found()),
        (Some(status), other) => Err(DomainError::conflict(format!(
            "cannot {other} a {status} invoice"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvoiceStatus::{Draft, Posted};

    #[test]
    fn allowed_transitions() {
        assert_eq!(transition(None, LifecycleAction::Create(Draft)).unwrap(), Some(Draft));
        assert_eq!(transition(None, LifecycleAction::Create(Posted)).unwrap(), Some(Posted));
        assert_eq!(transition(Some(Draft), LifecycleAction::Update).unwrap(), Some(Draft));
        assert_eq!(transition(Some(Draft), LifecycleAction::Post).unwrap(), Some(Posted));
        assert_eq!(transition(Some(Posted), LifecycleAction::Unpost).unwrap(), Some(Draft));
        assert_eq!(transition(Some(Draft), LifecycleAction::Delete).unwrap(), None);
    }

    #[test]
    fn posted_invoices_are_frozen() {
        for action in [LifecycleAction::Update, LifecycleAction::Delete, LifecycleAction::Post] {
            let err = transition(Some(Posted), action).unwrap_err();
            assert!(matches!(err, DomainError::Conflict(_)), "{action}");
        }
        let err = transition(Some(Posted), LifecycleAction::Update).unwrap_err();
        assert_eq!(err.to_string(), "conflict: cannot update a posted invoice");
    }

    #[test]
    fn drafts_cannot_be_unposted_or_recreated() {
        assert!(transition(Some(Draft), LifecycleAction::Unpost).is_err());
        assert!(transition(Some(Draft), LifecycleAction::Create(Draft)).is_err());
        assert!(matches!(
            transition(None, LifecycleAction::Post),
            Err(DomainError::NotFound)
        ));
    }

    #[test]
    fn only_ledger_affecting_actions_need_confirmation() {
        assert!(LifecycleAction::Post.requires_confirmation());
        assert!(LifecycleAction::Unpost.requires_confirmation());
        assert!(LifecycleAction::Delete.requires_confirmation());
        assert!(!LifecycleAction::Update.requires_confirmation());
        assert!(!LifecycleAction::Create(Posted).requires_confirmation());
        assert!(LifecycleAction::Create(Draft).confirmation_prompt().is_none());
    }
}
