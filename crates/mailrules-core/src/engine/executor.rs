//! Action execution against the mailbox collaborator.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::mailbox::{Mailbox, MailboxError};
use crate::message::Message;
use crate::rule::Action;

/// Outcome of one submitted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// The provider applied the action.
    Success,
    /// The provider rejected or failed the action.
    Failed,
}

/// Per-action execution record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// The action that was submitted.
    pub action: Action,
    /// Whether it was applied.
    pub status: ActionStatus,
    /// Provider error message for failed actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ActionResult {
    fn success(action: Action) -> Self {
        Self {
            action,
            status: ActionStatus::Success,
            cause: None,
        }
    }

    fn failed(action: Action, error: &MailboxError) -> Self {
        Self {
            action,
            status: ActionStatus::Failed,
            cause: Some(error.to_string()),
        }
    }

    /// Check if the action was applied.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, ActionStatus::Success)
    }
}

/// Apply planned actions to a message, one collaborator call each.
///
/// Calls are made in plan order and each is made exactly once. A failed call
/// is recorded and the remaining actions still run.
pub async fn apply<M: Mailbox>(
    planned: &[Action],
    message: &Message,
    mailbox: &M,
) -> Vec<ActionResult> {
    let id = &message.id;
    let mut results = Vec::with_capacity(planned.len());

    for action in planned {
        let outcome = match action {
            Action::MarkRead => mailbox.mark_read(id).await,
            Action::MarkUnread => mailbox.mark_unread(id).await,
            Action::Move { mailbox: target } => mailbox.move_to(id, target).await,
            Action::AddLabel { label } => mailbox.add_label(id, label).await,
        };

        match outcome {
            Ok(()) => {
                debug!(message_id = %id, %action, "Action applied");
                results.push(ActionResult::success(action.clone()));
            }
            Err(e) => {
                warn!(message_id = %id, %action, error = %e, "Action failed");
                results.push(ActionResult::failed(action.clone(), &e));
            }
        }
    }

    results
}
