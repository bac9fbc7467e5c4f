//! In-process mailbox.
//!
//! Used for dry runs and as the stub collaborator in tests. It tracks each
//! message's read flag, mailbox and labels, records every submitted call in
//! order, and can be told to reject chosen action kinds.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::debug;

use super::{Mailbox, MailboxError};
use crate::message::{Message, MessageId};
use crate::rule::{Action, ActionKind};

/// Mailbox a message sits in before anything moves it.
pub const DEFAULT_MAILBOX: &str = "INBOX";

/// Current state of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageState {
    /// Whether the message is read.
    pub is_read: bool,
    /// Mailbox the message is in.
    pub mailbox: String,
    /// Attached labels.
    pub labels: BTreeSet<String>,
}

impl MessageState {
    fn from_message(message: &Message) -> Self {
        Self {
            is_read: message.is_read,
            mailbox: DEFAULT_MAILBOX.to_string(),
            labels: message.labels.clone(),
        }
    }
}

/// A call the mailbox received, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedAction {
    /// Target message.
    pub message_id: MessageId,
    /// Requested action.
    pub action: Action,
}

#[derive(Debug, Default)]
struct State {
    messages: HashMap<MessageId, MessageState>,
    submitted: Vec<SubmittedAction>,
    failing: HashSet<ActionKind>,
}

/// Mailbox that keeps message state in memory.
#[derive(Debug, Default)]
pub struct InMemoryMailbox {
    state: Mutex<State>,
}

impl InMemoryMailbox {
    /// Creates an empty mailbox that knows no messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mailbox seeded with the given messages.
    #[must_use]
    pub fn with_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Self {
        let mailbox = Self::new();
        {
            let mut state = mailbox.lock();
            for message in messages {
                state
                    .messages
                    .insert(message.id.clone(), MessageState::from_message(message));
            }
        }
        mailbox
    }

    /// Reject every future call of the given kind.
    #[must_use]
    pub fn failing_on(self, kind: ActionKind) -> Self {
        self.lock().failing.insert(kind);
        self
    }

    /// Current state of a message, if known.
    #[must_use]
    pub fn state(&self, id: &MessageId) -> Option<MessageState> {
        self.lock().messages.get(id).cloned()
    }

    /// Every call received so far, in arrival order.
    #[must_use]
    pub fn submitted(&self) -> Vec<SubmittedAction> {
        self.lock().submitted.clone()
    }

    /// Calls received for one message, in arrival order.
    #[must_use]
    pub fn submitted_for(&self, id: &MessageId) -> Vec<Action> {
        self.lock()
            .submitted
            .iter()
            .filter(|s| &s.message_id == id)
            .map(|s| s.action.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit(&self, id: &MessageId, action: Action) -> Result<(), MailboxError> {
        let mut state = self.lock();
        state.submitted.push(SubmittedAction {
            message_id: id.clone(),
            action: action.clone(),
        });

        if state.failing.contains(&action.kind()) {
            return Err(MailboxError::Rejected(format!(
                "{} is disabled for this mailbox",
                action.kind().as_str()
            )));
        }

        let entry = state
            .messages
            .get_mut(id)
            .ok_or_else(|| MailboxError::MessageNotFound(id.clone()))?;

        match &action {
            Action::MarkRead => entry.is_read = true,
            Action::MarkUnread => entry.is_read = false,
            Action::Move { mailbox } => entry.mailbox.clone_from(mailbox),
            Action::AddLabel { label } => {
                entry.labels.insert(label.clone());
            }
        }
        debug!(message_id = %id, %action, "Applied action in memory");
        Ok(())
    }
}

impl Mailbox for InMemoryMailbox {
    async fn mark_read(&self, id: &MessageId) -> Result<(), MailboxError> {
        self.submit(id, Action::MarkRead)
    }

    async fn mark_unread(&self, id: &MessageId) -> Result<(), MailboxError> {
        self.submit(id, Action::MarkUnread)
    }

    async fn move_to(&self, id: &MessageId, mailbox: &str) -> Result<(), MailboxError> {
        self.submit(id, Action::move_to(mailbox))
    }

    async fn add_label(&self, id: &MessageId, label: &str) -> Result<(), MailboxError> {
        self.submit(id, Action::add_label(label))
    }
}
