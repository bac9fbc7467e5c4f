//! Mailbox collaborator: the engine's only side-effecting boundary.
//!
//! Implementations talk to a mail provider (IMAP, a REST API, ...) or, like
//! [`InMemoryMailbox`], keep state in process. Each call is an independent,
//! independently failable unit of work; retry policy belongs to the
//! implementation, never to the engine.

mod memory;

pub use memory::{InMemoryMailbox, MessageState, SubmittedAction};

use std::future::Future;

use thiserror::Error;

use crate::message::MessageId;

/// Errors a mailbox provider can report for a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailboxError {
    /// The provider does not know the message.
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    /// The destination mailbox does not exist.
    #[error("Mailbox not found: {0}")]
    MailboxNotFound(String),

    /// The provider refused the operation.
    #[error("Rejected by provider: {0}")]
    Rejected(String),

    /// The provider could not be reached.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Capability interface over a mail provider.
pub trait Mailbox: Send + Sync {
    /// Mark a message read.
    fn mark_read(&self, id: &MessageId) -> impl Future<Output = Result<(), MailboxError>> + Send;

    /// Mark a message unread.
    fn mark_unread(
        &self,
        id: &MessageId,
    ) -> impl Future<Output = Result<(), MailboxError>> + Send;

    /// Move a message to another mailbox.
    fn move_to(
        &self,
        id: &MessageId,
        mailbox: &str,
    ) -> impl Future<Output = Result<(), MailboxError>> + Send;

    /// Attach a label to a message.
    fn add_label(
        &self,
        id: &MessageId,
        label: &str,
    ) -> impl Future<Output = Result<(), MailboxError>> + Send;
}
