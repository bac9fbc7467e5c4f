//! # mailrules-core
//!
//! Rule evaluation engine for stored mail.
//!
//! This crate provides:
//! - Rule loading and validation (`store`)
//! - Condition evaluation, rule matching and action planning (`engine`)
//! - Action execution through a pluggable [`Mailbox`] collaborator
//! - Run orchestration and reporting ([`RuleEngine`], [`RunReport`])
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mailrules_core::{InMemoryMailbox, JsonFileSource, MessageSource, RuleEngine, store};
//!
//! # async fn run() -> mailrules_core::Result<()> {
//! let rules = store::load_path("rules.json").await?;
//! let messages = JsonFileSource::new("messages.json").messages().await?;
//! let mailbox = Arc::new(InMemoryMailbox::with_messages(&messages));
//!
//! let engine = Arc::new(RuleEngine::new(rules));
//! let report = engine
//!     .run_concurrent(messages, chrono::Utc::now(), mailbox, 8)
//!     .await?;
//! println!("{} actions failed", report.summary.actions_failed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod engine;
mod error;
pub mod mailbox;
pub mod message;
pub mod processor;
pub mod report;
pub mod rule;
pub mod source;
pub mod store;
pub mod time;

pub use engine::{ActionResult, ActionStatus, MergePolicy, Resolution};
pub use error::{Error, EvaluationError, Result};
pub use mailbox::{InMemoryMailbox, Mailbox, MailboxError};
pub use message::{Message, MessageId};
pub use processor::{Evaluation, RuleEngine};
pub use report::{MessageReport, RunReport, RunSummary};
pub use rule::{
    Action, ActionKind, Combinator, Condition, Field, Predicate, Rule, ValidationError,
    ValidationErrorKind,
};
pub use source::{JsonFileSource, MessageSource};
pub use time::{Clock, MockClock, SystemClock};
