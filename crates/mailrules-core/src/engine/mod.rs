//! The rule evaluation pipeline.
//!
//! Each stage is a plain function so it can be tested on its own:
//!
//! 1. [`evaluate`] tests one condition against one message,
//! 2. [`matches`] combines a rule's conditions,
//! 3. [`plan`] merges the actions of the rules that fired,
//! 4. [`apply`] submits the planned actions to a [`Mailbox`](crate::Mailbox).
//!
//! Only the last stage suspends; everything before it is pure given `now`.

mod evaluator;
mod executor;
mod matcher;
mod planner;

pub use evaluator::{DAYS_PER_MONTH, evaluate};
pub use executor::{ActionResult, ActionStatus, apply};
pub use matcher::{firing_rules, matches};
pub use planner::{MergePolicy, Resolution, merge, plan};
