//! Run orchestration: rules in, per-message reports out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::engine::{self, MergePolicy};
use crate::error::{Error, EvaluationError, Result};
use crate::mailbox::Mailbox;
use crate::message::Message;
use crate::report::{MessageReport, RunReport};
use crate::rule::{Action, Rule};

/// Rules that fired for a message and the merged plan, before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation<'r> {
    /// Firing rules in declared order.
    pub fired: Vec<&'r Rule>,
    /// Planned actions.
    pub planned: Vec<Action>,
}

/// A validated, immutable rule set and the policy used to merge its actions.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
    policy: MergePolicy,
}

impl RuleEngine {
    /// Creates an engine with the default last-wins merge policy.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            policy: MergePolicy::default(),
        }
    }

    /// Replace the merge policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The rules, in declared order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The merge policy.
    #[must_use]
    pub const fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Match and plan without touching the mailbox.
    ///
    /// # Errors
    ///
    /// Returns an `EvaluationError` if a condition cannot be evaluated.
    pub fn evaluate(
        &self,
        message: &Message,
        now: DateTime<Utc>,
    ) -> std::result::Result<Evaluation<'_>, EvaluationError> {
        let fired = engine::firing_rules(&self.rules, message, now)?;
        let planned = engine::plan(&fired, self.policy);
        Ok(Evaluation { fired, planned })
    }

    /// Evaluate one message and apply its plan.
    ///
    /// # Errors
    ///
    /// Returns `Error::Evaluation` if a condition cannot be evaluated. Action
    /// failures are not errors; they are recorded in the report.
    pub async fn process<M: Mailbox>(
        &self,
        message: &Message,
        now: DateTime<Utc>,
        mailbox: &M,
    ) -> Result<MessageReport> {
        let Evaluation { fired, planned } = self.evaluate(message, now)?;

        if fired.is_empty() {
            debug!(message_id = %message.id, "No rule fired");
        }
        for rule in &fired {
            info!(message_id = %message.id, rule = rule.name(), "Rule fired");
        }

        let results = engine::apply(&planned, message, mailbox).await;

        Ok(MessageReport {
            message_id: message.id.clone(),
            fired_rules: fired.iter().map(|r| r.name().to_string()).collect(),
            planned,
            results,
        })
    }

    /// Process messages one after another, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first `Error::Evaluation`.
    pub async fn run<M: Mailbox>(
        &self,
        messages: &[Message],
        now: DateTime<Utc>,
        mailbox: &M,
    ) -> Result<RunReport> {
        let mut reports = Vec::with_capacity(messages.len());
        for message in messages {
            reports.push(self.process(message, now, mailbox).await?);
        }
        Ok(finish(now, reports))
    }

    /// Process messages concurrently, at most `max_in_flight` at a time.
    ///
    /// Each message's actions are still submitted in plan order, and one
    /// message's failures never cancel another's processing. Reports come
    /// back in input order.
    ///
    /// # Errors
    ///
    /// Returns the first `Error::Evaluation` (by input position) once every
    /// task has finished, or `Error::Task` if a task panicked.
    pub async fn run_concurrent<M>(
        self: &Arc<Self>,
        messages: Vec<Message>,
        now: DateTime<Utc>,
        mailbox: Arc<M>,
        max_in_flight: usize,
    ) -> Result<RunReport>
    where
        M: Mailbox + 'static,
    {
        let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
        let mut tasks = JoinSet::new();

        for (index, message) in messages.into_iter().enumerate() {
            let engine = Arc::clone(self);
            let mailbox = Arc::clone(&mailbox);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => engine.process(&message, now, mailbox.as_ref()).await,
                    Err(e) => Err(Error::Task(e.to_string())),
                };
                (index, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        let mut first_error: Option<(usize, Error)> = None;
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = match joined {
                Ok(pair) => pair,
                Err(e) => (usize::MAX, Err(Error::Task(e.to_string()))),
            };
            match outcome {
                Ok(report) => outcomes.push((index, report)),
                Err(e) => {
                    if first_error.as_ref().is_none_or(|(seen, _)| index < *seen) {
                        first_error = Some((index, e));
                    }
                }
            }
        }
        if let Some((_, e)) = first_error {
            return Err(e);
        }

        outcomes.sort_by_key(|(index, _)| *index);
        Ok(finish(now, outcomes.into_iter().map(|(_, r)| r).collect()))
    }
}

fn finish(now: DateTime<Utc>, reports: Vec<MessageReport>) -> RunReport {
    let report = RunReport::new(now, reports);
    let summary = &report.summary;
    info!(
        evaluated = summary.messages_evaluated,
        matched = summary.messages_matched,
        attempted = summary.actions_attempted,
        succeeded = summary.actions_succeeded,
        failed = summary.actions_failed,
        "Run complete"
    );
    report
}
