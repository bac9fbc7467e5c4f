//! Run reports.
//!
//! A report records, per message, which rules fired, what was planned and how
//! each action fared, so rule design can be audited without asking the
//! provider what happened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::ActionResult;
use crate::message::MessageId;
use crate::rule::Action;

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReport {
    /// The message.
    pub message_id: MessageId,
    /// Names of the rules that fired, in declared order.
    pub fired_rules: Vec<String>,
    /// Actions after merging.
    pub planned: Vec<Action>,
    /// Outcome of each planned action, in plan order.
    pub results: Vec<ActionResult>,
}

impl MessageReport {
    /// Check if any rule fired.
    #[must_use]
    pub fn matched(&self) -> bool {
        !self.fired_rules.is_empty()
    }

    /// Results of the actions that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ActionResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Counters over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Messages evaluated.
    pub messages_evaluated: usize,
    /// Messages at least one rule fired for.
    pub messages_matched: usize,
    /// Actions submitted to the mailbox.
    pub actions_attempted: usize,
    /// Actions the mailbox applied.
    pub actions_succeeded: usize,
    /// Actions the mailbox failed.
    pub actions_failed: usize,
}

impl RunSummary {
    /// Tally a set of message reports.
    #[must_use]
    pub fn from_reports(reports: &[MessageReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.messages_evaluated += 1;
            if report.matched() {
                summary.messages_matched += 1;
            }
            summary.actions_attempted += report.results.len();
            let failed = report.failures().count();
            summary.actions_failed += failed;
            summary.actions_succeeded += report.results.len() - failed;
            summary
        })
    }
}

/// Report of one processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// The `now` every condition was evaluated against.
    pub evaluated_at: DateTime<Utc>,
    /// Per-message reports, in message-source order.
    pub messages: Vec<MessageReport>,
    /// Totals.
    pub summary: RunSummary,
}

impl RunReport {
    /// Build a report and its summary.
    #[must_use]
    pub fn new(evaluated_at: DateTime<Utc>, messages: Vec<MessageReport>) -> Self {
        let summary = RunSummary::from_reports(&messages);
        Self {
            evaluated_at,
            messages,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ActionStatus;

    fn report(id: &str, fired: &[&str], statuses: &[ActionStatus]) -> MessageReport {
        MessageReport {
            message_id: MessageId::new(id),
            fired_rules: fired.iter().map(ToString::to_string).collect(),
            planned: statuses.iter().map(|_| Action::MarkRead).collect(),
            results: statuses
                .iter()
                .map(|&status| ActionResult {
                    action: Action::MarkRead,
                    status,
                    cause: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_summary() {
        let reports = vec![
            report("a", &["r1"], &[ActionStatus::Success, ActionStatus::Failed]),
            report("b", &[], &[]),
            report("c", &["r1", "r2"], &[ActionStatus::Success]),
        ];
        let run = RunReport::new(DateTime::<Utc>::UNIX_EPOCH, reports);

        assert_eq!(
            run.summary,
            RunSummary {
                messages_evaluated: 3,
                messages_matched: 2,
                actions_attempted: 3,
                actions_succeeded: 2,
                actions_failed: 1,
            }
        );
        assert_eq!(run.messages[0].failures().count(), 1);
    }
}
