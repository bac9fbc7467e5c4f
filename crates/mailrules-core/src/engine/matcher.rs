//! Rule matching.

use chrono::{DateTime, Utc};

use super::evaluator::evaluate;
use crate::error::EvaluationError;
use crate::message::Message;
use crate::rule::{Combinator, Rule};

/// Decide whether a rule fires for a message.
///
/// Conditions are evaluated in declared order. `All` stops at the first
/// condition that does not hold, `Any` at the first that does.
///
/// # Errors
///
/// Propagates the first `EvaluationError` met before the outcome is decided.
pub fn matches(
    rule: &Rule,
    message: &Message,
    now: DateTime<Utc>,
) -> Result<bool, EvaluationError> {
    match rule.combinator() {
        Combinator::All => {
            for condition in rule.conditions() {
                if !evaluate(condition, message, now)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Combinator::Any => {
            for condition in rule.conditions() {
                if evaluate(condition, message, now)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// Rules that fire for a message, in declared order.
///
/// # Errors
///
/// Propagates the first `EvaluationError`.
pub fn firing_rules<'r>(
    rules: &'r [Rule],
    message: &Message,
    now: DateTime<Utc>,
) -> Result<Vec<&'r Rule>, EvaluationError> {
    let mut fired = Vec::new();
    for rule in rules {
        if matches(rule, message, now)? {
            fired.push(rule);
        }
    }
    Ok(fired)
}
