//! Condition evaluation.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::EvaluationError;
use crate::message::{Message, extract_address};
use crate::rule::{Condition, Field, Predicate, normalize_text};

/// Length of one month in date predicates.
pub const DAYS_PER_MONTH: u64 = 30;

/// Evaluate one condition against one message.
///
/// String predicates compare case-insensitively after trimming. Address
/// fields compare bare addresses: positive predicates hold when any address
/// matches, negated ones when none does. Date predicates compare the age
/// `now - received_at` against `n` days or `n * 30` days.
///
/// # Errors
///
/// Returns `EvaluationError::TypeMismatch` when a date predicate targets a
/// text field or a string predicate targets the received date, and
/// `EvaluationError::InvalidThreshold` when a date value is not numeric.
pub fn evaluate(
    condition: &Condition,
    message: &Message,
    now: DateTime<Utc>,
) -> Result<bool, EvaluationError> {
    let field = condition.field();
    let predicate = condition.predicate();

    if field.is_temporal() != predicate.is_temporal() {
        return Err(EvaluationError::TypeMismatch { field, predicate });
    }

    if predicate.is_temporal() {
        return evaluate_age(condition, message.received_at, now);
    }

    let value = condition.value();
    let positive = if field.is_address_list() {
        test_addresses(predicate, recipients(message, field), value)
    } else {
        match field {
            Field::From => test_text(predicate, extract_address(&message.from), value),
            Field::Subject => test_text(predicate, &message.subject, value),
            Field::Body => test_text(predicate, &message.body, value),
            _ => return Err(EvaluationError::TypeMismatch { field, predicate }),
        }
    };

    Ok(if predicate.is_negated() {
        !positive
    } else {
        positive
    })
}

/// The positive form of a string predicate on one value.
fn test_text(predicate: Predicate, haystack: &str, needle: &str) -> bool {
    let haystack = normalize_text(haystack);
    match predicate {
        Predicate::Contains | Predicate::NotContains => haystack.contains(needle),
        _ => haystack == needle,
    }
}

fn recipients(message: &Message, field: Field) -> &[String] {
    match field {
        Field::Cc => &message.cc,
        Field::Bcc => &message.bcc,
        _ => &message.to,
    }
}

/// The positive form of a string predicate on an address list: true when
/// any address matches.
fn test_addresses(predicate: Predicate, addresses: &[String], needle: &str) -> bool {
    addresses
        .iter()
        .any(|item| test_text(predicate, extract_address(item), needle))
}

fn evaluate_age(
    condition: &Condition,
    received_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<bool, EvaluationError> {
    let n = condition
        .threshold()
        .ok_or_else(|| EvaluationError::InvalidThreshold(condition.value().to_string()))?;
    let predicate = condition.predicate();

    let (younger, days) = match predicate {
        Predicate::LessThanDays => (true, Some(n)),
        Predicate::GreaterThanDays => (false, Some(n)),
        Predicate::LessThanMonths => (true, n.checked_mul(DAYS_PER_MONTH)),
        Predicate::GreaterThanMonths => (false, n.checked_mul(DAYS_PER_MONTH)),
        _ => {
            return Err(EvaluationError::TypeMismatch {
                field: Field::ReceivedAt,
                predicate,
            });
        }
    };

    let age = now - received_at;
    // Thresholds beyond chrono's range are older than any representable age.
    let threshold = days
        .and_then(|days| i64::try_from(days).ok())
        .and_then(TimeDelta::try_days);
    Ok(match threshold {
        Some(threshold) if younger => age < threshold,
        Some(threshold) => age > threshold,
        None => younger,
    })
}
