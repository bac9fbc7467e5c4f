//! Rule store: loads and validates rule definitions.
//!
//! A rule source is a JSON array of rule records:
//!
//! ```json
//! [
//!   {
//!     "description": "Newsletters",
//!     "conditions_predicate": "all",
//!     "conditions": [
//!       { "field": "From", "predicate": "contains", "value": "daily-reads.com" }
//!     ],
//!     "actions": [
//!       { "type": "mark_as_read" },
//!       { "type": "move_message", "mailbox": "Newsletters" }
//!     ]
//!   }
//! ]
//! ```
//!
//! Loading is all-or-nothing: one invalid rule fails the whole load, so a
//! typo can never silently disable one rule while the others keep running.

mod definition;

pub use definition::{ActionDefinition, ConditionDefinition, RuleDefinition};

use std::path::Path;

use tracing::{debug, info};

use crate::Result;
use crate::rule::{Rule, ValidationError, ValidationErrorKind};

/// Load and validate rules from a JSON rule source.
///
/// # Errors
///
/// Returns `Error::Serde` if the source is not a JSON array, or
/// `Error::Validation` naming the first invalid rule.
pub fn load(source: &str) -> Result<Vec<Rule>> {
    let records: Vec<serde_json::Value> = serde_json::from_str(source)?;

    let definitions = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value::<RuleDefinition>(record).map_err(|e| {
                ValidationError::new(index, "", ValidationErrorKind::Malformed(e.to_string()))
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(load_definitions(definitions)?)
}

/// Validate already-deserialized rule definitions.
///
/// # Errors
///
/// Returns the `ValidationError` of the first invalid rule.
pub fn load_definitions(
    definitions: Vec<RuleDefinition>,
) -> std::result::Result<Vec<Rule>, ValidationError> {
    let rules = definitions
        .into_iter()
        .enumerate()
        .map(|(index, definition)| definition.into_rule(index))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for rule in &rules {
        debug!(
            rule = rule.name(),
            combinator = rule.combinator().as_str(),
            conditions = rule.conditions().len(),
            actions = rule.actions().len(),
            "Validated rule"
        );
    }
    info!("Loaded {} rules", rules.len());
    Ok(rules)
}

/// Load and validate rules from a JSON file.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read, otherwise as [`load`].
pub async fn load_path(path: impl AsRef<Path>) -> Result<Vec<Rule>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await?;
    debug!("Read rule source {:?}", path);
    load(&contents)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::rule::{Action, Combinator, Field, Predicate};

    const RULES: &str = r#"[
        {
            "description": "Newsletters",
            "conditions_predicate": "all",
            "conditions": [
                { "field": "From", "predicate": "contains", "value": "Daily-Reads.com" }
            ],
            "actions": [
                { "type": "mark_as_read" },
                { "type": "move_message", "mailbox": "Newsletters" }
            ]
        },
        {
            "description": "Boss",
            "conditions_predicate": "ANY",
            "conditions": [
                { "field": "from_address", "predicate": "equals", "value": "boss@example.com" },
                { "field": "from", "predicate": "equals", "value": "pm@example.com" }
            ],
            "actions": [
                { "type": "add_label", "label_name": "IMPORTANT" },
                { "type": "mark_as_unread" }
            ]
        },
        {
            "conditions": [
                { "field": "Date Received", "predicate": "greater_than_months", "value": 6 }
            ],
            "actions": [{ "type": "move", "mailbox": "Archive" }]
        }
    ]"#;

    #[test]
    fn test_load_rules() {
        let rules = load(RULES).unwrap();
        assert_eq!(rules.len(), 3);

        let newsletters = &rules[0];
        assert_eq!(newsletters.name(), "Newsletters");
        assert_eq!(newsletters.combinator(), Combinator::All);
        assert_eq!(newsletters.conditions()[0].field(), Field::From);
        assert_eq!(newsletters.conditions()[0].value(), "daily-reads.com");
        assert_eq!(
            newsletters.actions(),
            &[Action::MarkRead, Action::move_to("Newsletters")]
        );

        let boss = &rules[1];
        assert_eq!(boss.combinator(), Combinator::Any);
        assert_eq!(boss.actions()[0], Action::add_label("IMPORTANT"));

        let archive = &rules[2];
        assert_eq!(archive.name(), "rule #3");
        assert_eq!(archive.combinator(), Combinator::All);
        assert_eq!(archive.conditions()[0].predicate(), Predicate::GreaterThanMonths);
        assert_eq!(archive.conditions()[0].value(), "6");
    }

    #[test]
    fn test_one_bad_rule_fails_whole_load() {
        let source = r#"[
            { "conditions": [{ "field": "subject", "predicate": "contains", "value": "a" }],
              "actions": [{ "type": "mark_as_read" }] },
            { "conditions": [{ "field": "subjekt", "predicate": "contains", "value": "a" }],
              "actions": [{ "type": "mark_as_read" }] }
        ]"#;

        match load(source) {
            Err(Error::Validation(err)) => {
                assert_eq!(err.rule_index, 1);
                assert_eq!(err.field, "conditions[0].field");
                assert_eq!(err.kind, ValidationErrorKind::UnknownField("subjekt".into()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_record_names_index() {
        let source = r#"[
            { "conditions": [{ "field": "subject", "predicate": "contains", "value": "a" }],
              "actions": [{ "type": "mark_as_read" }] },
            "not a rule"
        ]"#;

        match load(source) {
            Err(Error::Validation(err)) => {
                assert_eq!(err.rule_index, 1);
                assert!(matches!(err.kind, ValidationErrorKind::Malformed(_)));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_source_must_be_array() {
        assert!(matches!(load("{}"), Err(Error::Serde(_))));
    }

    #[test]
    fn test_large_date_threshold() {
        let rules = load(
            r#"[{
                "conditions": [
                    { "field": "date_received", "predicate": "greater_than_days", "value": 5000000000 }
                ],
                "actions": [{ "type": "mark_as_read" }]
            }]"#,
        )
        .unwrap();
        assert_eq!(rules[0].conditions()[0].threshold(), Some(5_000_000_000));
    }

    #[test]
    fn test_empty_source_is_empty_rule_set() {
        assert!(load("[]").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_path_missing_file() {
        let result = load_path("/nonexistent/mailrules/rules.json").await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
