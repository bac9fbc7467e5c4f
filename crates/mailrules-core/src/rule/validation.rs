//! Rule validation.

use super::model::{Action, Combinator, Condition, Rule};

/// What is wrong with a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The rule record is not an object of the expected shape.
    Malformed(String),
    /// The rule has no conditions.
    EmptyConditions,
    /// The rule has no actions.
    EmptyActions,
    /// A condition names a field no alias resolves.
    UnknownField(String),
    /// A condition names a predicate no alias resolves.
    UnknownPredicate(String),
    /// The rule names a combinator other than `all`/`any`.
    UnknownCombinator(String),
    /// An action names a type no alias resolves.
    UnknownActionType(String),
    /// A condition value is missing or neither a string nor an integer.
    MissingValue,
    /// A string predicate on the date field, or a date predicate on a text field.
    PredicateNotApplicable,
    /// A date predicate whose value is not a non-negative integer.
    NonNumericDateValue(String),
    /// A move action without a destination mailbox.
    EmptyMailbox,
    /// An add-label action without a label name.
    EmptyLabel,
}

impl ValidationErrorKind {
    /// Get human-readable error message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Malformed(reason) => format!("malformed rule: {reason}"),
            Self::EmptyConditions => "rule must have at least one condition".to_string(),
            Self::EmptyActions => "rule must have at least one action".to_string(),
            Self::UnknownField(name) => format!("unknown field '{name}'"),
            Self::UnknownPredicate(name) => format!("unknown predicate '{name}'"),
            Self::UnknownCombinator(name) => {
                format!("unknown combinator '{name}' (expected 'all' or 'any')")
            }
            Self::UnknownActionType(name) => format!("unknown action type '{name}'"),
            Self::MissingValue => "condition value must be a string or an integer".to_string(),
            Self::PredicateNotApplicable => {
                "date predicates apply only to the received date, string predicates only to text fields"
                    .to_string()
            }
            Self::NonNumericDateValue(value) => {
                format!("date value '{value}' is not a non-negative integer")
            }
            Self::EmptyMailbox => "move action requires a mailbox".to_string(),
            Self::EmptyLabel => "add_label action requires a label".to_string(),
        }
    }
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Validation error naming the offending rule and field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rule {rule_index}, field '{field}': {kind}")]
pub struct ValidationError {
    /// Zero-based position of the rule in its source.
    pub rule_index: usize,
    /// Path of the offending field within the rule, e.g. `conditions[1].predicate`.
    pub field: String,
    /// What is wrong.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Creates an error for the rule at `rule_index`.
    #[must_use]
    pub fn new(rule_index: usize, field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            rule_index,
            field: field.into(),
            kind,
        }
    }

    /// Re-attribute the error to another rule position.
    #[must_use]
    pub fn at_rule(mut self, rule_index: usize) -> Self {
        self.rule_index = rule_index;
        self
    }
}

impl Rule {
    /// Creates a validated rule.
    ///
    /// Errors are reported against rule index 0; the rule store re-attributes
    /// them to the rule's real position with [`ValidationError::at_rule`].
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if conditions or actions are empty, a
    /// predicate does not fit its field, a date threshold is not numeric, or a
    /// mailbox/label name is blank.
    pub fn new(
        name: impl Into<String>,
        combinator: Combinator,
        conditions: Vec<Condition>,
        actions: Vec<Action>,
    ) -> Result<Self, ValidationError> {
        if conditions.is_empty() {
            return Err(ValidationError::new(
                0,
                "conditions",
                ValidationErrorKind::EmptyConditions,
            ));
        }
        if actions.is_empty() {
            return Err(ValidationError::new(
                0,
                "actions",
                ValidationErrorKind::EmptyActions,
            ));
        }

        for (i, condition) in conditions.iter().enumerate() {
            validate_condition(condition).map_err(|(field, kind)| {
                ValidationError::new(0, format!("conditions[{i}].{field}"), kind)
            })?;
        }

        let actions = actions
            .into_iter()
            .enumerate()
            .map(|(i, action)| trim_action(action, i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            combinator,
            conditions,
            actions,
        })
    }
}

fn validate_condition(condition: &Condition) -> Result<(), (&'static str, ValidationErrorKind)> {
    if condition.field().is_temporal() != condition.predicate().is_temporal() {
        return Err(("predicate", ValidationErrorKind::PredicateNotApplicable));
    }
    if condition.predicate().is_temporal() && condition.threshold().is_none() {
        return Err((
            "value",
            ValidationErrorKind::NonNumericDateValue(condition.value().to_string()),
        ));
    }
    Ok(())
}

fn trim_action(action: Action, index: usize) -> Result<Action, ValidationError> {
    match action {
        Action::Move { mailbox } => {
            let mailbox = mailbox.trim();
            if mailbox.is_empty() {
                return Err(ValidationError::new(
                    0,
                    format!("actions[{index}].mailbox"),
                    ValidationErrorKind::EmptyMailbox,
                ));
            }
            Ok(Action::move_to(mailbox))
        }
        Action::AddLabel { label } => {
            let label = label.trim();
            if label.is_empty() {
                return Err(ValidationError::new(
                    0,
                    format!("actions[{index}].label"),
                    ValidationErrorKind::EmptyLabel,
                ));
            }
            Ok(Action::add_label(label))
        }
        other => Ok(other),
    }
}
