//! Raw rule records as they appear in a rule source.

use serde::{Deserialize, Serialize};

use crate::rule::{
    Action, ActionKind, Combinator, Condition, Field, Predicate, Rule, ValidationError,
    ValidationErrorKind,
};

/// A rule record before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Human-readable description; preferred as the rule name.
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit rule name.
    #[serde(default)]
    pub name: Option<String>,
    /// Identifier, used as the name when nothing else is given.
    #[serde(default)]
    pub id: Option<String>,
    /// `all` or `any`; defaults to `all`.
    #[serde(default, alias = "predicate", alias = "combinator", alias = "match")]
    pub conditions_predicate: Option<String>,
    /// Conditions in declared order.
    #[serde(default)]
    pub conditions: Vec<ConditionDefinition>,
    /// Actions in declared order.
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

/// A condition record before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Field name or alias.
    #[serde(default)]
    pub field: String,
    /// Predicate name or alias.
    #[serde(default)]
    pub predicate: String,
    /// Comparison value; a string or an integer.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// An action record before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Action type name or alias.
    #[serde(rename = "type")]
    pub kind: String,
    /// Destination for move actions.
    #[serde(default)]
    pub mailbox: Option<String>,
    /// Label for add-label actions.
    #[serde(default, alias = "label")]
    pub label_name: Option<String>,
}

impl RuleDefinition {
    /// Resolve names and validate, producing a rule.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` attributed to `index`.
    pub fn into_rule(self, index: usize) -> Result<Rule, ValidationError> {
        let name = [self.description, self.name, self.id]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| format!("rule #{}", index + 1));

        let combinator = match self.conditions_predicate.as_deref() {
            None => Combinator::default(),
            Some(raw) => Combinator::from_alias(raw).ok_or_else(|| {
                ValidationError::new(
                    index,
                    "conditions_predicate",
                    ValidationErrorKind::UnknownCombinator(raw.to_string()),
                )
            })?,
        };

        let conditions = self
            .conditions
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                c.resolve().map_err(|(field, kind)| {
                    ValidationError::new(index, format!("conditions[{i}].{field}"), kind)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let actions = self
            .actions
            .into_iter()
            .enumerate()
            .map(|(i, a)| {
                a.resolve().map_err(|(field, kind)| {
                    ValidationError::new(index, format!("actions[{i}].{field}"), kind)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Rule::new(name, combinator, conditions, actions).map_err(|e| e.at_rule(index))
    }
}

impl ConditionDefinition {
    fn resolve(self) -> Result<Condition, (&'static str, ValidationErrorKind)> {
        let field = Field::from_alias(&self.field)
            .ok_or(("field", ValidationErrorKind::UnknownField(self.field.clone())))?;
        let predicate = Predicate::from_alias(&self.predicate).ok_or((
            "predicate",
            ValidationErrorKind::UnknownPredicate(self.predicate.clone()),
        ))?;
        let value = match self.value {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) if n.is_u64() || n.is_i64() => n.to_string(),
            _ => return Err(("value", ValidationErrorKind::MissingValue)),
        };
        Ok(Condition::new(field, predicate, value))
    }
}

impl ActionDefinition {
    fn resolve(self) -> Result<Action, (&'static str, ValidationErrorKind)> {
        let kind = ActionKind::from_alias(&self.kind)
            .ok_or(("type", ValidationErrorKind::UnknownActionType(self.kind.clone())))?;
        Ok(match kind {
            ActionKind::MarkRead => Action::MarkRead,
            ActionKind::MarkUnread => Action::MarkUnread,
            ActionKind::Move => Action::move_to(self.mailbox.unwrap_or_default()),
            ActionKind::AddLabel => Action::add_label(self.label_name.unwrap_or_default()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn definition(
        conditions: Vec<ConditionDefinition>,
        actions: Vec<ActionDefinition>,
    ) -> RuleDefinition {
        RuleDefinition {
            conditions,
            actions,
            ..RuleDefinition::default()
        }
    }

    fn condition(field: &str, predicate: &str, value: serde_json::Value) -> ConditionDefinition {
        ConditionDefinition {
            field: field.to_string(),
            predicate: predicate.to_string(),
            value: Some(value),
        }
    }

    fn action(kind: &str) -> ActionDefinition {
        ActionDefinition {
            kind: kind.to_string(),
            ..ActionDefinition::default()
        }
    }

    #[test]
    fn test_name_fallbacks() {
        let mut def = definition(
            vec![condition("subject", "contains", "a".into())],
            vec![action("mark_read")],
        );
        def.id = Some("r-42".into());
        assert_eq!(def.clone().into_rule(0).unwrap().name(), "r-42");

        def.description = Some("  ".into());
        def.name = Some("Named".into());
        assert_eq!(def.clone().into_rule(4).unwrap().name(), "Named");

        def.name = None;
        def.id = None;
        assert_eq!(def.into_rule(4).unwrap().name(), "rule #5");
    }

    #[test]
    fn test_unknown_combinator() {
        let mut def = definition(
            vec![condition("subject", "contains", "a".into())],
            vec![action("mark_read")],
        );
        def.conditions_predicate = Some("most".into());

        let err = def.into_rule(2).unwrap_err();
        assert_eq!(err.rule_index, 2);
        assert_eq!(err.field, "conditions_predicate");
        assert_eq!(err.kind, ValidationErrorKind::UnknownCombinator("most".into()));
    }

    #[test]
    fn test_unknown_predicate_and_action() {
        let err = definition(
            vec![condition("subject", "starts_with", "a".into())],
            vec![action("mark_read")],
        )
        .into_rule(0)
        .unwrap_err();
        assert_eq!(err.field, "conditions[0].predicate");

        let err = definition(
            vec![condition("subject", "contains", "a".into())],
            vec![action("mark_read"), action("delete")],
        )
        .into_rule(0)
        .unwrap_err();
        assert_eq!(err.field, "actions[1].type");
        assert_eq!(err.kind, ValidationErrorKind::UnknownActionType("delete".into()));
    }

    #[test]
    fn test_value_kinds() {
        let err = definition(
            vec![condition("subject", "contains", serde_json::Value::Bool(true))],
            vec![action("mark_read")],
        )
        .into_rule(0)
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingValue);

        let err = definition(
            vec![condition("date", "less_than_days", serde_json::json!(-3))],
            vec![action("mark_read")],
        )
        .into_rule(0)
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NonNumericDateValue("-3".into()));
        assert_eq!(err.field, "conditions[0].value");
    }

    #[test]
    fn test_move_without_mailbox() {
        let err = definition(
            vec![condition("subject", "contains", "a".into())],
            vec![action("move_message")],
        )
        .into_rule(7)
        .unwrap_err();

        assert_eq!(err.rule_index, 7);
        assert_eq!(err.field, "actions[0].mailbox");
        assert_eq!(err.kind, ValidationErrorKind::EmptyMailbox);
    }

    #[test]
    fn test_label_alias() {
        let json = r#"{ "type": "label", "label": "Receipts" }"#;
        let def: ActionDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.resolve().unwrap(), Action::add_label("Receipts"));
    }
}
