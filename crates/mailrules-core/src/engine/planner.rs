//! Action planning: merging the actions of every firing rule.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::rule::{Action, Rule};

/// Which occurrence survives when mutually exclusive actions collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The last occurrence in rule order wins; later rules override earlier ones.
    #[default]
    LastWins,
    /// The first occurrence wins; later rules cannot override it.
    FirstWins,
}

/// How colliding actions are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergePolicy {
    /// Resolution between mark-read and mark-unread.
    #[serde(default)]
    pub read_state: Resolution,
    /// Resolution between move actions.
    #[serde(default)]
    pub mailbox: Resolution,
}

impl MergePolicy {
    /// Apply the same resolution to both groups.
    #[must_use]
    pub const fn uniform(resolution: Resolution) -> Self {
        Self {
            read_state: resolution,
            mailbox: resolution,
        }
    }
}

/// Plan the actions for one message from the rules that fired for it.
///
/// Actions are concatenated in rule order, then merged in one left-to-right
/// pass:
/// - mark-read and mark-unread collapse to a single survivor,
/// - move actions collapse to a single survivor,
/// - labels are deduplicated by name.
///
/// A surviving action keeps the position of the occurrence that survived.
#[must_use]
pub fn plan(firing_rules: &[&Rule], policy: MergePolicy) -> Vec<Action> {
    merge(firing_rules.iter().flat_map(|rule| rule.actions()), policy)
}

/// Merge an ordered action sequence under `policy`.
#[must_use]
pub fn merge<'a, I>(actions: I, policy: MergePolicy) -> Vec<Action>
where
    I: IntoIterator<Item = &'a Action>,
{
    let mut slots: Vec<Option<Action>> = Vec::new();
    let mut read_slot = None;
    let mut move_slot = None;
    let mut labels: HashSet<&str> = HashSet::new();

    for action in actions {
        match action {
            Action::MarkRead | Action::MarkUnread => {
                place(&mut slots, &mut read_slot, policy.read_state, action);
            }
            Action::Move { .. } => {
                place(&mut slots, &mut move_slot, policy.mailbox, action);
            }
            Action::AddLabel { label } => {
                if labels.insert(label.as_str()) {
                    slots.push(Some(action.clone()));
                }
            }
        }
    }

    slots.into_iter().flatten().collect()
}

/// Place an action from an exclusive group, evicting or keeping the
/// group's current survivor.
fn place(
    slots: &mut Vec<Option<Action>>,
    survivor: &mut Option<usize>,
    resolution: Resolution,
    action: &Action,
) {
    match (*survivor, resolution) {
        (Some(_), Resolution::FirstWins) => {}
        (Some(previous), Resolution::LastWins) => {
            slots[previous] = None;
            *survivor = Some(slots.len());
            slots.push(Some(action.clone()));
        }
        (None, _) => {
            *survivor = Some(slots.len());
            slots.push(Some(action.clone()));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn last_wins(actions: &[Action]) -> Vec<Action> {
        merge(actions, MergePolicy::default())
    }

    #[test]
    fn test_read_state_last_wins() {
        let planned = last_wins(&[
            Action::MarkRead,
            Action::move_to("Newsletters"),
            Action::add_label("IMPORTANT"),
            Action::MarkUnread,
        ]);
        assert_eq!(
            planned,
            vec![
                Action::move_to("Newsletters"),
                Action::add_label("IMPORTANT"),
                Action::MarkUnread,
            ]
        );
    }

    #[test]
    fn test_repeated_read_collapses() {
        assert_eq!(
            last_wins(&[Action::MarkRead, Action::MarkRead]),
            vec![Action::MarkRead]
        );
    }

    #[test]
    fn test_last_move_survives() {
        let planned = last_wins(&[
            Action::move_to("Archive"),
            Action::MarkRead,
            Action::move_to("Receipts"),
        ]);
        assert_eq!(planned, vec![Action::MarkRead, Action::move_to("Receipts")]);
    }

    #[test]
    fn test_labels_deduplicated_in_first_position() {
        let planned = last_wins(&[
            Action::add_label("A"),
            Action::add_label("B"),
            Action::add_label("A"),
        ]);
        assert_eq!(planned, vec![Action::add_label("A"), Action::add_label("B")]);
    }

    #[test]
    fn test_first_wins_policy() {
        let planned = merge(
            &[
                Action::MarkRead,
                Action::move_to("Archive"),
                Action::MarkUnread,
                Action::move_to("Receipts"),
            ],
            MergePolicy::uniform(Resolution::FirstWins),
        );
        assert_eq!(planned, vec![Action::MarkRead, Action::move_to("Archive")]);
    }

    #[test]
    fn test_mixed_policy() {
        let policy = MergePolicy {
            read_state: Resolution::FirstWins,
            mailbox: Resolution::LastWins,
        };
        let planned = merge(
            &[
                Action::MarkUnread,
                Action::move_to("Archive"),
                Action::MarkRead,
                Action::move_to("Receipts"),
            ],
            policy,
        );
        assert_eq!(planned, vec![Action::MarkUnread, Action::move_to("Receipts")]);
    }

    #[test]
    fn test_empty() {
        assert!(last_wins(&[]).is_empty());
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: MergePolicy = serde_json::from_str(r#"{ "mailbox": "first_wins" }"#).unwrap();
        assert_eq!(policy.read_state, Resolution::LastWins);
        assert_eq!(policy.mailbox, Resolution::FirstWins);
    }
}
