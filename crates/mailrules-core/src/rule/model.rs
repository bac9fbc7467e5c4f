//! Rule data models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message field a condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Sender address.
    From,
    /// Subject line.
    Subject,
    /// Plain-text body.
    Body,
    /// When the message was received.
    ReceivedAt,
    /// Primary recipients.
    To,
    /// Carbon-copy recipients.
    Cc,
    /// Blind carbon-copy recipients.
    Bcc,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::From,
        Self::Subject,
        Self::Body,
        Self::ReceivedAt,
        Self::To,
        Self::Cc,
        Self::Bcc,
    ];

    /// Resolve a field name from a rule source.
    ///
    /// Matching is case-insensitive and accepts the historical column names
    /// (`from_address`, `body_plain`, `received_datetime`, ...) as well as the
    /// labels a user sees (`Message`, `Date Received`, ...).
    #[must_use]
    pub fn from_alias(name: &str) -> Option<Self> {
        match normalize_name(name).as_str() {
            "from" | "from_address" | "sender" => Some(Self::From),
            "subject" => Some(Self::Subject),
            "body" | "message" | "body_plain" => Some(Self::Body),
            "received_at" | "date_received" | "received_date/time" | "received_datetime"
            | "date" => Some(Self::ReceivedAt),
            "to" | "to_addresses" => Some(Self::To),
            "cc" | "cc_addresses" => Some(Self::Cc),
            "bcc" | "bcc_addresses" => Some(Self::Bcc),
            _ => None,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::From => "from",
            Self::Subject => "subject",
            Self::Body => "body",
            Self::ReceivedAt => "received_at",
            Self::To => "to",
            Self::Cc => "cc",
            Self::Bcc => "bcc",
        }
    }

    /// Whether the field holds a timestamp rather than text.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::ReceivedAt)
    }

    /// Whether the field holds a list of addresses.
    #[must_use]
    pub const fn is_address_list(&self) -> bool {
        matches!(self, Self::To | Self::Cc | Self::Bcc)
    }
}

/// Comparison a condition performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Field contains the value (case-insensitive).
    Contains,
    /// Field does not contain the value.
    NotContains,
    /// Field equals the value (case-insensitive).
    Equals,
    /// Field does not equal the value.
    NotEquals,
    /// Message is younger than `n` days.
    LessThanDays,
    /// Message is older than `n` days.
    GreaterThanDays,
    /// Message is younger than `n` months of 30 days.
    LessThanMonths,
    /// Message is older than `n` months of 30 days.
    GreaterThanMonths,
}

impl Predicate {
    /// Every predicate, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Contains,
        Self::NotContains,
        Self::Equals,
        Self::NotEquals,
        Self::LessThanDays,
        Self::GreaterThanDays,
        Self::LessThanMonths,
        Self::GreaterThanMonths,
    ];

    /// Resolve a predicate name from a rule source (case-insensitive).
    #[must_use]
    pub fn from_alias(name: &str) -> Option<Self> {
        match normalize_name(name).as_str() {
            "contains" => Some(Self::Contains),
            "not_contains" | "does_not_contain" => Some(Self::NotContains),
            "equals" => Some(Self::Equals),
            "not_equals" | "does_not_equal" => Some(Self::NotEquals),
            "less_than_days" => Some(Self::LessThanDays),
            "greater_than_days" => Some(Self::GreaterThanDays),
            "less_than_months" => Some(Self::LessThanMonths),
            "greater_than_months" => Some(Self::GreaterThanMonths),
            _ => None,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::LessThanDays => "less_than_days",
            Self::GreaterThanDays => "greater_than_days",
            Self::LessThanMonths => "less_than_months",
            Self::GreaterThanMonths => "greater_than_months",
        }
    }

    /// Whether the predicate compares message age.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::LessThanDays
                | Self::GreaterThanDays
                | Self::LessThanMonths
                | Self::GreaterThanMonths
        )
    }

    /// Whether the predicate is the negation of a positive string test.
    #[must_use]
    pub const fn is_negated(&self) -> bool {
        matches!(self, Self::NotContains | Self::NotEquals)
    }
}

/// How a rule's conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Every condition must hold.
    #[default]
    All,
    /// At least one condition must hold.
    Any,
}

impl Combinator {
    /// Parse a combinator name (case-insensitive).
    #[must_use]
    pub fn from_alias(name: &str) -> Option<Self> {
        match normalize_name(name).as_str() {
            "all" => Some(Self::All),
            "any" => Some(Self::Any),
            _ => None,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }
}

/// A single field/predicate/value test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    field: Field,
    predicate: Predicate,
    value: String,
}

impl Condition {
    /// Creates a condition. The value is trimmed and lowercased.
    #[must_use]
    pub fn new(field: Field, predicate: Predicate, value: impl AsRef<str>) -> Self {
        Self {
            field,
            predicate,
            value: normalize_text(value.as_ref()),
        }
    }

    /// Field under test.
    #[must_use]
    pub const fn field(&self) -> Field {
        self.field
    }

    /// Comparison performed.
    #[must_use]
    pub const fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Normalized comparison value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The value as a day or month count.
    ///
    /// Only plain ASCII digits are accepted; signs are rejected.
    #[must_use]
    pub fn threshold(&self) -> Option<u64> {
        if self.value.is_empty() || !self.value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.value.parse().ok()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} '{}'",
            self.field.as_str(),
            self.predicate.as_str(),
            self.value
        )
    }
}

/// Discriminant of an [`Action`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Mark the message read.
    MarkRead,
    /// Mark the message unread.
    MarkUnread,
    /// Move the message to a mailbox.
    Move,
    /// Attach a label.
    AddLabel,
}

impl ActionKind {
    /// Resolve an action type name from a rule source (case-insensitive).
    #[must_use]
    pub fn from_alias(name: &str) -> Option<Self> {
        match normalize_name(name).as_str() {
            "mark_as_read" | "mark_read" => Some(Self::MarkRead),
            "mark_as_unread" | "mark_unread" => Some(Self::MarkUnread),
            "move_message" | "move" => Some(Self::Move),
            "add_label" | "label" => Some(Self::AddLabel),
            _ => None,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MarkRead => "mark_read",
            Self::MarkUnread => "mark_unread",
            Self::Move => "move",
            Self::AddLabel => "add_label",
        }
    }
}

/// A mutation requested for a matching message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Mark the message read.
    MarkRead,
    /// Mark the message unread.
    MarkUnread,
    /// Move the message to another mailbox.
    Move {
        /// Destination mailbox name.
        mailbox: String,
    },
    /// Attach a label to the message.
    AddLabel {
        /// Label name.
        label: String,
    },
}

impl Action {
    /// Creates a move action.
    #[must_use]
    pub fn move_to(mailbox: impl Into<String>) -> Self {
        Self::Move {
            mailbox: mailbox.into(),
        }
    }

    /// Creates an add-label action.
    #[must_use]
    pub fn add_label(label: impl Into<String>) -> Self {
        Self::AddLabel {
            label: label.into(),
        }
    }

    /// The action's kind.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::MarkRead => ActionKind::MarkRead,
            Self::MarkUnread => ActionKind::MarkUnread,
            Self::Move { .. } => ActionKind::Move,
            Self::AddLabel { .. } => ActionKind::AddLabel,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkRead => f.write_str("mark_read"),
            Self::MarkUnread => f.write_str("mark_unread"),
            Self::Move { mailbox } => write!(f, "move({mailbox})"),
            Self::AddLabel { label } => write!(f, "add_label({label})"),
        }
    }
}

/// A named combination of conditions and actions.
///
/// Construct through [`Rule::new`] or the rule store; both enforce that
/// conditions and actions are non-empty and that every predicate fits its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub(super) name: String,
    pub(super) combinator: Combinator,
    pub(super) conditions: Vec<Condition>,
    pub(super) actions: Vec<Action>,
}

impl Rule {
    /// Rule name (its description in the rule source).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the conditions combine.
    #[must_use]
    pub const fn combinator(&self) -> Combinator {
        self.combinator
    }

    /// Conditions in declared order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Actions in declared order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

/// Fold a user-supplied name to the form the alias tables use.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Normalize text for case-insensitive comparison.
pub(crate) fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}
