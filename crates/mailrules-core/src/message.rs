//! Messages consumed by the engine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque provider identifier of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a new message ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored message, as supplied by the message source.
///
/// The engine never mutates a message; changes are requested through the
/// mailbox collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Provider identifier.
    pub id: MessageId,
    /// Sender, either a bare address or `Name <address>`.
    #[serde(default)]
    pub from: String,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Plain-text body.
    #[serde(default)]
    pub body: String,
    /// Primary recipients.
    #[serde(default, deserialize_with = "address_list")]
    pub to: Vec<String>,
    /// Carbon-copy recipients.
    #[serde(default, deserialize_with = "address_list")]
    pub cc: Vec<String>,
    /// Blind carbon-copy recipients.
    #[serde(default, deserialize_with = "address_list")]
    pub bcc: Vec<String>,
    /// When the provider received the message.
    pub received_at: DateTime<Utc>,
    /// Whether the message has been read.
    #[serde(default)]
    pub is_read: bool,
    /// Labels currently attached.
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

impl Message {
    /// Creates an empty unread message.
    #[must_use]
    pub fn new(id: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::new(id),
            from: String::new(),
            subject: String::new(),
            body: String::new(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            received_at,
            is_read: false,
            labels: BTreeSet::new(),
        }
    }

    /// Sets the sender.
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the primary recipients.
    #[must_use]
    pub fn with_to<I, S>(mut self, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to = to.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the carbon-copy recipients.
    #[must_use]
    pub fn with_cc<I, S>(mut self, cc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cc = cc.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the blind carbon-copy recipients.
    #[must_use]
    pub fn with_bcc<I, S>(mut self, bcc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bcc = bcc.into_iter().map(Into::into).collect();
        self
    }
}

/// Extract the bare address from `Name <address>`.
///
/// Items without an angle-bracketed address are returned trimmed.
#[must_use]
pub fn extract_address(item: &str) -> &str {
    let item = item.trim();
    if let Some(start) = item.rfind('<') {
        if let Some(len) = item[start + 1..].find('>') {
            let addr = item[start + 1..start + 1 + len].trim();
            if !addr.is_empty() {
                return addr;
            }
        }
    }
    item
}

/// Accept either a JSON array of addresses or one comma-separated string.
fn address_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(list) => list,
        Raw::Joined(joined) => split_addresses(&joined),
    })
}

/// Split a header-style address list on the commas that separate entries.
///
/// Commas inside a quoted display name or inside `<...>` do not split.
fn split_addresses(joined: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut bracketed = false;

    for (i, c) in joined.char_indices() {
        match c {
            '"' if !bracketed => quoted = !quoted,
            '<' if !quoted => bracketed = true,
            '>' if !quoted => bracketed = false,
            ',' if !quoted && !bracketed => {
                items.push(&joined[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&joined[start..]);

    items
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
