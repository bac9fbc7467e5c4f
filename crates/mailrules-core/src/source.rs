//! Message sources.

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::Result;
use crate::message::Message;

/// Supplies the messages a run evaluates.
pub trait MessageSource: Send + Sync {
    /// Fetch the messages, in the order they should be reported.
    fn messages(&self) -> impl Future<Output = Result<Vec<Message>>> + Send;
}

/// Reads messages from a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MessageSource for JsonFileSource {
    async fn messages(&self) -> Result<Vec<Message>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let messages: Vec<Message> = serde_json::from_str(&contents)?;
        debug!("Read {} messages from {:?}", messages.len(), self.path);
        Ok(messages)
    }
}

impl MessageSource for Vec<Message> {
    async fn messages(&self) -> Result<Vec<Message>> {
        Ok(self.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mailrules-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let path = temp_path("messages.json");
        tokio::fs::write(
            &path,
            r#"[
                {
                    "id": "m1",
                    "from": "Daily Reads <news@daily-reads.com>",
                    "subject": "Today",
                    "to": "me@example.com, team@example.com",
                    "received_at": "2024-01-02T03:04:05Z"
                },
                { "id": "m2", "received_at": "2024-01-03T00:00:00Z", "is_read": true }
            ]"#,
        )
        .await
        .unwrap();

        let messages = JsonFileSource::new(&path).messages().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].to, vec!["me@example.com", "team@example.com"]);
        assert!(messages[0].cc.is_empty());
        assert!(messages[1].is_read);
    }

    #[tokio::test]
    async fn test_in_memory_source_preserves_order() {
        let received_at = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
        let source = vec![Message::new("b", received_at), Message::new("a", received_at)];

        let messages = source.messages().await.unwrap();

        assert_eq!(messages, source);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = JsonFileSource::new(temp_path("absent.json"));
        assert!(matches!(source.messages().await, Err(Error::Io(_))));
    }
}
