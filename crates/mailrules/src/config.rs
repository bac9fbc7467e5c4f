//! Runner configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mailrules_core::{ActionKind, MergePolicy, Resolution};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `rules_path`.
pub const RULES_ENV: &str = "MAILRULES_RULES";
/// Environment variable overriding `messages_path`.
pub const MESSAGES_ENV: &str = "MAILRULES_MESSAGES";

/// Merge policy as written in the config file: one resolution for every
/// group, or one per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MergeSetting {
    /// `"last_wins"` or `"first_wins"`.
    Uniform(Resolution),
    /// `{ "read_state": ..., "mailbox": ... }`.
    PerGroup(MergePolicy),
}

impl Default for MergeSetting {
    fn default() -> Self {
        Self::Uniform(Resolution::LastWins)
    }
}

impl MergeSetting {
    /// The policy handed to the engine.
    pub const fn policy(self) -> MergePolicy {
        match self {
            Self::Uniform(resolution) => MergePolicy::uniform(resolution),
            Self::PerGroup(policy) => policy,
        }
    }
}

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON rule source.
    pub rules_path: PathBuf,
    /// JSON array of messages to evaluate.
    pub messages_path: PathBuf,
    /// How colliding actions are merged.
    pub merge_policy: MergeSetting,
    /// Messages processed at once.
    pub max_concurrency: usize,
    /// Where to write the JSON run report; printed to stdout when unset.
    pub report_path: Option<PathBuf>,
    /// Action types the mailbox rejects, for rehearsing failure handling.
    pub fail_actions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from("rules.json"),
            messages_path: PathBuf::from("messages.json"),
            merge_policy: MergeSetting::default(),
            max_concurrency: 8,
            report_path: None,
            fail_actions: Vec::new(),
        }
    }
}

impl Config {
    /// Default config file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailrules")
            .join("config.json")
    }

    /// Load the config from `path`, or from [`Config::default_path`].
    ///
    /// An explicit path must exist; a missing default file means defaults.
    /// Environment overrides are applied last.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path).await?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::read(&path).await?
                } else {
                    tracing::debug!("No config at {:?}, using defaults", path);
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    async fn read(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(rules) = var(RULES_ENV) {
            self.rules_path = PathBuf::from(rules);
        }
        if let Some(messages) = var(MESSAGES_ENV) {
            self.messages_path = PathBuf::from(messages);
        }
    }

    /// Resolve `fail_actions` to action kinds.
    pub fn failing_kinds(&self) -> Result<Vec<ActionKind>> {
        self.fail_actions
            .iter()
            .map(|name| match ActionKind::from_alias(name) {
                Some(kind) => Ok(kind),
                None => bail!("Unknown action type in fail_actions: '{name}'"),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str(r#"{ "rules_path": "r.json" }"#).unwrap();
        assert_eq!(config.rules_path, PathBuf::from("r.json"));
        assert_eq!(config.messages_path, PathBuf::from("messages.json"));
        assert_eq!(config.merge_policy.policy(), MergePolicy::default());
        assert_eq!(config.max_concurrency, 8);
    }

    #[test]
    fn test_merge_policy_forms() {
        let uniform: Config =
            serde_json::from_str(r#"{ "merge_policy": "first_wins" }"#).unwrap();
        assert_eq!(
            uniform.merge_policy.policy(),
            MergePolicy::uniform(Resolution::FirstWins)
        );

        let split: Config =
            serde_json::from_str(r#"{ "merge_policy": { "mailbox": "first_wins" } }"#).unwrap();
        assert_eq!(
            split.merge_policy.policy(),
            MergePolicy {
                read_state: Resolution::LastWins,
                mailbox: Resolution::FirstWins,
            }
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == RULES_ENV).then(|| "/etc/rules.json".to_string()));
        assert_eq!(config.rules_path, PathBuf::from("/etc/rules.json"));
        assert_eq!(config.messages_path, PathBuf::from("messages.json"));
    }

    #[test]
    fn test_failing_kinds() {
        let config = Config {
            fail_actions: vec!["move_message".into(), "Add Label".into()],
            ..Config::default()
        };
        assert_eq!(
            config.failing_kinds().unwrap(),
            vec![ActionKind::Move, ActionKind::AddLabel]
        );

        let config = Config {
            fail_actions: vec!["delete".into()],
            ..Config::default()
        };
        assert!(config.failing_kinds().is_err());
    }
}
