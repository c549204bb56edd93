use crate::traits::{ChatMessage, Role};
use anyhow::{Context, Result};
use std::path::Path;

/// Append-only, chronologically ordered message log.
///
/// The log is the prompt context for every model call. Messages are never
/// edited, reordered or removed once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a log seeded with a system message. An empty prompt seeds
    /// nothing.
    pub fn with_system(system: &str) -> Self {
        let mut conversation = Self::new();
        if !system.is_empty() {
            conversation.messages.push(ChatMessage::system(system));
        }
        conversation
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_assistant(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Writes the log as a JSON array of `{role, content}` records.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&self.messages)
            .context("Failed to serialize conversation")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write conversation to {}", path.display()))?;

        tracing::debug!(
            messages = self.messages.len(),
            path = %path.display(),
            "Conversation saved"
        );

        Ok(())
    }

    /// Loads a saved log, or starts fresh from `system` when `path` does not
    /// exist. A file that exists but cannot be parsed is an error.
    pub fn load_or_new(path: &Path, system: &str) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No saved conversation, starting fresh");
                return Ok(Self::with_system(system));
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to read conversation from {}: {}",
                    path.display(),
                    e
                ));
            }
        };

        let messages: Vec<ChatMessage> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse conversation from {}", path.display()))?;

        Ok(Self { messages })
    }
}
