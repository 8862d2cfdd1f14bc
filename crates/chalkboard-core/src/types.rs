//! Core types for Chalkboard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reserved sender for human input.
pub const USER_SENDER: &str = "user";
/// Reserved sender for system notices.
pub const SYSTEM_SENDER: &str = "system";

/// Position of a message in the board. The first appended message is 1;
/// 0 means "before everything".
pub type MessageId = u64;

/// Sender identifier - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sender(Arc<str>);

impl Sender {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn user() -> Self {
        Self::new(USER_SENDER)
    }

    pub fn system() -> Self {
        Self::new(SYSTEM_SENDER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `user` and `system` are never worker names.
    pub fn is_reserved(&self) -> bool {
        matches!(self.as_str(), USER_SENDER | SYSTEM_SENDER)
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Sender {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Sender {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for Sender {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Sender {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A message on the board. Never mutated after append.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_from_user(&self) -> bool {
        self.sender == USER_SENDER
    }

    pub fn is_from_system(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }

    /// Number of whitespace-separated words in the text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
