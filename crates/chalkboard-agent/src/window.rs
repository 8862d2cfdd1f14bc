//! Context windows and cursors over the blackboard
//!
//! Workers look at a fixed-size recency window; the orchestrator and the
//! display keep cursors to detect what is new since they last looked.

use crate::board::Blackboard;
use chalkboard_core::{Message, MessageId};

/// Rendered in place of an empty window. Never sent to the oracle.
pub const NO_MESSAGES: &str = "No messages available.";

/// The last `window_size` messages, which is all a worker sees when deciding.
pub async fn recent_for_decision(board: &Blackboard, window_size: usize) -> Vec<Message> {
    board.tail(window_size).await
}

/// One `sender: text` line per message, in order.
pub fn render(messages: &[Message]) -> String {
    if messages.is_empty() {
        return NO_MESSAGES.to_string();
    }
    messages
        .iter()
        .map(|m| format!("{}: {}", m.sender, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// High-water mark of what a consumer has processed. Never moves backwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContextCursor {
    last_seen_id: MessageId,
}

impl ContextCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(last_seen_id: MessageId) -> Self {
        Self { last_seen_id }
    }

    pub fn last_seen_id(&self) -> MessageId {
        self.last_seen_id
    }

    /// Whether anything was appended after this cursor.
    pub fn has_new(&self, board: &Blackboard) -> bool {
        board.latest_id() > self.last_seen_id
    }

    /// Messages appended after this cursor, oldest first.
    pub async fn unseen(&self, board: &Blackboard) -> Vec<Message> {
        board.since(self.last_seen_id).await
    }

    /// Move to the newest message on the board.
    pub fn advance(&mut self, board: &Blackboard) -> MessageId {
        self.advance_to(board.latest_id())
    }

    pub fn advance_to(&mut self, id: MessageId) -> MessageId {
        self.last_seen_id = self.last_seen_id.max(id);
        self.last_seen_id
    }
}
