//! Passive observers and the feed that hands them new messages in order

use crate::board::Blackboard;
use crate::window::ContextCursor;
use chalkboard_core::{Message, MessageId};
use tokio::sync::Mutex;

/// Receives newly visible messages, oldest first.
pub trait Observer: Send + Sync {
    fn show(&self, messages: &[Message]);
}

/// Delivers each board message to the observer exactly once, in id order,
/// no matter how many producers call [`Feed::flush`].
pub struct Feed {
    observer: Box<dyn Observer>,
    cursor: Mutex<ContextCursor>,
}

impl Feed {
    pub fn new(observer: impl Observer + 'static) -> Self {
        Self {
            observer: Box::new(observer),
            cursor: Mutex::new(ContextCursor::new()),
        }
    }

    /// Show everything appended since the last flush. Returns how many
    /// messages were shown; 0 leaves the observer untouched.
    pub async fn flush(&self, board: &Blackboard) -> usize {
        let mut cursor = self.cursor.lock().await;
        let fresh = cursor.unseen(board).await;
        let Some(last) = fresh.last() else {
            return 0;
        };
        self.observer.show(&fresh);
        cursor.advance_to(last.id);
        fresh.len()
    }

    pub async fn last_shown_id(&self) -> MessageId {
        self.cursor.lock().await.last_seen_id()
    }
}

/// Observer that keeps everything it is shown. Clones share storage.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    seen: std::sync::Arc<std::sync::Mutex<Vec<Message>>>,
    calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.seen.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Number of non-empty deliveries.
    pub fn deliveries(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Observer for RecordingObserver {
    fn show(&self, messages: &[Message]) {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.extend_from_slice(messages);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flush_delivers_each_message_once() {
        let board = Blackboard::new();
        let observer = RecordingObserver::new();
        let feed = Feed::new(observer.clone());

        board.append("user", "one").await;
        board.append("user", "two").await;
        assert_eq!(feed.flush(&board).await, 2);
        assert_eq!(feed.flush(&board).await, 0);
        board.append("user", "three").await;
        assert_eq!(feed.flush(&board).await, 1);

        let ids: Vec<_> = observer.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(observer.deliveries(), 2);
        assert_eq!(feed.last_shown_id().await, 3);
    }

    #[tokio::test]
    async fn flush_on_empty_board_is_noop() {
        let board = Blackboard::new();
        let observer = RecordingObserver::new();
        let feed = Feed::new(observer.clone());
        assert_eq!(feed.flush(&board).await, 0);
        assert_eq!(observer.deliveries(), 0);
    }
}
