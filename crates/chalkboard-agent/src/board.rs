//! The blackboard - an append-only, id-ordered message log shared by every
//! worker, the orchestrator and the interactive producer.

use chalkboard_core::{Message, MessageId, Sender};
use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tracing::debug;

pub struct Blackboard {
    /// Ids are contiguous: the message at index `i` has id `i + 1`.
    messages: RwLock<Vec<Message>>,
    latest: watch::Sender<MessageId>,
}

impl Default for Blackboard {
    fn default() -> Self { Self::new() }
}

impl Blackboard {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(0);
        Self {
            messages: RwLock::new(Vec::new()),
            latest,
        }
    }

    /// Append a message and return its id. The first id is 1.
    pub async fn append(&self, sender: impl Into<Sender>, text: impl Into<String>) -> MessageId {
        let mut messages = self.messages.write().await;
        let id = messages.len() as MessageId + 1;
        let message = Message {
            id,
            sender: sender.into(),
            text: text.into(),
            timestamp: Utc::now(),
        };
        debug!(id, sender = %message.sender, chars = message.text.len(), "board append");
        messages.push(message);
        // Published under the write lock so subscribers never see ids go backwards.
        self.latest.send_replace(id);
        id
    }

    /// The last `count` messages, oldest first.
    pub async fn tail(&self, count: usize) -> Vec<Message> {
        let messages = self.messages.read().await;
        let start = messages.len().saturating_sub(count);
        messages[start..].to_vec()
    }

    /// Every message with an id greater than `id`, oldest first.
    pub async fn since(&self, id: MessageId) -> Vec<Message> {
        let messages = self.messages.read().await;
        let start = usize::try_from(id).unwrap_or(usize::MAX).min(messages.len());
        messages[start..].to_vec()
    }

    /// A copy of the full history.
    pub async fn all(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }

    /// Id of the newest message, 0 when the board is empty.
    pub fn latest_id(&self) -> MessageId {
        *self.latest.borrow()
    }

    /// Watch the newest id; changes whenever something is appended.
    pub fn subscribe(&self) -> watch::Receiver<MessageId> {
        self.latest.subscribe()
    }
}
