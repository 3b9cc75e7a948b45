use crate::constants::limits::MAX_HISTORY;
use crate::llm::{ChatId, Message};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Rolling per-chat message log.
pub trait HistoryStore: Send + Sync {
    /// Copy of the chat's messages, oldest first. Empty for unknown chats.
    fn get(&self, chat: ChatId) -> Vec<Message>;

    /// Append one message, evicting the oldest once the cap is exceeded.
    fn add(&self, chat: ChatId, message: Message);

    /// Forget the chat entirely. Clearing an unknown chat is a no-op.
    fn clear(&self, chat: ChatId);

    /// Append several messages as one step.
    fn add_all(&self, chat: ChatId, messages: Vec<Message>) {
        for message in messages {
            self.add(chat, message);
        }
    }
}

/// Process-lifetime history behind one coarse lock.
///
/// A single mutex guards every chat. Each operation is a push, a pop or a
/// copy of at most [`MAX_HISTORY`] messages, so sharding per chat would buy
/// nothing at the volume a chat bot sees. The lock is never held across I/O.
pub struct InMemoryHistory {
    chats: Mutex<HashMap<ChatId, VecDeque<Message>>>,
    max_messages: usize,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            chats: Mutex::new(HashMap::new()),
            max_messages: MAX_HISTORY,
        }
    }

    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Number of messages stored for a chat.
    pub fn len(&self, chat: ChatId) -> usize {
        self.lock().get(&chat).map_or(0, VecDeque::len)
    }

    /// Number of chats that currently have a history.
    pub fn conversations(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the guard cannot leave a VecDeque half-updated,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<ChatId, VecDeque<Message>>> {
        self.chats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, messages: &mut VecDeque<Message>, message: Message) {
        messages.push_back(message);
        if messages.len() > self.max_messages {
            messages.pop_front();
        }
    }
}

impl HistoryStore for InMemoryHistory {
    fn get(&self, chat: ChatId) -> Vec<Message> {
        self.lock()
            .get(&chat)
            .map(|messages| messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn add(&self, chat: ChatId, message: Message) {
        let mut chats = self.lock();
        let messages = chats.entry(chat).or_default();
        self.push(messages, message);
    }

    fn clear(&self, chat: ChatId) {
        self.lock().remove(&chat);
    }

    fn add_all(&self, chat: ChatId, messages: Vec<Message>) {
        let mut chats = self.lock();
        let stored = chats.entry(chat).or_default();
        for message in messages {
            self.push(stored, message);
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}
