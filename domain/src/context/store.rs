//! Context store: conversation history plus discovery ledger.

use super::entities::{Discovery, Message};
use crate::role::RoleId;

#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    history: Vec<Message>,
    ledger: Vec<Discovery>,
    next_seq: u64,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, stamping it with the next sequence number.
    pub fn append(&mut self, mut message: Message) -> u64 {
        self.next_seq += 1;
        message.seq = self.next_seq;
        self.history.push(message);
        self.next_seq
    }

    pub fn record_discovery(&mut self, contributor: RoleId, payload: impl Into<String>) -> &Discovery {
        self.next_seq += 1;
        self.ledger.push(Discovery {
            seq: self.next_seq,
            contributor,
            payload: payload.into(),
            timestamp: crate::core::time::current_timestamp(),
        });
        &self.ledger[self.ledger.len() - 1]
    }

    /// The last `n` messages in order, oldest first.
    ///
    /// Lazy: nothing is copied until the caller consumes the iterator.
    pub fn recent_window(&self, n: usize) -> std::slice::Iter<'_, Message> {
        let start = self.history.len().saturating_sub(n);
        self.history[start..].iter()
    }

    /// Read-only view of the ledger, oldest first.
    pub fn ledger_snapshot(&self) -> &[Discovery] {
        &self.ledger
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn last(&self) -> Option<&Message> {
        self.history.last()
    }

    /// Drop the history; the ledger is kept and sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Rough size of the history in characters.
    pub fn char_count(&self) -> usize {
        self.history.iter().map(|m| m.content.chars().count()).sum()
    }
}
