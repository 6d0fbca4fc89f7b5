//! Bounded conversation history for a single session.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Default number of exchanges retained per session.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// One completed question/answer turn. Immutable once recorded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Exchange {
    /// The customer's question as received.
    pub question: String,
    /// The assistant's reply as returned by the backend.
    pub answer: String,
    /// Position of this exchange within the session, monotonically increasing.
    pub sequence: u64,
    /// When the exchange was recorded.
    pub created_at: DateTime<Utc>,
}

/// Fixed-capacity ring of prior exchanges; the oldest entry is evicted first.
///
/// Owned exclusively by one [`ConversationSession`](crate::conversation::session::ConversationSession);
/// nothing here is shared across sessions.
#[derive(Clone, Debug)]
pub struct ConversationHistory {
    entries: VecDeque<Exchange>,
    capacity: usize,
    next_sequence: u64,
}

impl ConversationHistory {
    /// Create a history bounded to `capacity` exchanges.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 0,
        }
    }

    /// Record a completed exchange, evicting from the front while over capacity.
    pub fn append(&mut self, question: &str, answer: &str) {
        let exchange = Exchange {
            question: question.to_string(),
            answer: answer.to_string(),
            sequence: self.next_sequence,
            created_at: Utc::now(),
        };
        self.next_sequence += 1;
        self.entries.push_back(exchange);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// The last `min(limit, len)` exchanges in chronological order.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<&Exchange> {
        let take = limit.min(self.entries.len());
        let skip = self.entries.len() - take;
        self.entries.iter().skip(skip).collect()
    }

    /// Drop all entries. Sequence numbers keep counting afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of retained exchanges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no exchanges are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity of the ring.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_recent_order() {
        let mut history = ConversationHistory::new(10);
        history.append("first question", "first answer");
        history.append("second question", "second answer");

        let recent = history.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].question, "first question");
        assert_eq!(recent[1].question, "second question");
    }

    #[test]
    fn test_capacity_bound_fifo_eviction() {
        let mut history = ConversationHistory::new(3);
        for i in 0..10 {
            history.append(&format!("q{i}"), &format!("a{i}"));
        }

        assert_eq!(history.len(), 3);
        let recent = history.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].question, "q7");
        assert_eq!(recent[2].question, "q9");
    }

    #[test]
    fn test_recent_never_exceeds_capacity() {
        let mut history = ConversationHistory::new(5);
        for i in 0..20 {
            history.append(&format!("q{i}"), "a");
        }
        assert!(history.recent(20).len() <= 5);
    }

    #[test]
    fn test_recent_zero_limit_is_empty() {
        let mut history = ConversationHistory::new(5);
        history.append("q", "a");
        assert!(history.recent(0).is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut history = ConversationHistory::new(5);
        for i in 0..8 {
            history.append(&format!("q{i}"), "a");
        }

        history.clear();
        assert!(history.recent(5).is_empty());
        history.clear();
        assert!(history.recent(1).is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_sequence_survives_clear() {
        let mut history = ConversationHistory::new(5);
        history.append("q0", "a0");
        history.append("q1", "a1");
        history.clear();
        history.append("q2", "a2");

        let recent = history.recent(1);
        assert_eq!(recent[0].sequence, 2);
    }

    #[test]
    fn test_sequence_is_monotonic_across_eviction() {
        let mut history = ConversationHistory::new(2);
        for i in 0..5 {
            history.append(&format!("q{i}"), "a");
        }

        let recent = history.recent(2);
        assert_eq!(recent[0].sequence, 3);
        assert_eq!(recent[1].sequence, 4);
    }

    #[test]
    fn test_default_capacity() {
        let history = ConversationHistory::default();
        assert_eq!(history.capacity(), DEFAULT_MAX_HISTORY);
    }
}
