// src/session.rs

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// In-progress attempt state carried between requests.
///
/// Holds the attempt identity, the question-id sequence frozen at start, and
/// the cursor tracking how far the user has progressed. The sequence is never
/// re-drawn once the session exists; every position lookup resolves against
/// it, including when the user navigates back to an earlier question.
#[derive(Debug, Clone)]
pub struct AttemptSession {
    pub attempt_id: i64,
    pub quiz_id: i64,
    question_ids: Vec<i64>,
    cursor: usize,
}

impl AttemptSession {
    pub fn new(attempt_id: i64, quiz_id: i64, question_ids: Vec<i64>) -> Self {
        Self {
            attempt_id,
            quiz_id,
            question_ids,
            cursor: 0,
        }
    }

    pub fn total_questions(&self) -> usize {
        self.question_ids.len()
    }

    /// Resolves a 1-indexed position to a question id.
    /// Returns `None` past the end of the sequence, which tells the caller
    /// to move on to finalization rather than fetch another question.
    pub fn question_at(&self, position: usize) -> Option<i64> {
        if position == 0 || position > self.question_ids.len() {
            return None;
        }
        Some(self.question_ids[position - 1])
    }

    /// Whether the given question belongs to the frozen sequence.
    pub fn contains(&self, question_id: i64) -> bool {
        self.question_ids.contains(&question_id)
    }

    /// Moves the cursor forward by one answered question.
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// 1-indexed position of the next question to show, or `None` once the
    /// cursor has passed the end of the sequence.
    pub fn next_position(&self) -> Option<usize> {
        if self.cursor < self.question_ids.len() {
            Some(self.cursor + 1)
        } else {
            None
        }
    }
}

/// Shared store of live attempt sessions, keyed by user id.
///
/// One live session per user: starting a new attempt replaces any previous
/// one, and the finalizer clears it on success. Two browser tabs on the same
/// attempt share a single entry, so interleaved submissions can race on the
/// cursor; answers stay consistent because they are keyed by question, not by
/// cursor position.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<i64, AttemptSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: i64, session: AttemptSession) {
        self.inner.write().await.insert(user_id, session);
    }

    pub async fn get(&self, user_id: i64) -> Option<AttemptSession> {
        self.inner.read().await.get(&user_id).cloned()
    }

    pub async fn advance(&self, user_id: i64) {
        if let Some(session) = self.inner.write().await.get_mut(&user_id) {
            session.advance();
        }
    }

    /// Destroys the session. Called by the finalizer on success; an expired
    /// or replaced session simply disappears from the map, leaving the
    /// underlying attempt row in-progress forever.
    pub async fn clear(&self, user_id: i64) {
        self.inner.write().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_at_is_one_indexed() {
        let session = AttemptSession::new(1, 7, vec![10, 20, 30]);
        assert_eq!(session.question_at(1), Some(10));
        assert_eq!(session.question_at(3), Some(30));
        assert_eq!(session.question_at(0), None);
        assert_eq!(session.question_at(4), None);
    }

    #[test]
    fn sequence_stays_frozen_across_lookups() {
        let session = AttemptSession::new(1, 7, vec![5, 3, 9]);
        for _ in 0..3 {
            assert_eq!(session.question_at(2), Some(3));
        }
        assert_eq!(session.total_questions(), 3);
    }

    #[test]
    fn advance_walks_to_exhaustion() {
        let mut session = AttemptSession::new(1, 7, vec![10, 20]);
        assert_eq!(session.next_position(), Some(1));
        session.advance();
        assert_eq!(session.next_position(), Some(2));
        session.advance();
        assert_eq!(session.next_position(), None);
    }

    #[test]
    fn contains_checks_membership() {
        let session = AttemptSession::new(1, 7, vec![10, 20]);
        assert!(session.contains(20));
        assert!(!session.contains(99));
    }

    #[tokio::test]
    async fn store_replaces_and_clears() {
        let store = SessionStore::new();
        store.insert(42, AttemptSession::new(1, 7, vec![10])).await;
        store.insert(42, AttemptSession::new(2, 8, vec![11])).await;

        let session = store.get(42).await.unwrap();
        assert_eq!(session.attempt_id, 2);

        store.clear(42).await;
        assert!(store.get(42).await.is_none());
    }

    #[tokio::test]
    async fn store_advance_moves_cursor() {
        let store = SessionStore::new();
        store
            .insert(42, AttemptSession::new(1, 7, vec![10, 20]))
            .await;
        store.advance(42).await;
        assert_eq!(store.get(42).await.unwrap().next_position(), Some(2));
    }
}
