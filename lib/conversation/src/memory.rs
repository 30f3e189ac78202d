//! In-memory implementations of the collaborator traits.
//!
//! Used by the console harness and the tests. Locks are held only for the
//! duration of a single operation and never across an await point.

use crate::config::Sentinels;
use crate::error::{DirectoryError, NotifyError, StoreError};
use crate::message::{Message, NewMessage};
use crate::notify::{Inbox, RealtimeNotifier};
use crate::participant::{Participant, ParticipantDirectory};
use crate::store::{MessageStore, RoleScope};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError, RwLock};
use support_relay_core::{MessageId, ParticipantId};
use tokio::sync::mpsc;

/// Directory backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    participants: RwLock<HashMap<ParticipantId, Participant>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding the given participants.
    #[must_use]
    pub fn with_participants(participants: impl IntoIterator<Item = Participant>) -> Self {
        let directory = Self::new();
        for participant in participants {
            directory.insert(participant);
        }
        directory
    }

    /// Adds or replaces a participant.
    pub fn insert(&self, participant: Participant) {
        self.participants
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(participant.id, participant);
    }

    /// Returns the number of participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryDirectory {
    async fn resolve(&self, id: ParticipantId) -> Result<Participant, DirectoryError> {
        self.participants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::NotFound { id })
    }
}

#[derive(Debug, Default)]
struct StoreState {
    messages: Vec<Message>,
    next_id: i64,
    last_sent_at: Option<DateTime<Utc>>,
}

impl StoreState {
    /// Wall-clock time, nudged forward so timestamps never repeat.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let sent_at = match self.last_sent_at {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_sent_at = Some(sent_at);
        sent_at
    }
}

/// Message store backed by a vector in append order.
#[derive(Debug)]
pub struct InMemoryMessageStore {
    sentinels: Sentinels,
    state: Mutex<StoreState>,
}

impl InMemoryMessageStore {
    /// Creates an empty store. The sentinels drive role-scoped queries.
    #[must_use]
    pub fn new(sentinels: Sentinels) -> Self {
        Self {
            sentinels,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Returns the number of stored messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    /// Returns true if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut state = self.lock();
        state.next_id += 1;
        let id = MessageId::new(state.next_id);
        let sent_at = state.next_timestamp();
        let stored = message.into_message(id, sent_at);
        state.messages.push(stored.clone());
        Ok(stored)
    }

    async fn query_by_participant_and_role(
        &self,
        participant: ParticipantId,
        scope: RoleScope,
    ) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.involves(participant))
            .filter(|m| scope.admits(&self.sentinels, m.counterpart_of(participant)))
            .cloned()
            .collect())
    }

    async fn distinct_customer_senders(&self) -> Result<Vec<ParticipantId>, StoreError> {
        let state = self.lock();
        let mut seen = HashSet::new();
        Ok(state
            .messages
            .iter()
            .map(|m| m.sender_id)
            .filter(|id| !self.sentinels.is_sentinel(*id))
            .filter(|id| seen.insert(*id))
            .collect())
    }

    async fn escalated_newest_first(&self) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .lock()
            .messages
            .iter()
            .rev()
            .filter(|m| m.forwarded_to_human)
            .cloned()
            .collect())
    }

    async fn all_ordered_by_sent_at(&self) -> Result<Vec<Message>, StoreError> {
        Ok(self.lock().messages.clone())
    }
}

/// Notifier that fans pushes out to channel subscribers.
///
/// Each subscriber gets an unbounded receiver. Closed receivers are dropped
/// on the next push to their inbox.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    subscribers: Mutex<HashMap<Inbox, Vec<mpsc::UnboundedSender<Message>>>>,
}

impl InMemoryNotifier {
    /// Creates a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to an inbox.
    pub fn subscribe(&self, inbox: Inbox) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(inbox)
            .or_default()
            .push(tx);
        rx
    }

    /// Returns how many live subscribers an inbox has.
    #[must_use]
    pub fn subscriber_count(&self, inbox: Inbox) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&inbox)
            .map(|senders| senders.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    fn publish(&self, inbox: Inbox, payload: &Message) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(senders) = subscribers.get_mut(&inbox) {
            senders.retain(|tx| tx.send(payload.clone()).is_ok());
        }
    }
}

#[async_trait]
impl RealtimeNotifier for InMemoryNotifier {
    async fn push_to_inbox(
        &self,
        participant: ParticipantId,
        payload: &Message,
    ) -> Result<(), NotifyError> {
        self.publish(Inbox::Participant(participant), payload);
        Ok(())
    }

    async fn push_to_admin_inbox(&self, payload: &Message) -> Result<(), NotifyError> {
        self.publish(Inbox::Admin, payload);
        Ok(())
    }
}
