//! Read paths over the message log.

use crate::config::Sentinels;
use crate::error::{DirectoryError, HistoryError};
use crate::message::Message;
use crate::participant::ParticipantDirectory;
use crate::store::{MessageStore, RoleScope};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use support_relay_core::ParticipantId;
use tracing::{debug, instrument, warn};

/// A participant's messages split by who was on the other end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparatedHistory {
    /// Messages exchanged with the assistant, oldest first.
    pub assistant_thread: Vec<Message>,
    /// Messages exchanged with the admin, oldest first.
    pub admin_thread: Vec<Message>,
    /// Messages exchanged with everyone else, keyed by counterpart.
    pub peer_threads: BTreeMap<ParticipantId, Vec<Message>>,
}

impl SeparatedHistory {
    /// Total number of messages across all threads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assistant_thread.len()
            + self.admin_thread.len()
            + self.peer_threads.values().map(Vec::len).sum::<usize>()
    }

    /// Returns true if the participant has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A customer as shown in the admin's conversation picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: ParticipantId,
    pub display_name: String,
    pub contact: Option<String>,
}

/// Answers history and escalation queries.
pub struct HistoryAggregator {
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn ParticipantDirectory>,
    sentinels: Sentinels,
}

impl HistoryAggregator {
    /// Creates an aggregator.
    pub fn new(
        sentinels: Sentinels,
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn ParticipantDirectory>,
    ) -> Self {
        Self {
            store,
            directory,
            sentinels,
        }
    }

    /// Splits a participant's messages into assistant, admin and peer threads.
    ///
    /// # Errors
    ///
    /// Returns `ScopeQueryFailed` naming the first scope whose query failed.
    #[instrument(skip(self))]
    pub async fn separated_history(
        &self,
        user: ParticipantId,
    ) -> support_relay_core::Result<SeparatedHistory, HistoryError> {
        let mut history = SeparatedHistory::default();
        for scope in RoleScope::ALL {
            let mut messages = self
                .store
                .query_by_participant_and_role(user, scope)
                .await
                .map_err(|e| HistoryError::ScopeQueryFailed {
                    scope,
                    reason: e.to_string(),
                })?;
            sort_oldest_first(&mut messages);
            match scope {
                RoleScope::Assistant => history.assistant_thread = messages,
                RoleScope::Admin => history.admin_thread = messages,
                RoleScope::Customer => {
                    for message in messages {
                        history
                            .peer_threads
                            .entry(message.counterpart_of(user))
                            .or_default()
                            .push(message);
                    }
                }
            }
        }

        debug!(
            assistant = history.assistant_thread.len(),
            admin = history.admin_thread.len(),
            peers = history.peer_threads.len(),
            "history assembled"
        );
        Ok(history)
    }

    /// Lists escalated messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` if the store cannot be read.
    pub async fn list_escalated(&self) -> support_relay_core::Result<Vec<Message>, HistoryError> {
        let messages = self
            .store
            .escalated_newest_first()
            .await
            .map_err(|e| HistoryError::QueryFailed {
                reason: e.to_string(),
            })?;
        Ok(messages)
    }

    /// Lists every customer who has sent at least one message.
    ///
    /// Senders the directory no longer knows are skipped.
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` if the store cannot be read and
    /// `DirectoryUnavailable` if the directory cannot be consulted.
    #[instrument(skip(self))]
    pub async fn list_customer_participants(
        &self,
    ) -> support_relay_core::Result<Vec<CustomerSummary>, HistoryError> {
        let ids = self
            .store
            .distinct_customer_senders()
            .await
            .map_err(|e| HistoryError::QueryFailed {
                reason: e.to_string(),
            })?;

        let mut customers = Vec::with_capacity(ids.len());
        for id in ids {
            match self.directory.resolve(id).await {
                Ok(participant) => customers.push(CustomerSummary {
                    id: participant.id,
                    display_name: participant.display_name,
                    contact: participant.contact,
                }),
                Err(DirectoryError::NotFound { id }) => {
                    warn!(participant_id = %id, "sender missing from directory, skipping");
                }
                Err(DirectoryError::Unavailable { reason }) => {
                    return Err(HistoryError::DirectoryUnavailable { reason }.into());
                }
            }
        }
        Ok(customers)
    }

    /// Returns every message, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` if the store cannot be read.
    pub async fn all_messages(&self) -> support_relay_core::Result<Vec<Message>, HistoryError> {
        let messages = self
            .store
            .all_ordered_by_sent_at()
            .await
            .map_err(|e| HistoryError::QueryFailed {
                reason: e.to_string(),
            })?;
        Ok(messages)
    }
}

fn sort_oldest_first(messages: &mut [Message]) {
    messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::{InMemoryDirectory, InMemoryMessageStore};
    use crate::message::NewMessage;
    use crate::participant::Participant;
    use async_trait::async_trait;

    const ASSISTANT: ParticipantId = ParticipantId::new(23);
    const ADMIN: ParticipantId = ParticipantId::new(1);
    const CUSTOMER: ParticipantId = ParticipantId::new(5);
    const PEER: ParticipantId = ParticipantId::new(9);
    const OTHER: ParticipantId = ParticipantId::new(12);

    fn sentinels() -> Sentinels {
        Sentinels::new(ASSISTANT, ADMIN)
    }

    async fn seeded(messages: Vec<NewMessage>) -> Arc<InMemoryMessageStore> {
        let store = Arc::new(InMemoryMessageStore::new(sentinels()));
        for message in messages {
            store.append(message).await.unwrap();
        }
        store
    }

    fn aggregator(store: Arc<dyn MessageStore>) -> HistoryAggregator {
        let directory = InMemoryDirectory::with_participants([
            Participant::new(CUSTOMER, "lan").with_contact("lan@example.com"),
            Participant::new(PEER, "minh"),
        ]);
        HistoryAggregator::new(sentinels(), store, Arc::new(directory))
    }

    /// Store whose admin-scoped query always fails.
    struct BrokenAdminScope(InMemoryMessageStore);

    #[async_trait]
    impl MessageStore for BrokenAdminScope {
        async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
            self.0.append(message).await
        }

        async fn query_by_participant_and_role(
            &self,
            participant: ParticipantId,
            scope: RoleScope,
        ) -> Result<Vec<Message>, StoreError> {
            if scope == RoleScope::Admin {
                return Err(StoreError::QueryFailed {
                    reason: "index offline".to_string(),
                });
            }
            self.0.query_by_participant_and_role(participant, scope).await
        }

        async fn distinct_customer_senders(&self) -> Result<Vec<ParticipantId>, StoreError> {
            self.0.distinct_customer_senders().await
        }

        async fn escalated_newest_first(&self) -> Result<Vec<Message>, StoreError> {
            self.0.escalated_newest_first().await
        }

        async fn all_ordered_by_sent_at(&self) -> Result<Vec<Message>, StoreError> {
            self.0.all_ordered_by_sent_at().await
        }
    }

    /// Directory that cannot be reached.
    struct DownDirectory;

    #[async_trait]
    impl ParticipantDirectory for DownDirectory {
        async fn resolve(&self, _id: ParticipantId) -> Result<Participant, DirectoryError> {
            Err(DirectoryError::Unavailable {
                reason: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn history_is_split_by_counterpart() {
        let store = seeded(vec![
            NewMessage::from_assistant(ASSISTANT, CUSTOMER, "how can I help", false),
            NewMessage::from_participant(ADMIN, CUSTOMER, "checking your refund"),
            NewMessage::from_participant(PEER, CUSTOMER, "hey"),
            NewMessage::from_participant(CUSTOMER, PEER, "hi back"),
        ])
        .await;

        let history = aggregator(store).separated_history(CUSTOMER).await.unwrap();

        assert_eq!(history.assistant_thread.len(), 1);
        assert_eq!(history.admin_thread.len(), 1);
        assert_eq!(history.peer_threads.len(), 1);
        let texts: Vec<_> = history
            .peer_threads[&PEER]
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, ["hey", "hi back"]);
    }

    #[tokio::test]
    async fn threads_cover_every_message_exactly_once() {
        let store = seeded(vec![
            NewMessage::from_participant(CUSTOMER, ASSISTANT, "q1"),
            NewMessage::from_assistant(ASSISTANT, CUSTOMER, "a1", true),
            NewMessage::from_participant(CUSTOMER, ADMIN, "help"),
            NewMessage::from_participant(ADMIN, CUSTOMER, "on it"),
            NewMessage::from_participant(PEER, CUSTOMER, "p1"),
            NewMessage::from_participant(CUSTOMER, OTHER, "o1"),
            NewMessage::from_participant(PEER, OTHER, "not mine"),
            NewMessage::from_participant(OTHER, ASSISTANT, "not mine either"),
        ])
        .await;
        let aggregator = aggregator(store);

        let history = aggregator.separated_history(CUSTOMER).await.unwrap();
        let touching: Vec<_> = aggregator
            .all_messages()
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.involves(CUSTOMER))
            .collect();

        let mut seen: Vec<_> = history
            .assistant_thread
            .iter()
            .chain(&history.admin_thread)
            .chain(history.peer_threads.values().flatten())
            .map(|m| m.id)
            .collect();
        seen.sort();
        let mut expected: Vec<_> = touching.iter().map(|m| m.id).collect();
        expected.sort();

        assert_eq!(seen, expected);
        assert_eq!(history.len(), 6);
        assert_eq!(
            history.peer_threads.keys().copied().collect::<Vec<_>>(),
            vec![PEER, OTHER]
        );
    }

    #[tokio::test]
    async fn unknown_participant_has_empty_history() {
        let store = seeded(vec![NewMessage::from_participant(PEER, OTHER, "hi")]).await;
        let history = aggregator(store).separated_history(CUSTOMER).await.unwrap();
        assert!(history.is_empty());
        assert!(history.peer_threads.is_empty());
    }

    #[tokio::test]
    async fn failing_scope_is_named() {
        let store = Arc::new(BrokenAdminScope(InMemoryMessageStore::new(sentinels())));
        let err = aggregator(store)
            .separated_history(CUSTOMER)
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("admin history query failed"),
            "{err}"
        );
    }

    #[tokio::test]
    async fn escalations_newest_first() {
        let store = seeded(vec![
            NewMessage::from_assistant(ASSISTANT, CUSTOMER, "first", true),
            NewMessage::from_assistant(ASSISTANT, PEER, "plain", false),
            NewMessage::from_assistant(ASSISTANT, PEER, "second", true),
        ])
        .await;

        let escalated = aggregator(store).list_escalated().await.unwrap();
        let texts: Vec<_> = escalated.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["second", "first"]);
    }

    #[tokio::test]
    async fn customers_are_resolved_and_unknown_ones_skipped() {
        let store = seeded(vec![
            NewMessage::from_participant(PEER, ASSISTANT, "a"),
            NewMessage::from_participant(ParticipantId::new(404), ASSISTANT, "ghost"),
            NewMessage::from_participant(CUSTOMER, ADMIN, "b"),
            NewMessage::from_participant(ADMIN, CUSTOMER, "c"),
            NewMessage::from_participant(PEER, CUSTOMER, "d"),
        ])
        .await;

        let customers = aggregator(store)
            .list_customer_participants()
            .await
            .unwrap();

        assert_eq!(
            customers,
            vec![
                CustomerSummary {
                    id: PEER,
                    display_name: "minh".to_string(),
                    contact: None,
                },
                CustomerSummary {
                    id: CUSTOMER,
                    display_name: "lan".to_string(),
                    contact: Some("lan@example.com".to_string()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn customer_listing_fails_when_directory_is_down() {
        let store = seeded(vec![NewMessage::from_participant(PEER, ASSISTANT, "a")]).await;
        let aggregator = HistoryAggregator::new(sentinels(), store, Arc::new(DownDirectory));

        let err = aggregator.list_customer_participants().await.unwrap_err();
        assert!(err.to_string().contains("connection refused"), "{err}");
    }

    #[tokio::test]
    async fn history_serializes_peer_keys() {
        let store = seeded(vec![NewMessage::from_participant(PEER, CUSTOMER, "hey")]).await;
        let history = aggregator(store).separated_history(CUSTOMER).await.unwrap();

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["assistantThread"], serde_json::json!([]));
        assert_eq!(json["peerThreads"]["9"][0]["message"], "hey");
    }
}
