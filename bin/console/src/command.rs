//! Newline-delimited JSON commands and their execution.
//!
//! Each input line is one command object tagged by `op`. Each command yields
//! one response line `{"ok": true, "result": ...}` or
//! `{"ok": false, "error": "..."}`. Realtime pushes are written as
//! `{"event": "inbox", ...}` lines on the same output.

use crate::config::ConsoleConfig;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use support_relay_assistant::AssistantGateway;
use support_relay_conversation::{
    AssistantOutcome, ConversationRouter, HistoryAggregator, InMemoryDirectory,
    InMemoryMessageStore, InMemoryNotifier, Inbox, Participant, SendReceipt,
};
use support_relay_core::ParticipantId;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A console command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Adds a participant and starts forwarding their inbox.
    Register {
        id: ParticipantId,
        display_name: String,
        #[serde(default)]
        contact: Option<String>,
    },
    /// Sends a message.
    Send {
        sender: ParticipantId,
        receiver: ParticipantId,
        text: String,
    },
    /// Shows a participant's separated history.
    History { user: ParticipantId },
    /// Lists escalated messages.
    Escalated,
    /// Lists customers who have written in.
    Customers,
    /// Dumps the whole message log.
    Log,
}

/// Executes commands against in-memory adapters.
pub struct Console {
    directory: Arc<InMemoryDirectory>,
    notifier: Arc<InMemoryNotifier>,
    router: ConversationRouter,
    history: HistoryAggregator,
    output: mpsc::UnboundedSender<JsonValue>,
}

impl Console {
    /// Wires the adapters and seeds the directory with the two sentinels.
    ///
    /// Must be called inside a Tokio runtime. The admin inbox is forwarded
    /// to `output` from the start.
    pub fn new(
        config: &ConsoleConfig,
        gateway: Arc<dyn AssistantGateway>,
        output: mpsc::UnboundedSender<JsonValue>,
    ) -> Self {
        let sentinels = config.routing.sentinels();
        let directory = Arc::new(InMemoryDirectory::with_participants([
            Participant::new(sentinels.assistant, config.assistant_name.clone()),
            Participant::new(sentinels.admin, config.admin_name.clone()),
        ]));
        let store = Arc::new(InMemoryMessageStore::new(sentinels));
        let notifier = Arc::new(InMemoryNotifier::new());

        let router = ConversationRouter::new(
            &config.routing,
            directory.clone(),
            store.clone(),
            gateway,
            notifier.clone(),
        );
        let history = HistoryAggregator::new(sentinels, store, directory.clone());

        let console = Self {
            directory,
            notifier,
            router,
            history,
            output,
        };
        console.forward(Inbox::Admin);
        console
    }

    /// Parses and executes one input line.
    pub async fn execute_line(&self, line: &str) -> JsonValue {
        match serde_json::from_str::<Command>(line) {
            Ok(command) => self.execute(command).await,
            Err(e) => failure(format!("invalid command: {e}")),
        }
    }

    /// Executes a command and returns its response.
    pub async fn execute(&self, command: Command) -> JsonValue {
        debug!(?command, "executing command");
        match command {
            Command::Register {
                id,
                display_name,
                contact,
            } => {
                let mut participant = Participant::new(id, display_name);
                if let Some(contact) = contact {
                    participant = participant.with_contact(contact);
                }
                let first_time = self.notifier.subscriber_count(Inbox::Participant(id)) == 0;
                self.directory.insert(participant.clone());
                if first_time {
                    self.forward(Inbox::Participant(id));
                }
                success(json!(participant))
            }
            Command::Send {
                sender,
                receiver,
                text,
            } => match self.router.send_with_outcome(sender, receiver, &text).await {
                Ok(receipt) => success(receipt_json(&receipt)),
                Err(e) => failure(e.to_string()),
            },
            Command::History { user } => match self.history.separated_history(user).await {
                Ok(history) => success(json!(history)),
                Err(e) => failure(e.to_string()),
            },
            Command::Escalated => match self.history.list_escalated().await {
                Ok(messages) => success(json!(messages)),
                Err(e) => failure(e.to_string()),
            },
            Command::Customers => match self.history.list_customer_participants().await {
                Ok(customers) => success(json!(customers)),
                Err(e) => failure(e.to_string()),
            },
            Command::Log => match self.history.all_messages().await {
                Ok(messages) => success(json!(messages)),
                Err(e) => failure(e.to_string()),
            },
        }
    }

    /// Copies every push to `inbox` onto the output as an event line.
    fn forward(&self, inbox: Inbox) {
        let mut pushes = self.notifier.subscribe(inbox);
        let output = self.output.clone();
        tokio::spawn(async move {
            while let Some(message) = pushes.recv().await {
                let event = json!({
                    "event": "inbox",
                    "inbox": inbox.destination(),
                    "message": message,
                });
                if output.send(event).is_err() {
                    warn!(%inbox, "output closed, no longer forwarding");
                    break;
                }
            }
        });
    }
}

fn success(result: JsonValue) -> JsonValue {
    json!({ "ok": true, "result": result })
}

fn failure(error: String) -> JsonValue {
    json!({ "ok": false, "error": error })
}

fn receipt_json(receipt: &SendReceipt) -> JsonValue {
    let assistant = receipt.assistant.as_ref().map(|outcome| match outcome {
        AssistantOutcome::Replied {
            reply,
            escalated,
            delivery,
        } => json!({
            "status": "replied",
            "reply": reply,
            "escalated": escalated,
            "delivery": delivery,
        }),
        AssistantOutcome::FellBack {
            reason,
            fallback,
            delivery,
        } => json!({
            "status": "fell_back",
            "reason": reason.to_string(),
            "fallback": fallback,
            "delivery": delivery,
        }),
        AssistantOutcome::Abandoned { reason, error } => json!({
            "status": "abandoned",
            "reason": reason.to_string(),
            "error": error.to_string(),
        }),
    });
    json!({ "message": receipt.message, "assistant": assistant })
}
