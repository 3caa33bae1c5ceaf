use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::dto::{ActiveMessage, Invocation, NewRecord, Outcome, TriggerStatus};
use super::entity::problem_message::RecordStatus;
use super::messenger::Messenger;
use super::store::MessageStore;

/// Prefix of the companion key resolved alongside every matched problem.
///
/// Older deployments stored the opening record under `PROBLEM_<problem_key>`.
/// Nothing writes that key anymore, and resolving it is a no-op unless such a
/// row survives in an existing database.
pub const LEGACY_PROBLEM_PREFIX: &str = "PROBLEM_";

/// Correlates monitoring events with the chat messages that announce them.
///
/// Storage failures never abort an invocation: reads degrade to "not found"
/// and writes are logged and dropped, since the chat action they follow has
/// already happened.
pub struct MessageCorrelator {
    store: Arc<dyn MessageStore>,
    messenger: Arc<dyn Messenger>,
    send_resolution_notice: bool,
}

impl MessageCorrelator {
    pub fn new(store: Arc<dyn MessageStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            store,
            messenger,
            send_resolution_notice: true,
        }
    }

    /// Whether a resolve event with no active message posts its text anyway.
    pub fn with_resolution_notice(mut self, enabled: bool) -> Self {
        self.send_resolution_notice = enabled;
        self
    }

    /// 이벤트 한 건을 처리합니다.
    #[instrument(
        skip(self, invocation),
        fields(
            event_id = %invocation.event_id,
            problem_key = %invocation.problem_key,
            status = %invocation.status
        )
    )]
    pub async fn handle(&self, invocation: &Invocation) -> Outcome {
        match invocation.status {
            TriggerStatus::Opened => self.handle_opened(invocation).await,
            TriggerStatus::Resolved => self.handle_resolved(invocation).await,
        }
    }

    async fn handle_opened(&self, invocation: &Invocation) -> Outcome {
        let Some(message_id) = self.send_notification(&invocation.message_text).await else {
            return Outcome::SendFailed {
                event_id: invocation.event_id.clone(),
            };
        };

        self.record_mapping(
            &invocation.event_id,
            message_id,
            &invocation.problem_key,
            RecordStatus::Active,
        )
        .await;

        Outcome::Sent {
            event_id: invocation.event_id.clone(),
            message_id,
        }
    }

    async fn handle_resolved(&self, invocation: &Invocation) -> Outcome {
        let problem_key = &invocation.problem_key;

        match self.find_active_message(problem_key).await {
            Some(active) => {
                let deleted = self.retract_notification(active.message_id).await;

                // resolve whatever the delete outcome was
                self.mark_resolved(&active.event_id).await;
                if active.event_id != invocation.event_id {
                    self.mark_resolved(&invocation.event_id).await;
                }
                self.mark_resolved(&format!("{}{}", LEGACY_PROBLEM_PREFIX, problem_key))
                    .await;

                if deleted {
                    Outcome::Deleted {
                        problem_key: problem_key.clone(),
                        message_id: active.message_id,
                    }
                } else {
                    Outcome::DeleteFailed {
                        problem_key: problem_key.clone(),
                        message_id: active.message_id,
                    }
                }
            }
            None => {
                warn!("No active problem message found");

                if !self.send_resolution_notice {
                    return Outcome::NoActiveMessage {
                        problem_key: problem_key.clone(),
                    };
                }

                match self.send_notification(&invocation.message_text).await {
                    Some(message_id) => {
                        self.record_mapping(
                            &invocation.event_id,
                            message_id,
                            problem_key,
                            RecordStatus::Resolved,
                        )
                        .await;
                        Outcome::ResolutionNoticeSent {
                            problem_key: problem_key.clone(),
                            message_id,
                        }
                    }
                    None => Outcome::ResolutionNoticeFailed {
                        problem_key: problem_key.clone(),
                    },
                }
            }
        }
    }

    /// Persist (or replace) the record keyed by `event_id`.
    pub async fn record_mapping(
        &self,
        event_id: &str,
        message_id: i64,
        problem_key: &str,
        status: RecordStatus,
    ) {
        let record = NewRecord {
            event_id: event_id.to_string(),
            message_id: Some(message_id),
            problem_key: problem_key.to_string(),
            status,
        };

        match self.store.upsert(record).await {
            Ok(()) => info!(event_id, message_id, ?status, "Saved message mapping"),
            Err(e) => error!(error = %e, event_id, message_id, "Failed to save message mapping"),
        }
    }

    /// Most recent active message for `problem_key`; storage errors read as none.
    pub async fn find_active_message(&self, problem_key: &str) -> Option<ActiveMessage> {
        match self.store.query_latest_active(problem_key).await {
            Ok(found) => found,
            Err(e) => {
                error!(error = %e, problem_key, "Failed to get active problem message");
                None
            }
        }
    }

    pub async fn mark_resolved(&self, event_id: &str) {
        match self
            .store
            .update_status(event_id, RecordStatus::Resolved)
            .await
        {
            Ok(true) => info!(event_id, "Updated message status to resolved"),
            Ok(false) => info!(event_id, "No stored message to resolve"),
            Err(e) => error!(error = %e, event_id, "Failed to update message status"),
        }
    }

    /// Post `text`; `None` on any endpoint failure.
    pub async fn send_notification(&self, text: &str) -> Option<i64> {
        match self.messenger.send(text).await {
            Ok(message_id) => Some(message_id),
            Err(e) => {
                error!(error = %e, "Failed to send message");
                None
            }
        }
    }

    pub async fn retract_notification(&self, message_id: i64) -> bool {
        match self.messenger.delete(message_id).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, message_id, "Failed to delete message");
                false
            }
        }
    }
}
