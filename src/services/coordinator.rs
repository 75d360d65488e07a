use serde::Serialize;

use crate::models::{Intent, Outcome, RequestAttributes};
use crate::services::classifier::IntentClassifier;
use crate::services::formatter;
use crate::services::scheduling::Scheduler;
use crate::services::session::SessionStore;

pub const CLARIFICATION_MESSAGE: &str =
    "I'm not sure if you want to book, reschedule, or cancel. Could you please clarify?";

/// Everything that happened during one message, for callers that need more
/// than the reply text.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub intent: Intent,
    pub attributes: RequestAttributes,
    /// Absent when the request was sent back for clarification.
    pub outcome: Option<Outcome>,
    pub reply: String,
}

/// Owns the session table and sequences classifier, scheduler and formatter
/// for each incoming message.
pub struct Coordinator {
    sessions: SessionStore,
    classifier: Box<dyn IntentClassifier>,
    scheduler: Scheduler,
}

impl Coordinator {
    pub fn new(
        sessions: SessionStore,
        classifier: Box<dyn IntentClassifier>,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            sessions,
            classifier,
            scheduler,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub async fn handle_message(&self, user_id: &str, message: &str) -> String {
        self.handle_turn(user_id, message).await.reply
    }

    pub async fn handle_turn(&self, user_id: &str, message: &str) -> Turn {
        // Held for the whole turn: one user's messages never interleave.
        let handle = self.sessions.get_or_create(user_id);
        let mut session = handle.lock().await;
        self.sessions.refresh_if_expired(&mut session);
        session.touch();

        let classification = self.classifier.classify(message, &session).await;
        let intent = classification.intent;
        let attributes = classification.attributes;

        tracing::info!(
            user = user_id,
            intent = intent.as_str(),
            department = attributes.department.as_str(),
            time_of_day = attributes.time_of_day.as_str(),
            "processing message"
        );

        let outcome = match intent {
            Intent::Book => self.scheduler.book(user_id, &attributes),
            Intent::Reschedule => self.scheduler.reschedule(user_id, &attributes, &session),
            Intent::Cancel => self.scheduler.cancel(user_id, &session),
            Intent::Unknown => {
                return Turn {
                    intent,
                    attributes,
                    outcome: None,
                    reply: CLARIFICATION_MESSAGE.to_string(),
                };
            }
        };

        if let Some(id) = &outcome.appointment_id {
            session.last_appointment_id = Some(id.clone());
        }

        if !outcome.success {
            tracing::info!(
                user = user_id,
                failure = outcome.failure.map(|f| f.as_str()),
                "request not fulfilled"
            );
        }

        let reply = formatter::render(intent, &attributes, &outcome);

        Turn {
            intent,
            attributes,
            outcome: Some(outcome),
            reply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, FailureKind, SlotCatalog, TimeOfDay};
    use crate::services::calendar::CalendarMode;
    use crate::services::classifier::KeywordClassifier;
    use crate::services::store::MemoryStore;

    fn coordinator() -> Coordinator {
        let catalog = SlotCatalog::builtin().unwrap();
        Coordinator::new(
            SessionStore::default(),
            Box::new(KeywordClassifier::new()),
            Scheduler::new(Box::new(MemoryStore::new(catalog.slots)), CalendarMode::ByAppointment),
        )
    }

    #[tokio::test]
    async fn test_unknown_intent_asks_for_clarification() {
        let coordinator = coordinator();
        let turn = coordinator.handle_turn("alice", "hello there").await;

        assert_eq!(turn.intent, Intent::Unknown);
        assert!(turn.outcome.is_none());
        assert_eq!(turn.reply, CLARIFICATION_MESSAGE);
        assert!(coordinator.scheduler().slots().unwrap().iter().all(|s| !s.booked));

        // The session still exists after a clarification turn.
        let session = coordinator.sessions().snapshot("alice").await.unwrap();
        assert!(session.last_appointment_id.is_none());
    }

    #[tokio::test]
    async fn test_booking_records_appointment_in_session() {
        let coordinator = coordinator();
        let turn = coordinator
            .handle_turn("alice", "I need a cardiology appointment in the evening")
            .await;

        assert_eq!(turn.intent, Intent::Book);
        assert_eq!(turn.attributes.department, Department::Cardiology);
        assert_eq!(turn.attributes.time_of_day, TimeOfDay::Evening);
        let outcome = turn.outcome.unwrap();
        assert!(outcome.success);

        let session = coordinator.sessions().snapshot("alice").await.unwrap();
        assert_eq!(session.last_appointment_id, outcome.appointment_id);
    }

    #[tokio::test]
    async fn test_failed_booking_leaves_session_untouched() {
        let coordinator = coordinator();
        let turn = coordinator.handle_turn("alice", "book an ENT appointment").await;

        let outcome = turn.outcome.unwrap();
        assert_eq!(outcome.failure, Some(FailureKind::NoSlots));
        assert_eq!(turn.reply, "No available slots found for ENT in the any.");

        let session = coordinator.sessions().snapshot("alice").await.unwrap();
        assert!(session.last_appointment_id.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_per_user() {
        let coordinator = coordinator();
        coordinator
            .handle_message("alice", "I need a cardiology appointment in the evening")
            .await;

        let reply = coordinator.handle_message("bob", "Cancel my appointment").await;
        assert_eq!(reply, "I couldn't find a previous appointment to cancel.");
    }
}
