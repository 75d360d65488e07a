use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Classification, Department, Intent, RequestAttributes, Session, TimeOfDay};
use crate::services::ai::{ChatMessage, LlmProvider};

use super::IntentClassifier;

const SYSTEM_PROMPT: &str = r#"You are the intent extraction engine for a clinic appointment assistant. Read the patient's message and classify it.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "intent": "book|reschedule|cancel|unknown",
  "department": "General|Cardiology|Dermatology|ENT",
  "time_of_day": "morning|afternoon|evening|any"
}

Rules:
- "book": the patient wants a new appointment
- "reschedule": the patient wants to move an existing appointment
- "cancel": the patient wants to cancel an existing appointment
- "unknown": anything else
- department: heart problems are Cardiology, skin problems are Dermatology, ear/nose/throat problems are ENT, otherwise General
- time_of_day: "any" unless the patient states a preference; "after 5" means evening
"#;

/// Model-backed classifier. Transport and parse failures degrade to `unknown`.
pub struct LlmClassifier {
    llm: Box<dyn LlmProvider>,
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    intent: String,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    time_of_day: Option<String>,
}

impl LlmClassifier {
    pub fn new(llm: Box<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    async fn classify(&self, text: &str, session: &Session) -> Classification {
        let context = match session.last_appointment_id {
            Some(_) => "The patient already holds an appointment.",
            None => "The patient has no appointment on record.",
        };
        let messages = [
            ChatMessage::system(format!("{SYSTEM_PROMPT}\nContext: {context}")),
            ChatMessage::user(text),
        ];

        match self.llm.complete_json(&messages).await {
            Ok(response) => parse_classification(&response),
            Err(e) => {
                tracing::warn!(error = %e, "LLM classification failed, treating as unknown");
                Classification::unknown()
            }
        }
    }
}

fn parse_classification(response: &str) -> Classification {
    let Some(raw) = extract_json(response) else {
        tracing::warn!("failed to parse LLM response as classification JSON");
        return Classification::unknown();
    };

    // Out-of-vocabulary values fall back to defaults instead of leaking through.
    let department = raw
        .department
        .as_deref()
        .and_then(Department::from_name)
        .unwrap_or_default();
    let time_of_day = raw
        .time_of_day
        .as_deref()
        .and_then(TimeOfDay::from_name)
        .unwrap_or_default();

    Classification {
        intent: Intent::parse(&raw.intent),
        attributes: RequestAttributes {
            department,
            time_of_day,
        },
    }
}

fn extract_json(response: &str) -> Option<RawClassification> {
    if let Ok(raw) = serde_json::from_str::<RawClassification>(response) {
        return Some(raw);
    }

    // Strip markdown code fences
    let trimmed = response.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(raw) = serde_json::from_str::<RawClassification>(cleaned) {
        return Some(raw);
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<RawClassification>(&cleaned[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct ScriptedLlm {
        reply: Option<String>,
        seen: Arc<Mutex<Vec<ChatMessage>>>,
    }

    impl ScriptedLlm {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                seen: Arc::new(Mutex::new(vec![])),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                seen: Arc::new(Mutex::new(vec![])),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn complete_json(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            self.reply
                .clone()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    #[test]
    fn test_parse_valid_json() {
        let c = parse_classification(
            r#"{"intent":"book","department":"Cardiology","time_of_day":"evening"}"#,
        );
        assert_eq!(c.intent, Intent::Book);
        assert_eq!(c.attributes.department, Department::Cardiology);
        assert_eq!(c.attributes.time_of_day, TimeOfDay::Evening);
    }

    #[test]
    fn test_parse_markdown_fenced_json() {
        let c = parse_classification(
            "```json\n{\"intent\":\"cancel\",\"department\":null,\"time_of_day\":null}\n```",
        );
        assert_eq!(c.intent, Intent::Cancel);
        assert_eq!(c.attributes, RequestAttributes::default());
    }

    #[test]
    fn test_parse_embedded_json() {
        let c = parse_classification(
            r#"Sure! {"intent":"reschedule","department":"ent","time_of_day":"morning"} Hope that helps."#,
        );
        assert_eq!(c.intent, Intent::Reschedule);
        assert_eq!(c.attributes.department, Department::Ent);
        assert_eq!(c.attributes.time_of_day, TimeOfDay::Morning);
    }

    #[test]
    fn test_parse_unrecognised_values_fall_back() {
        let c = parse_classification(
            r#"{"intent":"confirm","department":"Podiatry","time_of_day":"midnight"}"#,
        );
        assert_eq!(c, Classification::unknown());
    }

    #[test]
    fn test_parse_garbage_is_unknown() {
        assert_eq!(
            parse_classification("I don't understand the format you want"),
            Classification::unknown()
        );
    }

    #[tokio::test]
    async fn test_prompt_carries_message_and_context() {
        let llm = ScriptedLlm::replying(r#"{"intent":"cancel"}"#);
        let seen = Arc::clone(&llm.seen);
        let classifier = LlmClassifier::new(Box::new(llm));
        let mut session = Session::new("alice");
        session.last_appointment_id = Some("appt-1".to_string());

        let c = classifier.classify("drop it", &session).await;
        assert_eq!(c.intent, Intent::Cancel);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, "system");
        assert!(seen[0].content.contains("already holds an appointment"));
        assert_eq!(seen[1], ChatMessage::user("drop it"));
    }

    #[tokio::test]
    async fn test_provider_error_is_unknown() {
        let classifier = LlmClassifier::new(Box::new(ScriptedLlm::failing()));
        let c = classifier.classify("book me in", &Session::new("bob")).await;
        assert_eq!(c, Classification::unknown());
    }
}
