use async_trait::async_trait;

use crate::models::{Classification, Department, Intent, RequestAttributes, Session, TimeOfDay};

use super::IntentClassifier;

const BOOK_PHRASES: &[&str] = &["book", "appointment", "schedule", "see a doctor"];
const ENT_WORDS: &[&str] = &["ent", "ear", "ears", "nose", "throat"];

/// Keyword heuristics. Deterministic and stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_text(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        Classification {
            intent: detect_intent(&lower),
            attributes: RequestAttributes {
                department: detect_department(&lower, &words),
                time_of_day: detect_time_of_day(&lower),
            },
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str, _session: &Session) -> Classification {
        self.classify_text(text)
    }
}

// "reschedule" contains "schedule" and most requests mention "appointment",
// so the specific intents are checked before booking.
fn detect_intent(lower: &str) -> Intent {
    if lower.contains("reschedule") || lower.contains("change") {
        Intent::Reschedule
    } else if lower.contains("cancel") {
        Intent::Cancel
    } else if BOOK_PHRASES.iter().any(|p| lower.contains(p)) {
        Intent::Book
    } else {
        Intent::Unknown
    }
}

// Stems match anywhere ("echocardiogram"); ENT words must stand alone.
fn detect_department(lower: &str, words: &[&str]) -> Department {
    if lower.contains("cardio") || lower.contains("heart") {
        Department::Cardiology
    } else if lower.contains("skin") || lower.contains("derma") {
        Department::Dermatology
    } else if words.iter().any(|w| ENT_WORDS.contains(w)) {
        Department::Ent
    } else {
        Department::General
    }
}

fn detect_time_of_day(lower: &str) -> TimeOfDay {
    if lower.contains("morning") {
        TimeOfDay::Morning
    } else if lower.contains("afternoon") {
        TimeOfDay::Afternoon
    } else if lower.contains("evening") || lower.contains("after 5") {
        TimeOfDay::Evening
    } else {
        TimeOfDay::Any
    }
}
