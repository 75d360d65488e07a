pub mod keyword;
pub mod llm;

use async_trait::async_trait;

use crate::models::{Classification, Session};

pub use keyword::KeywordClassifier;
pub use llm::LlmClassifier;

/// Maps a raw message to an intent and request attributes.
///
/// Implementations are total: anything they cannot make sense of comes back
/// as [`Intent::Unknown`](crate::models::Intent::Unknown) with default attributes.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str, session: &Session) -> Classification;
}
