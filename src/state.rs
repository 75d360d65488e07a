use chrono::Duration;

use crate::config::{AppConfig, ClassifierKind};
use crate::models::SlotCatalog;
use crate::services::ai::groq::GroqProvider;
use crate::services::ai::ollama::OllamaProvider;
use crate::services::classifier::{IntentClassifier, KeywordClassifier, LlmClassifier};
use crate::services::coordinator::Coordinator;
use crate::services::scheduling::Scheduler;
use crate::services::session::SessionStore;
use crate::services::store;

pub struct AppState {
    pub config: AppConfig,
    pub coordinator: Coordinator,
}

impl AppState {
    /// Wires the store, classifier and scheduler described by `config`.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let catalog = SlotCatalog::load(config.slots_file.as_deref())?;
        let slot_store = store::open(&config.database_url, catalog.slots)?;
        let scheduler = Scheduler::new(slot_store, config.calendar_mode);
        let idle_ttl = config
            .session_ttl_minutes
            .map(|minutes| {
                Duration::try_minutes(minutes)
                    .ok_or_else(|| anyhow::anyhow!("SESSION_TTL_MINUTES out of range: {minutes}"))
            })
            .transpose()?;
        let sessions = SessionStore::new(idle_ttl);
        let classifier = build_classifier(&config)?;

        Ok(Self {
            coordinator: Coordinator::new(sessions, classifier, scheduler),
            config,
        })
    }
}

fn build_classifier(config: &AppConfig) -> anyhow::Result<Box<dyn IntentClassifier>> {
    let classifier: Box<dyn IntentClassifier> = match config.classifier {
        ClassifierKind::Groq => {
            anyhow::ensure!(
                !config.groq_api_key.is_empty(),
                "GROQ_API_KEY must be set when CLASSIFIER=groq"
            );
            tracing::info!("using Groq classifier (model: {})", config.groq_model);
            Box::new(LlmClassifier::new(Box::new(GroqProvider::new(
                config.groq_api_key.clone(),
                config.groq_model.clone(),
            ))))
        }
        ClassifierKind::Ollama => {
            tracing::info!("using Ollama classifier (url: {})", config.ollama_url);
            Box::new(LlmClassifier::new(Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            ))))
        }
        ClassifierKind::Keyword => {
            tracing::info!("using keyword classifier");
            Box::new(KeywordClassifier::new())
        }
    };
    Ok(classifier)
}
