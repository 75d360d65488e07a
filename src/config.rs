use std::env;

use crate::services::calendar::CalendarMode;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifierKind {
    Keyword,
    Ollama,
    Groq,
}

impl ClassifierKind {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "ollama" => ClassifierKind::Ollama,
            "groq" => ClassifierKind::Groq,
            _ => ClassifierKind::Keyword,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    /// Empty or `:memory:` keeps slots and appointments in process memory.
    pub database_url: String,
    pub slots_file: Option<String>,
    pub clinic_name: String,
    pub classifier: ClassifierKind,
    pub ollama_url: String,
    pub ollama_model: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub calendar_mode: CalendarMode,
    pub session_ttl_minutes: Option<i64>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_default(),
            slots_file: env::var("SLOTS_FILE").ok().filter(|v| !v.is_empty()),
            clinic_name: env::var("CLINIC_NAME").unwrap_or_else(|_| "CareFlow".to_string()),
            classifier: ClassifierKind::parse(&env::var("CLASSIFIER").unwrap_or_default()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            groq_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
            calendar_mode: CalendarMode::parse(&env::var("CALENDAR_MODE").unwrap_or_default()),
            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m: &i64| *m > 0),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: String::new(),
            slots_file: None,
            clinic_name: "CareFlow".to_string(),
            classifier: ClassifierKind::Keyword,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            groq_api_key: String::new(),
            groq_model: "llama-3.1-8b-instant".to_string(),
            calendar_mode: CalendarMode::ByAppointment,
            session_ttl_minutes: None,
        }
    }
}
