use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Per-user conversational state carried between turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub last_appointment_id: Option<String>,
    /// Free-form patient attributes. Stored, not interpreted.
    #[serde(default)]
    pub patient_profile: HashMap<String, String>,
    pub created_at: NaiveDateTime,
    pub last_activity: NaiveDateTime,
}

impl Session {
    pub fn new(user_id: &str) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            user_id: user_id.to_string(),
            last_appointment_id: None,
            patient_profile: HashMap::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = chrono::Utc::now().naive_utc();
    }
}
