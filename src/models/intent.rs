use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Book,
    Reschedule,
    Cancel,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Book => "book",
            Intent::Reschedule => "reschedule",
            Intent::Cancel => "cancel",
            Intent::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "book" => Intent::Book,
            "reschedule" => Intent::Reschedule,
            "cancel" => Intent::Cancel,
            _ => Intent::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Department {
    #[default]
    General,
    Cardiology,
    Dermatology,
    #[serde(rename = "ENT")]
    Ent,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::General => "General",
            Department::Cardiology => "Cardiology",
            Department::Dermatology => "Dermatology",
            Department::Ent => "ENT",
        }
    }

    /// Strict parse used when loading catalogues.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "general" => Some(Department::General),
            "cardiology" => Some(Department::Cardiology),
            "dermatology" => Some(Department::Dermatology),
            "ent" => Some(Department::Ent),
            _ => None,
        }
    }

    /// General accepts every department.
    pub fn matches(&self, slot_department: Department) -> bool {
        *self == Department::General || *self == slot_department
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    #[default]
    Any,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Any => "any",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Some(TimeOfDay::Morning),
            "afternoon" => Some(TimeOfDay::Afternoon),
            "evening" => Some(TimeOfDay::Evening),
            "any" => Some(TimeOfDay::Any),
            _ => None,
        }
    }

    pub fn matches(&self, slot_bucket: TimeOfDay) -> bool {
        *self == TimeOfDay::Any || *self == slot_bucket
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured request extracted from a single message. Lives for one turn.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestAttributes {
    #[serde(default)]
    pub department: Department,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub attributes: RequestAttributes,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            attributes: RequestAttributes::default(),
        }
    }
}
