// libs/chat-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// CONVERSATION MODELS
// ==============================================================================

/// Where a sender currently is in the booking conversation.
///
/// Persisted as a snake_case string. `Unknown` is the parse fallback for a
/// stored value no variant matches; it is never written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatState {
    #[default]
    Start,
    Menu,
    ChoosingSpecialty,
    ChoosingDoctor,
    ChoosingSlot,
    Cancelling,
    Unknown,
}

impl ChatState {
    pub fn parse(value: &str) -> Self {
        match value {
            "start" => ChatState::Start,
            "menu" => ChatState::Menu,
            "choosing_specialty" => ChatState::ChoosingSpecialty,
            "choosing_doctor" => ChatState::ChoosingDoctor,
            "choosing_slot" => ChatState::ChoosingSlot,
            "cancelling" => ChatState::Cancelling,
            _ => ChatState::Unknown,
        }
    }
}

impl fmt::Display for ChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatState::Start => write!(f, "start"),
            ChatState::Menu => write!(f, "menu"),
            ChatState::ChoosingSpecialty => write!(f, "choosing_specialty"),
            ChatState::ChoosingDoctor => write!(f, "choosing_doctor"),
            ChatState::ChoosingSlot => write!(f, "choosing_slot"),
            ChatState::Cancelling => write!(f, "cancelling"),
            ChatState::Unknown => write!(f, "unknown"),
        }
    }
}

/// One record per sender address, last-write-wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationRecord {
    pub state: ChatState,
    pub specialty: Option<String>,
    pub doctor: Option<String>,
}

impl ConversationRecord {
    /// Fresh record at the main menu, context discarded.
    pub fn menu() -> Self {
        Self {
            state: ChatState::Menu,
            specialty: None,
            doctor: None,
        }
    }
}

/// Partial update for `ConversationStore::merge`; only set fields are written.
#[derive(Debug, Clone, Default)]
pub struct ConversationPatch {
    pub state: Option<ChatState>,
    pub specialty: Option<String>,
    pub doctor: Option<String>,
}

impl ConversationPatch {
    pub fn state(state: ChatState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn with_specialty(mut self, specialty: &str) -> Self {
        self.specialty = Some(specialty.to_string());
        self
    }

    pub fn with_doctor(mut self, doctor: &str) -> Self {
        self.doctor = Some(doctor.to_string());
        self
    }
}

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: String,
    pub specialty: String,
    pub doctor: String,
    pub day: String,
    pub time: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Booking request before the store assigns id/status/timestamp.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub user_id: String,
    pub specialty: String,
    pub doctor: String,
    pub day: String,
    pub time: String,
}

// ==============================================================================
// TRANSPORT MODELS
// ==============================================================================

/// Twilio posts the webhook as a urlencoded form with capitalized field names.
/// `Body` can be absent for non-text messages (media), so it defaults empty.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "From")]
    pub from: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

/// User mistakes are replies, not errors; only store faults surface here.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}
