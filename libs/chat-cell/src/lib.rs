// libs/chat-cell/src/lib.rs
//! # Chat Cell
//!
//! WhatsApp appointment-booking conversation cell. An inbound Twilio webhook
//! message is routed through a per-sender state machine that lets the user
//! book a specialty/doctor/time-slot appointment or cancel an existing one.
//!
//! The cell follows the established cell architecture pattern:
//!
//! ```text
//! handlers.rs   | Twilio webhook handler
//! router.rs     | Route definitions + cell state
//! models.rs     | Conversation and appointment records
//! catalog.rs    | Static specialties/doctors/slots reference data
//! twiml.rs      | TwiML reply document rendering
//! services/     | Conversation engine + store boundary
//! ```

pub mod catalog;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod twiml;

// Re-export commonly used types
pub use catalog::Catalog;
pub use models::{
    Appointment, AppointmentStatus, ChatError, ChatState, ConversationPatch,
    ConversationRecord, IncomingMessage, NewAppointment,
};
pub use router::chat_routes;
pub use services::engine::ConversationEngine;
