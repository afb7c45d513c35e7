pub mod appointment_store;
pub mod conversation_store;
pub mod engine;
pub mod memory;

pub use appointment_store::{AppointmentStore, BookingOutcome, SupabaseAppointmentStore};
pub use conversation_store::{ConversationStore, SupabaseConversationStore};
pub use engine::ConversationEngine;
pub use memory::{InMemoryAppointmentStore, InMemoryConversationStore};
