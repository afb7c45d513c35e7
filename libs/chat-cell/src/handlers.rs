// libs/chat-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Form};
use tracing::debug;

use shared_database::supabase::SupabaseClient;
use shared_models::error::AppError;

use crate::models::{ChatError, IncomingMessage};
use crate::router::ChatCellState;
use crate::services::appointment_store::SupabaseAppointmentStore;
use crate::services::conversation_store::SupabaseConversationStore;
use crate::services::engine::ConversationEngine;
use crate::twiml::TwimlMessage;

/// Twilio WhatsApp webhook. Every handled message produces exactly one TwiML
/// reply; a store fault aborts the exchange without one and the sender's next
/// "hola" re-synchronizes the conversation.
#[axum::debug_handler]
pub async fn whatsapp_webhook(
    State(state): State<ChatCellState>,
    Form(message): Form<IncomingMessage>,
) -> Result<TwimlMessage, AppError> {
    debug!(from = %message.from, "inbound WhatsApp message");

    let supabase = Arc::new(SupabaseClient::new(&state.config));
    let engine = ConversationEngine::new(
        state.catalog.clone(),
        SupabaseConversationStore::new(supabase.clone()),
        SupabaseAppointmentStore::new(supabase),
    );

    let reply = engine
        .handle(&message.from, &message.body)
        .await
        .map_err(|e| match e {
            ChatError::DatabaseError(msg) => AppError::Database(msg),
        })?;

    Ok(TwimlMessage(reply))
}
