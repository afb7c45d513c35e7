use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;
use urlencoding::encode;

use shared_database::supabase::SupabaseClient;

use crate::models::{ChatError, ChatState, ConversationPatch, ConversationRecord};

/// Keyed per-sender conversation position. Last write wins; records are never
/// deleted.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, sender: &str) -> Result<Option<ConversationRecord>, ChatError>;

    /// Full replace, creating the record if absent.
    async fn set(&self, sender: &str, record: ConversationRecord) -> Result<(), ChatError>;

    /// Partial update of the provided fields, creating the record if absent.
    async fn merge(&self, sender: &str, patch: ConversationPatch) -> Result<(), ChatError>;
}

#[async_trait]
impl<S: ConversationStore + ?Sized> ConversationStore for Arc<S> {
    async fn get(&self, sender: &str) -> Result<Option<ConversationRecord>, ChatError> {
        (**self).get(sender).await
    }

    async fn set(&self, sender: &str, record: ConversationRecord) -> Result<(), ChatError> {
        (**self).set(sender, record).await
    }

    async fn merge(&self, sender: &str, patch: ConversationPatch) -> Result<(), ChatError> {
        (**self).merge(sender, patch).await
    }
}

// ==============================================================================
// SUPABASE IMPLEMENTATION
// ==============================================================================

#[derive(Debug, Deserialize)]
struct ConversationRow {
    sender: String,
    state: String,
    #[serde(default)]
    specialty: Option<String>,
    #[serde(default)]
    doctor: Option<String>,
}

pub struct SupabaseConversationStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseConversationStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn upsert(&self, body: Value) -> Result<(), ChatError> {
        // merge-duplicates only touches the columns present in the payload,
        // which gives both set (all columns) and merge (partial) semantics.
        let _: Vec<Value> = self
            .supabase
            .request(
                Method::POST,
                "/rest/v1/conversations?on_conflict=sender",
                Some("resolution=merge-duplicates,return=representation"),
                Some(body),
            )
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SupabaseConversationStore {
    async fn get(&self, sender: &str) -> Result<Option<ConversationRecord>, ChatError> {
        let path = format!(
            "/rest/v1/conversations?sender=eq.{}&limit=1",
            encode(sender)
        );

        let rows: Vec<ConversationRow> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().next().map(|row| ConversationRecord {
            state: ChatState::parse(&row.state),
            specialty: row.specialty,
            doctor: row.doctor,
        }))
    }

    async fn set(&self, sender: &str, record: ConversationRecord) -> Result<(), ChatError> {
        debug!(%sender, state = %record.state, "replacing conversation record");

        // Explicit nulls so a full replace clears stale context columns.
        self.upsert(json!({
            "sender": sender,
            "state": record.state.to_string(),
            "specialty": record.specialty,
            "doctor": record.doctor,
        }))
        .await
    }

    async fn merge(&self, sender: &str, patch: ConversationPatch) -> Result<(), ChatError> {
        let mut body = Map::new();
        body.insert("sender".to_string(), json!(sender));
        if let Some(state) = patch.state {
            body.insert("state".to_string(), json!(state.to_string()));
        }
        if let Some(specialty) = patch.specialty {
            body.insert("specialty".to_string(), json!(specialty));
        }
        if let Some(doctor) = patch.doctor {
            body.insert("doctor".to_string(), json!(doctor));
        }

        self.upsert(Value::Object(body)).await
    }
}
