use std::sync::Arc;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            twilio_account_sid: "ACtest".to_string(),
            twilio_auth_token: "test-auth-token".to_string(),
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned PostgREST row payloads for wiremock-backed tests.
pub struct MockSupabaseRows;

impl MockSupabaseRows {
    pub fn conversation(
        sender: &str,
        state: &str,
        specialty: Option<&str>,
        doctor: Option<&str>,
    ) -> Value {
        json!({
            "sender": sender,
            "state": state,
            "specialty": specialty,
            "doctor": doctor,
        })
    }

    pub fn appointment(
        user_id: &str,
        specialty: &str,
        doctor: &str,
        day: &str,
        time: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "specialty": specialty,
            "doctor": doctor,
            "day": day,
            "time": time,
            "status": status,
            "created_at": Utc::now().to_rfc3339(),
        })
    }
}
