use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use urlencoding::encode;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentStatus, ChatError, NewAppointment};

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Booked(Appointment),
    SlotTaken,
}

/// Appointment collection. The store owns the slot-uniqueness guarantee:
/// `book_if_free` is the single conditional-write operation the engine relies
/// on, so two concurrent bookings of the same (specialty, doctor, day, time)
/// cannot both end up confirmed.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// This sender's confirmed appointments, in creation order.
    async fn confirmed_for(&self, user_id: &str) -> Result<Vec<Appointment>, ChatError>;

    /// Create a confirmed appointment unless one already holds the slot.
    async fn book_if_free(&self, new: NewAppointment) -> Result<BookingOutcome, ChatError>;

    /// Flip status to cancelled. Appointments are never deleted.
    async fn cancel(&self, id: Uuid) -> Result<(), ChatError>;
}

#[async_trait]
impl<S: AppointmentStore + ?Sized> AppointmentStore for Arc<S> {
    async fn confirmed_for(&self, user_id: &str) -> Result<Vec<Appointment>, ChatError> {
        (**self).confirmed_for(user_id).await
    }

    async fn book_if_free(&self, new: NewAppointment) -> Result<BookingOutcome, ChatError> {
        (**self).book_if_free(new).await
    }

    async fn cancel(&self, id: Uuid) -> Result<(), ChatError> {
        (**self).cancel(id).await
    }
}

// ==============================================================================
// SUPABASE IMPLEMENTATION
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn confirmed_for(&self, user_id: &str) -> Result<Vec<Appointment>, ChatError> {
        let path = format!(
            "/rest/v1/appointments?user_id=eq.{}&status=eq.confirmed&order=created_at.asc",
            encode(user_id)
        );

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))
    }

    async fn book_if_free(&self, new: NewAppointment) -> Result<BookingOutcome, ChatError> {
        let path = format!(
            "/rest/v1/appointments?specialty=eq.{}&doctor=eq.{}&day=eq.{}&time=eq.{}&status=eq.confirmed&limit=1",
            encode(&new.specialty),
            encode(&new.doctor),
            encode(&new.day),
            encode(&new.time),
        );

        let existing: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            debug!(specialty = %new.specialty, doctor = %new.doctor, day = %new.day,
                   "slot already held by a confirmed appointment");
            return Ok(BookingOutcome::SlotTaken);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            specialty: new.specialty,
            doctor: new.doctor,
            day: new.day,
            time: new.time,
            status: AppointmentStatus::Confirmed,
            created_at: Utc::now(),
        };

        // The read above and this insert are two REST calls; the partial
        // unique index on (specialty, doctor, day, time) where
        // status = confirmed is what actually holds the invariant under
        // concurrency. A 409 here means we lost that race.
        let insert = self
            .supabase
            .request::<Vec<Appointment>>(
                Method::POST,
                "/rest/v1/appointments",
                Some("return=representation"),
                Some(serde_json::to_value(&appointment)
                    .map_err(|e| ChatError::DatabaseError(e.to_string()))?),
            )
            .await;

        match insert {
            Ok(inserted) => Ok(BookingOutcome::Booked(
                inserted.into_iter().next().unwrap_or(appointment),
            )),
            Err(e) if e.to_string().starts_with("Conflict") => {
                warn!(specialty = %appointment.specialty, doctor = %appointment.doctor,
                      "concurrent booking lost the slot between check and insert");
                Ok(BookingOutcome::SlotTaken)
            }
            Err(e) => Err(ChatError::DatabaseError(e.to_string())),
        }
    }

    async fn cancel(&self, id: Uuid) -> Result<(), ChatError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);

        let _: Vec<Value> = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some("return=representation"),
                Some(json!({ "status": AppointmentStatus::Cancelled.to_string() })),
            )
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
