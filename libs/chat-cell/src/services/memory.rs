//! In-memory store implementations. The engine is tested against these; they
//! also make the cell runnable without a Supabase project.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentStatus, ChatError, ConversationPatch, ConversationRecord,
    NewAppointment,
};

use super::appointment_store::{AppointmentStore, BookingOutcome};
use super::conversation_store::ConversationStore;

#[derive(Default)]
pub struct InMemoryConversationStore {
    records: Mutex<HashMap<String, ConversationRecord>>,
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, sender: &str) -> Result<Option<ConversationRecord>, ChatError> {
        Ok(self.records.lock().unwrap().get(sender).cloned())
    }

    async fn set(&self, sender: &str, record: ConversationRecord) -> Result<(), ChatError> {
        self.records
            .lock()
            .unwrap()
            .insert(sender.to_string(), record);
        Ok(())
    }

    async fn merge(&self, sender: &str, patch: ConversationPatch) -> Result<(), ChatError> {
        let mut records = self.records.lock().unwrap();
        let record = records.entry(sender.to_string()).or_default();
        if let Some(state) = patch.state {
            record.state = state;
        }
        if let Some(specialty) = patch.specialty {
            record.specialty = Some(specialty);
        }
        if let Some(doctor) = patch.doctor {
            record.doctor = Some(doctor);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    /// Seed an appointment directly, bypassing the slot check.
    pub fn insert(&self, appointment: Appointment) {
        self.appointments.lock().unwrap().push(appointment);
    }

    pub fn all(&self) -> Vec<Appointment> {
        self.appointments.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn confirmed_for(&self, user_id: &str) -> Result<Vec<Appointment>, ChatError> {
        Ok(self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id && a.status == AppointmentStatus::Confirmed)
            .cloned()
            .collect())
    }

    async fn book_if_free(&self, new: NewAppointment) -> Result<BookingOutcome, ChatError> {
        // Check and insert under one lock; this store closes the race the
        // REST implementation delegates to its unique index.
        let mut appointments = self.appointments.lock().unwrap();

        let taken = appointments.iter().any(|a| {
            a.status == AppointmentStatus::Confirmed
                && a.specialty == new.specialty
                && a.doctor == new.doctor
                && a.day == new.day
                && a.time == new.time
        });
        if taken {
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
        appointments.push(appointment.clone());
        Ok(BookingOutcome::Booked(appointment))
    }

    async fn cancel(&self, id: Uuid) -> Result<(), ChatError> {
        let mut appointments = self.appointments.lock().unwrap();
        match appointments.iter_mut().find(|a| a.id == id) {
            Some(appointment) => {
                appointment.status = AppointmentStatus::Cancelled;
                Ok(())
            }
            None => Err(ChatError::DatabaseError(format!(
                "appointment {} not found",
                id
            ))),
        }
    }
}
