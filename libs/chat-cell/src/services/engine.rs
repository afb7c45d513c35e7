use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{self, Catalog};
use crate::models::{ChatError, ChatState, ConversationPatch, ConversationRecord, NewAppointment};

use super::appointment_store::{AppointmentStore, BookingOutcome};
use super::conversation_store::ConversationStore;

/// The per-message decision core. Stateless and reentrant: all durable state
/// lives behind the two store handles, so any number of senders can be
/// handled concurrently without in-process coordination.
pub struct ConversationEngine<C, A> {
    catalog: Arc<Catalog>,
    conversations: C,
    appointments: A,
}

impl<C, A> ConversationEngine<C, A>
where
    C: ConversationStore,
    A: AppointmentStore,
{
    pub fn new(catalog: Arc<Catalog>, conversations: C, appointments: A) -> Self {
        Self {
            catalog,
            conversations,
            appointments,
        }
    }

    /// One inbound message in, exactly one reply out. Store ordering per
    /// message: conversation read, appointment operations, conversation
    /// write, reply.
    pub async fn handle(&self, sender: &str, body: &str) -> Result<String, ChatError> {
        let input = body.trim().to_lowercase();
        let record = self.conversations.get(sender).await?.unwrap_or_default();
        debug!(%sender, state = %record.state, "handling inbound message");

        // "hola" restarts the conversation from any state, context discarded.
        if input == "hola" {
            return self.reset_to_menu(sender).await;
        }

        match record.state {
            ChatState::Start => self.reset_to_menu(sender).await,
            ChatState::Menu => self.from_menu(sender, &input).await,
            ChatState::ChoosingSpecialty => self.choose_specialty(sender, &input).await,
            ChatState::ChoosingDoctor => self.choose_doctor(sender, &record, &input).await,
            ChatState::ChoosingSlot => self.choose_slot(sender, &record, &input).await,
            ChatState::Cancelling => self.cancel_matching(sender, &input).await,
            ChatState::Unknown => {
                // Unlike the hola reset, stored context survives here.
                self.conversations
                    .merge(sender, ConversationPatch::state(ChatState::Start))
                    .await?;
                Ok("I did not understand that. Send \"hola\" to start.".to_string())
            }
        }
    }

    async fn reset_to_menu(&self, sender: &str) -> Result<String, ChatError> {
        self.conversations
            .set(sender, ConversationRecord::menu())
            .await?;
        Ok(self.menu_text())
    }

    async fn from_menu(&self, sender: &str, input: &str) -> Result<String, ChatError> {
        match input {
            "1" => {
                self.conversations
                    .merge(sender, ConversationPatch::state(ChatState::ChoosingSpecialty))
                    .await?;
                Ok(self.specialty_list())
            }
            "2" => {
                let appointments = self.appointments.confirmed_for(sender).await?;
                self.conversations
                    .merge(sender, ConversationPatch::state(ChatState::Menu))
                    .await?;

                if appointments.is_empty() {
                    return Ok("You have no appointments registered.".to_string());
                }
                let mut reply = String::from("Your confirmed appointments:\n");
                for a in &appointments {
                    let _ = writeln!(reply, "- {} with {} - {} {}", a.specialty, a.doctor, a.day, a.time);
                }
                Ok(reply.trim_end().to_string())
            }
            "3" => {
                self.conversations
                    .merge(sender, ConversationPatch::state(ChatState::Cancelling))
                    .await?;
                Ok("Which appointment do you want to cancel? Reply with its day or specialty."
                    .to_string())
            }
            _ => Ok("Please pick a valid option (1, 2 or 3).".to_string()),
        }
    }

    async fn choose_specialty(&self, sender: &str, input: &str) -> Result<String, ChatError> {
        let Some(specialty) = input
            .parse::<u32>()
            .ok()
            .and_then(|id| self.catalog.specialty(id))
        else {
            return Ok("Please pick a valid specialty number.".to_string());
        };

        self.conversations
            .merge(
                sender,
                ConversationPatch::state(ChatState::ChoosingDoctor)
                    .with_specialty(&specialty.name),
            )
            .await?;

        let mut reply = format!("You picked {}.\nPick a doctor:\n", specialty.name);
        for (i, doctor) in specialty.doctors.iter().enumerate() {
            let _ = writeln!(reply, "{}. {}", i + 1, doctor);
        }
        Ok(reply.trim_end().to_string())
    }

    async fn choose_doctor(
        &self,
        sender: &str,
        record: &ConversationRecord,
        input: &str,
    ) -> Result<String, ChatError> {
        let Some(specialty) = record
            .specialty
            .as_deref()
            .and_then(|name| self.catalog.specialty_named(name))
        else {
            return self.recover_lost_context(sender).await;
        };

        let Some(doctor) = parse_index(input).and_then(|i| specialty.doctors.get(i)) else {
            return Ok("Please pick a valid doctor number.".to_string());
        };

        self.conversations
            .merge(
                sender,
                ConversationPatch::state(ChatState::ChoosingSlot).with_doctor(doctor),
            )
            .await?;

        let mut reply = format!("You picked {}.\nPick an available slot:\n", doctor);
        for (i, slot) in self.catalog.slots().iter().enumerate() {
            let _ = writeln!(reply, "{}. {}", i + 1, slot);
        }
        Ok(reply.trim_end().to_string())
    }

    async fn choose_slot(
        &self,
        sender: &str,
        record: &ConversationRecord,
        input: &str,
    ) -> Result<String, ChatError> {
        let (Some(specialty), Some(doctor)) =
            (record.specialty.as_deref(), record.doctor.as_deref())
        else {
            return self.recover_lost_context(sender).await;
        };

        let Some(slot) = parse_index(input).and_then(|i| self.catalog.slot(i)) else {
            return Ok("Please pick a valid slot number.".to_string());
        };

        let (day, time) = catalog::day_and_time(slot);
        let outcome = self
            .appointments
            .book_if_free(NewAppointment {
                user_id: sender.to_string(),
                specialty: specialty.to_string(),
                doctor: doctor.to_string(),
                day: day.to_string(),
                time: time.to_string(),
            })
            .await?;

        match outcome {
            BookingOutcome::SlotTaken => Ok(format!(
                "That slot is already taken for {} with {}. Please pick another one.",
                specialty, doctor
            )),
            BookingOutcome::Booked(appointment) => {
                self.conversations
                    .merge(sender, ConversationPatch::state(ChatState::Menu))
                    .await?;
                info!(%sender, specialty = %appointment.specialty,
                      doctor = %appointment.doctor, day = %appointment.day,
                      "appointment booked");
                Ok(format!(
                    "Your appointment is confirmed:\nSpecialty: {}\nDoctor: {}\nSlot: {} {}\n\nSend \"hola\" to go back to the menu.",
                    appointment.specialty, appointment.doctor, appointment.day, appointment.time
                ))
            }
        }
    }

    async fn cancel_matching(&self, sender: &str, input: &str) -> Result<String, ChatError> {
        let appointments = self.appointments.confirmed_for(sender).await?;

        if appointments.is_empty() {
            self.conversations
                .merge(sender, ConversationPatch::state(ChatState::Menu))
                .await?;
            return Ok("You have no appointments to cancel.".to_string());
        }

        // First match in store order wins; at most one cancellation per message.
        let matched = appointments.iter().find(|a| {
            input.contains(&a.day.to_lowercase()) || input.contains(&a.specialty.to_lowercase())
        });

        let reply = match matched {
            Some(appointment) => {
                self.appointments.cancel(appointment.id).await?;
                info!(%sender, specialty = %appointment.specialty,
                      day = %appointment.day, "appointment cancelled");
                format!(
                    "Your {} appointment on {} was cancelled.",
                    appointment.specialty, appointment.day
                )
            }
            None => "I could not find an appointment matching what you wrote.".to_string(),
        };

        self.conversations
            .merge(sender, ConversationPatch::state(ChatState::Menu))
            .await?;
        Ok(reply)
    }

    /// Stored context no longer resolves against the catalog (stale or
    /// corrupted record). Resetting beats failing the request: a 500 would
    /// strand the user with no recovery hint.
    async fn recover_lost_context(&self, sender: &str) -> Result<String, ChatError> {
        warn!(%sender, "stored context does not resolve against the catalog, resetting");
        self.conversations
            .set(sender, ConversationRecord::menu())
            .await?;
        Ok(format!(
            "Sorry, I lost track of your booking. Let's start over.\n\n{}",
            self.menu_text()
        ))
    }

    fn menu_text(&self) -> String {
        "Hola! I am your medical booking assistant.\n\nPick an option:\n1. Book an appointment\n2. View my appointments\n3. Cancel an appointment".to_string()
    }

    fn specialty_list(&self) -> String {
        let mut reply = String::from("Pick a specialty:\n");
        for specialty in self.catalog.specialties() {
            let _ = writeln!(reply, "{}. {}", specialty.id, specialty.name);
        }
        reply.trim_end().to_string()
    }
}

/// 1-based user choice to 0-based index; anything unparseable or zero is None.
fn parse_index(input: &str) -> Option<usize> {
    input.parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

#[cfg(test)]
mod tests {
    use super::parse_index;

    #[test]
    fn parse_index_is_one_based() {
        assert_eq!(parse_index("1"), Some(0));
        assert_eq!(parse_index("5"), Some(4));
        assert_eq!(parse_index("0"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("two"), None);
        assert_eq!(parse_index("-1"), None);
    }
}
