// libs/chat-cell/src/catalog.rs

/// Static reference data: specialties, their doctors, and the fixed slot grid.
/// Built once at router construction and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Catalog {
    specialties: Vec<Specialty>,
    slots: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Specialty {
    pub id: u32,
    pub name: String,
    pub doctors: Vec<String>,
}

impl Catalog {
    pub fn seed() -> Self {
        Self {
            specialties: vec![
                specialty(1, "Cardiology", &["Dr. Perez", "Dr. Ramos"]),
                specialty(2, "Pediatrics", &["Dr. Castro", "Dr. Leon"]),
                specialty(3, "Dermatology", &["Dr. Torres", "Dr. Vidal"]),
                specialty(4, "Gynecology", &["Dr. Herrera", "Dr. Gomez"]),
            ],
            slots: [
                "Monday 9:00 AM",
                "Tuesday 10:00 AM",
                "Wednesday 11:00 AM",
                "Thursday 3:00 PM",
                "Friday 4:00 PM",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    pub fn specialties(&self) -> &[Specialty] {
        &self.specialties
    }

    pub fn specialty(&self, id: u32) -> Option<&Specialty> {
        self.specialties.iter().find(|s| s.id == id)
    }

    /// Exact name match; the conversation store persists the display name.
    pub fn specialty_named(&self, name: &str) -> Option<&Specialty> {
        self.specialties.iter().find(|s| s.name == name)
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Zero-based; callers convert the user's 1-based choice first.
    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(String::as_str)
    }
}

fn specialty(id: u32, name: &str, doctors: &[&str]) -> Specialty {
    Specialty {
        id,
        name: name.to_string(),
        doctors: doctors.iter().map(|d| d.to_string()).collect(),
    }
}

/// Split a slot into its day and time parts at the first space.
pub fn day_and_time(slot: &str) -> (&str, &str) {
    slot.split_once(' ').unwrap_or((slot, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_split_at_first_space_keeping_multiword_time() {
        assert_eq!(day_and_time("Monday 9:00 AM"), ("Monday", "9:00 AM"));
        assert_eq!(day_and_time("Friday 4:00 PM"), ("Friday", "4:00 PM"));
    }

    #[test]
    fn specialty_lookup_by_id_and_name() {
        let catalog = Catalog::seed();
        assert_eq!(catalog.specialty(1).unwrap().name, "Cardiology");
        assert_eq!(catalog.specialty_named("Dermatology").unwrap().id, 3);
        assert!(catalog.specialty(0).is_none());
        assert!(catalog.specialty(99).is_none());
        assert!(catalog.specialty_named("cardiology").is_none());
    }

    #[test]
    fn slot_indexing_is_zero_based_and_bounded() {
        let catalog = Catalog::seed();
        assert_eq!(catalog.slot(0), Some("Monday 9:00 AM"));
        assert_eq!(catalog.slot(4), Some("Friday 4:00 PM"));
        assert_eq!(catalog.slot(5), None);
    }

    #[test]
    fn every_specialty_has_doctors() {
        let catalog = Catalog::seed();
        assert_eq!(catalog.specialties().len(), 4);
        for specialty in catalog.specialties() {
            assert!(!specialty.doctors.is_empty());
        }
    }
}
