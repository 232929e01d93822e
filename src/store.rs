use crate::models::{
    AddMedicationRequest, DoseStatus, HistoryEntry, Medication, Notification, SeedData,
};
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{info, warn};

const PALETTE: [&str; 6] = ["purple", "blue", "amber", "green", "pink", "teal"];

/// How the `taken` flag relates to the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingMode {
    /// One flag per medication for the lifetime of the process. Toggles never touch history.
    #[default]
    Session,
    /// Flags keyed by `(medication, date)`; marking a dose taken appends a history entry.
    Dated,
}

/// What the add-medication form does with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddPolicy {
    #[default]
    Append,
    /// Acknowledge the form but leave the catalog as it was.
    Discard,
}

#[derive(Debug)]
pub struct ToggleOutcome {
    pub toggled: bool,
    pub notification: Option<Notification>,
}

#[derive(Debug)]
pub struct AddOutcome {
    pub medication: Option<Medication>,
    pub notification: Notification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddError {
    BlankName,
    InvalidTime(String),
    NoFreeId,
}

impl fmt::Display for AddError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddError::BlankName => write!(f, "name must not be empty"),
            AddError::InvalidTime(raw) => write!(f, "time must be HH:MM, got {raw:?}"),
            AddError::NoFreeId => write!(f, "no free medication id left"),
        }
    }
}

impl std::error::Error for AddError {}

/// Parses a time of day and renders it as zero-padded `HH:MM`.
pub fn normalize_time(raw: &str) -> Option<String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .ok()
        .map(|time| time.format("%H:%M").to_string())
}

/// One past the highest id, or the lowest unused id once the top of the range is taken.
fn next_id(ids: impl IntoIterator<Item = u32>) -> Option<u32> {
    let used: BTreeSet<u32> = ids.into_iter().collect();
    match used.last() {
        None => Some(1),
        Some(&max) => max
            .checked_add(1)
            .or_else(|| (1..=u32::MAX).find(|id| !used.contains(id))),
    }
}

#[derive(Debug)]
pub struct DoseStore {
    medications: Vec<Medication>,
    history: Vec<HistoryEntry>,
    taken_on: BTreeSet<(u32, NaiveDate)>,
    tracking: TrackingMode,
    add_policy: AddPolicy,
}

impl DoseStore {
    /// Builds the store from seed data. In dated mode the seeded `taken` flags count for `today`.
    pub fn new(seed: SeedData, tracking: TrackingMode, add_policy: AddPolicy, today: NaiveDate) -> Self {
        let taken_on = match tracking {
            TrackingMode::Session => BTreeSet::new(),
            TrackingMode::Dated => seed
                .medications
                .iter()
                .filter(|med| med.taken)
                .map(|med| (med.id, today))
                .collect(),
        };

        Self {
            medications: seed.medications,
            history: seed.history,
            taken_on,
            tracking,
            add_policy,
        }
    }

    /// The catalog as seen on `date`.
    pub fn medications(&self, date: NaiveDate) -> Vec<Medication> {
        match self.tracking {
            TrackingMode::Session => self.medications.clone(),
            TrackingMode::Dated => self
                .medications
                .iter()
                .map(|med| Medication {
                    taken: self.taken_on.contains(&(med.id, date)),
                    ..med.clone()
                })
                .collect(),
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Flips the taken flag of medication `id` for `date`.
    ///
    /// Only the off-to-on transition produces a notification. Unknown ids change nothing.
    pub fn toggle(&mut self, id: u32, date: NaiveDate) -> ToggleOutcome {
        let prior = self
            .medications(date)
            .into_iter()
            .find(|med| med.id == id);

        match self.tracking {
            TrackingMode::Session => {
                for med in self.medications.iter_mut().filter(|med| med.id == id) {
                    med.taken = !med.taken;
                }
            }
            TrackingMode::Dated => {
                if prior.is_some() && !self.taken_on.remove(&(id, date)) {
                    self.taken_on.insert((id, date));
                }
            }
        }

        let Some(med) = prior else {
            return ToggleOutcome {
                toggled: false,
                notification: None,
            };
        };

        info!(id, name = %med.name, taken = !med.taken, "medication toggled");

        if med.taken {
            return ToggleOutcome {
                toggled: true,
                notification: None,
            };
        }

        if self.tracking == TrackingMode::Dated {
            self.record(&med, date, DoseStatus::Taken);
        }

        ToggleOutcome {
            toggled: true,
            notification: Some(Notification::new(
                format!("{} marked as taken", med.name),
                format!("{} at {}", med.dosage, med.time),
            )),
        }
    }

    /// Rejects a blank name or a time that is not a valid `HH:MM` before applying the add policy.
    pub fn add_medication(&mut self, request: AddMedicationRequest) -> Result<AddOutcome, AddError> {
        const TITLE: &str = "Medication added!";

        if request.name.trim().is_empty() {
            return Err(AddError::BlankName);
        }
        let time = normalize_time(&request.time)
            .ok_or_else(|| AddError::InvalidTime(request.time.clone()))?;

        if self.add_policy == AddPolicy::Discard {
            info!(name = %request.name, "add-medication input discarded");
            return Ok(AddOutcome {
                medication: None,
                notification: Notification::new(TITLE, ""),
            });
        }

        let id = next_id(self.medications.iter().map(|med| med.id)).ok_or(AddError::NoFreeId)?;
        let color = PALETTE[self.medications.len() % PALETTE.len()].to_string();
        let notes = request
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());

        let medication = Medication {
            id,
            name: request.name.trim().to_string(),
            dosage: request.dosage.trim().to_string(),
            time,
            frequency: request.frequency,
            notes,
            color,
            taken: false,
        };
        self.medications.push(medication.clone());
        info!(id, name = %medication.name, "medication added");

        let detail = format!("{} {} at {}", medication.name, medication.dosage, medication.time);
        Ok(AddOutcome {
            medication: Some(medication),
            notification: Notification::new(TITLE, detail),
        })
    }

    fn record(&mut self, med: &Medication, date: NaiveDate, status: DoseStatus) {
        let Some(id) = next_id(self.history.iter().map(|entry| entry.id)) else {
            warn!(name = %med.name, "history is out of ids, dose not recorded");
            return;
        };
        self.history.push(HistoryEntry {
            id,
            medication_name: med.name.clone(),
            dosage: med.dosage.clone(),
            date,
            time: med.time.clone(),
            status,
            color: med.color.clone(),
        });
    }
}
