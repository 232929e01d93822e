use crate::models::{DoseStatus, Frequency, HistoryEntry, Medication, SeedData};
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

/// Loads the seed file when one is configured, otherwise the built-in sample data.
///
/// Read and parse failures are logged and fall back to the sample data.
pub async fn load_seed(path: Option<&Path>, today: NaiveDate) -> SeedData {
    let Some(path) = path else {
        return sample_data(today);
    };

    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<SeedData>(&bytes) {
            Ok(seed) => {
                info!(
                    path = %path.display(),
                    medications = seed.medications.len(),
                    history = seed.history.len(),
                    "loaded seed file"
                );
                dedupe_ids(seed)
            }
            Err(err) => {
                error!("failed to parse seed file: {err}");
                sample_data(today)
            }
        },
        Err(err) => {
            error!("failed to read seed file {}: {err}", path.display());
            sample_data(today)
        }
    }
}

/// Drops medications and history entries whose id was already seen, keeping the first.
fn dedupe_ids(mut seed: SeedData) -> SeedData {
    let mut seen = HashSet::new();
    seed.medications.retain(|med| {
        let fresh = seen.insert(med.id);
        if !fresh {
            warn!(id = med.id, "duplicate medication id in seed file, skipping");
        }
        fresh
    });

    let mut seen = HashSet::new();
    seed.history.retain(|entry| {
        let fresh = seen.insert(entry.id);
        if !fresh {
            warn!(id = entry.id, "duplicate history id in seed file, skipping");
        }
        fresh
    });
    seed
}

pub fn sample_data(today: NaiveDate) -> SeedData {
    SeedData {
        medications: sample_medications(),
        history: sample_history(today),
    }
}

fn sample_medications() -> Vec<Medication> {
    let med = |id: u32, name: &str, dosage: &str, time: &str, notes: Option<&str>, color: &str, taken: bool| {
        Medication {
            id,
            name: name.to_string(),
            dosage: dosage.to_string(),
            time: time.to_string(),
            frequency: Frequency::Daily,
            notes: notes.map(str::to_string),
            color: color.to_string(),
            taken,
        }
    };

    vec![
        med(1, "Aspirin", "100 mg", "09:00", Some("After meals"), "purple", true),
        med(2, "Omega-3", "1000 mg", "12:00", Some("Take with water"), "blue", false),
        med(3, "Vitamin D", "2000 IU", "14:00", None, "amber", false),
        med(4, "Magnesium", "400 mg", "21:00", Some("Before bed"), "green", false),
    ]
}

fn sample_history(today: NaiveDate) -> Vec<HistoryEntry> {
    let rows: [(i64, &str, &str, &str, DoseStatus, &str); 8] = [
        (0, "Aspirin", "100 mg", "09:00", DoseStatus::Taken, "purple"),
        (1, "Aspirin", "100 mg", "09:00", DoseStatus::Taken, "purple"),
        (1, "Omega-3", "1000 mg", "12:00", DoseStatus::Taken, "blue"),
        (1, "Vitamin D", "2000 IU", "14:00", DoseStatus::Missed, "amber"),
        (1, "Magnesium", "400 mg", "21:00", DoseStatus::Taken, "green"),
        (2, "Aspirin", "100 mg", "09:00", DoseStatus::Taken, "purple"),
        (2, "Omega-3", "1000 mg", "12:00", DoseStatus::Skipped, "blue"),
        (2, "Magnesium", "400 mg", "21:00", DoseStatus::Taken, "green"),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(index, (days_ago, name, dosage, time, status, color))| HistoryEntry {
            id: index as u32 + 1,
            medication_name: name.to_string(),
            dosage: dosage.to_string(),
            date: today - Duration::days(days_ago),
            time: time.to_string(),
            status,
            color: color.to_string(),
        })
        .collect()
}
