use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: u32,
    pub name: String,
    pub dosage: String,
    /// Scheduled time of day, `HH:MM`.
    pub time: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub taken: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseStatus {
    Taken,
    Missed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u32,
    pub medication_name: String,
    pub dosage: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: DoseStatus,
    #[serde(default)]
    pub color: String,
}

/// Fire-and-forget message shown to the user as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub detail: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} ({})", self.title, self.detail)
        }
    }
}

/// Contents of a seed file: the catalog and history the store starts with.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedData {
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AddMedicationRequest {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    pub time: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddMedicationResponse {
    pub medication: Option<Medication>,
    pub notification: Notification,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: String,
    pub taken_count: usize,
    pub total_count: usize,
    pub completion_rate: u8,
    pub medications: Vec<Medication>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub toggled: bool,
    pub notification: Option<Notification>,
    pub today: TodayResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: String,
    pub day_of_month: u32,
    pub weekday: String,
    pub is_today: bool,
    pub completion: u8,
    /// Set when `completion` is a stand-in value rather than a computed one.
    pub placeholder: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub taken: usize,
    pub missed: usize,
    pub skipped: usize,
}

impl StatusTotals {
    pub fn record(&mut self, status: DoseStatus) {
        match status {
            DoseStatus::Taken => self.taken += 1,
            DoseStatus::Missed => self.missed += 1,
            DoseStatus::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.taken + self.missed + self.skipped
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    pub completion_rate: u8,
    pub totals: StatusTotals,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub days: Vec<CalendarDay>,
    pub week: WeekSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryGroup {
    pub label: String,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub groups: Vec<HistoryGroup>,
    pub totals: StatusTotals,
}
