use crate::models::{
    CalendarDay, CalendarResponse, HistoryEntry, HistoryGroup, HistoryResponse, Medication,
    StatusTotals, WeekSummary,
};
use chrono::{Datelike, Duration, Local, NaiveDate};
use rand::Rng;

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const CALENDAR_RADIUS: i64 = 3;

/// Supplies the completion percentage shown for calendar days other than today.
///
/// Nothing in the history log feeds these cells; they are mock values.
pub trait CompletionPlaceholder: Send + Sync {
    fn completion_for(&self, date: NaiveDate) -> u8;
}

/// Uniform draw from `[60, 100)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPlaceholder;

impl CompletionPlaceholder for RandomPlaceholder {
    fn completion_for(&self, _date: NaiveDate) -> u8 {
        rand::thread_rng().gen_range(60..100)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedPlaceholder(pub u8);

impl CompletionPlaceholder for FixedPlaceholder {
    fn completion_for(&self, _date: NaiveDate) -> u8 {
        self.0
    }
}

pub fn taken_count(medications: &[Medication]) -> usize {
    medications.iter().filter(|med| med.taken).count()
}

/// Percentage of medications marked as taken, rounded half up. An empty catalog yields 0.
pub fn completion_rate(medications: &[Medication]) -> u8 {
    percentage(taken_count(medications), medications.len())
}

fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let value = (part as f64 * 100.0 / whole as f64).round();
    value.clamp(0.0, 100.0) as u8
}

pub fn build_calendar_at(
    today: NaiveDate,
    medications: &[Medication],
    history: &[HistoryEntry],
    placeholder: &dyn CompletionPlaceholder,
) -> CalendarResponse {
    let rate = completion_rate(medications);
    let start = today - Duration::days(CALENDAR_RADIUS);
    let end = today + Duration::days(CALENDAR_RADIUS);

    let mut days = Vec::with_capacity(7);
    for (index, offset) in (-CALENDAR_RADIUS..=CALENDAR_RADIUS).enumerate() {
        let date = today + Duration::days(offset);
        // Only the centre cell reflects real data.
        let is_centre = index == CALENDAR_RADIUS as usize;
        let completion = if is_centre {
            rate
        } else {
            placeholder.completion_for(date)
        };

        days.push(CalendarDay {
            date: date.to_string(),
            day_of_month: date.day(),
            weekday: WEEKDAY_LABELS[monday_first_index(date)].to_string(),
            is_today: date == today,
            completion,
            placeholder: !is_centre,
        });
    }

    CalendarResponse {
        days,
        week: week_summary(history, start, end),
    }
}

/// Counts history entries dated within `start..=end`.
pub fn week_summary(history: &[HistoryEntry], start: NaiveDate, end: NaiveDate) -> WeekSummary {
    let mut totals = StatusTotals::default();
    for entry in history
        .iter()
        .filter(|entry| entry.date >= start && entry.date <= end)
    {
        totals.record(entry.status);
    }

    WeekSummary {
        completion_rate: percentage(totals.taken, totals.total()),
        totals,
    }
}

pub fn group_history(history: &[HistoryEntry]) -> HistoryResponse {
    group_history_at(Local::now().date_naive(), history)
}

/// Groups entries newest day first. Entries sharing a date keep their log order.
pub fn group_history_at(today: NaiveDate, history: &[HistoryEntry]) -> HistoryResponse {
    let mut sorted: Vec<&HistoryEntry> = history.iter().collect();
    // `sort_by` is stable, so ties stay in insertion order.
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut groups: Vec<HistoryGroup> = Vec::new();
    let mut totals = StatusTotals::default();

    for entry in sorted {
        totals.record(entry.status);

        let label = history_label(entry.date, today);
        match groups.last_mut() {
            Some(group) if group.label == label => group.entries.push(entry.clone()),
            _ => groups.push(HistoryGroup {
                label,
                entries: vec![entry.clone()],
            }),
        }
    }

    HistoryResponse { groups, totals }
}

/// `"19 October"`, or `"19 October 2025"` when the year is not the current one.
pub fn history_label(date: NaiveDate, today: NaiveDate) -> String {
    if date.year() == today.year() {
        date.format("%-d %B").to_string()
    } else {
        date.format("%-d %B %Y").to_string()
    }
}

fn monday_first_index(date: NaiveDate) -> usize {
    match date.weekday().num_days_from_sunday() {
        0 => 6,
        day => day as usize - 1,
    }
}
