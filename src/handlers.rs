use crate::errors::AppError;
use crate::models::{
    AddMedicationRequest, AddMedicationResponse, CalendarResponse, HistoryResponse, Medication,
    TodayResponse, ToggleResponse,
};
use crate::state::AppState;
use crate::stats::{build_calendar_at, completion_rate, group_history, taken_count};
use crate::store::DoseStore;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Json,
};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = today();
    let store = state.store.lock().await;
    Html(render_index(&today_response(&store, today)))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let today = today();
    let store = state.store.lock().await;
    Ok(Json(today_response(&store, today)))
}

pub async fn list_medications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Medication>>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.medications(today())))
}

pub async fn add_medication(
    State(state): State<AppState>,
    Json(payload): Json<AddMedicationRequest>,
) -> Result<Json<AddMedicationResponse>, AppError> {
    let mut store = state.store.lock().await;
    let outcome = store.add_medication(payload)?;
    info!("notification: {}", outcome.notification);

    Ok(Json(AddMedicationResponse {
        medication: outcome.medication,
        notification: outcome.notification,
    }))
}

pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<ToggleResponse>, AppError> {
    Ok(Json(apply_toggle(&state, id).await))
}

/// Form post from the server-rendered dose list; used when scripts are off.
pub async fn toggle_form(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Redirect, AppError> {
    apply_toggle(&state, id).await;
    Ok(Redirect::to("/"))
}

async fn apply_toggle(state: &AppState, id: u32) -> ToggleResponse {
    let today = today();
    let mut store = state.store.lock().await;
    let outcome = store.toggle(id, today);

    if !outcome.toggled {
        debug!(id, "toggle ignored, no such medication");
    }
    if let Some(notification) = &outcome.notification {
        info!("notification: {notification}");
    }

    ToggleResponse {
        toggled: outcome.toggled,
        notification: outcome.notification,
        today: today_response(&store, today),
    }
}

pub async fn get_calendar(
    State(state): State<AppState>,
) -> Result<Json<CalendarResponse>, AppError> {
    let today = today();
    let store = state.store.lock().await;
    let medications = store.medications(today);
    Ok(Json(build_calendar_at(
        today,
        &medications,
        store.history(),
        state.placeholder.as_ref(),
    )))
}

pub async fn get_history(State(state): State<AppState>) -> Result<Json<HistoryResponse>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(group_history(store.history())))
}

fn today_response(store: &DoseStore, today: NaiveDate) -> TodayResponse {
    let medications = store.medications(today);
    TodayResponse {
        date: today.to_string(),
        taken_count: taken_count(&medications),
        total_count: medications.len(),
        completion_rate: completion_rate(&medications),
        medications,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
