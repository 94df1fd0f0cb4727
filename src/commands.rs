use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use tauri::{AppHandle, Emitter, State};

use crate::form::{FieldSnapshot, FormField};
use crate::submission::{FeedbackForm, FormStatus, SubmitOutcome};

pub const FORM_CHANGED_EVENT: &str = "feedback-form-changed";
pub const STATUS_CHANGED_EVENT: &str = "feedback-status-changed";

pub struct AppState {
    pub form: Arc<FeedbackForm>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    key: &'static str,
    label: &'static str,
    is_rating: bool,
}

// Same three flags the web form used to keep, plus the success timestamp.
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FormStatusPayload {
    loading: bool,
    success: bool,
    error: Option<String>,
    last_submitted_at: Option<DateTime<Utc>>,
}

impl From<&FormStatus> for FormStatusPayload {
    fn from(status: &FormStatus) -> Self {
        Self {
            loading: status.is_loading(),
            success: status.is_success(),
            error: status.error().map(str::to_string),
            last_submitted_at: status.last_submitted_at,
        }
    }
}

#[tauri::command]
pub fn list_form_fields() -> Vec<FieldInfo> {
    FormField::ALL
        .iter()
        .map(|field| FieldInfo {
            key: field.key(),
            label: field.label(),
            is_rating: field.is_rating(),
        })
        .collect()
}

#[tauri::command]
pub fn update_field(field: String, value: String, state: State<'_, AppState>) -> Result<(), String> {
    state.form.update_field(&field, value).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_form_snapshot(state: State<'_, AppState>) -> FieldSnapshot {
    state.form.snapshot()
}

#[tauri::command]
pub fn get_form_status(state: State<'_, AppState>) -> FormStatusPayload {
    FormStatusPayload::from(&state.form.status())
}

#[tauri::command]
pub async fn submit_feedback(state: State<'_, AppState>) -> Result<FormStatusPayload, String> {
    let form = state.form.clone();
    info!("📝 Submit requested from form");

    match form.submit().await {
        SubmitOutcome::Stored(_) | SubmitOutcome::Ignored => Ok(FormStatusPayload::from(&form.status())),
        SubmitOutcome::Rejected(message) | SubmitOutcome::Failed(message) => Err(message),
    }
}

/// Re-emits every field and status change to the webview so it can re-render.
pub fn forward_form_events(app_handle: AppHandle, form: &FeedbackForm) {
    let mut fields = form.fields().subscribe();
    let fields_handle = app_handle.clone();
    tauri::async_runtime::spawn(async move {
        while fields.changed().await.is_ok() {
            let snapshot = fields.borrow_and_update().clone();
            if let Err(e) = fields_handle.emit(FORM_CHANGED_EVENT, snapshot) {
                error!("Failed to emit {}: {}", FORM_CHANGED_EVENT, e);
            }
        }
    });

    let mut status = form.subscribe_status();
    tauri::async_runtime::spawn(async move {
        while status.changed().await.is_ok() {
            let payload = FormStatusPayload::from(&*status.borrow_and_update());
            if let Err(e) = app_handle.emit(STATUS_CHANGED_EVENT, payload) {
                error!("Failed to emit {}: {}", STATUS_CHANGED_EVENT, e);
            }
        }
    });
}
