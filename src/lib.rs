//! Mentor Feedback: the feedback-submission pipeline behind the MentiBY
//! cohort feedback form.
//!
//! A [`FeedbackForm`] owns the field values ([`form::FieldStore`]), checks
//! them ([`form::validate`]) and sends the resulting [`FeedbackRecord`] to a
//! [`FeedbackSink`]. With the `desktop` feature the form is hosted in a
//! Tauri webview; see [`run`].

pub mod config;
pub mod form;
pub mod persistence;
pub mod submission;

#[cfg(feature = "desktop")]
mod commands;

pub use crate::config::{Backend, FeedbackConfig};
pub use form::{FieldSnapshot, FieldStore, FormError, FormField, Validation};
pub use persistence::{FeedbackRecord, FeedbackSink, PersistenceError};
pub use submission::{FeedbackForm, FormStatus, SubmitOutcome, SubmitState};

#[cfg(feature = "desktop")]
pub fn run(config: FeedbackConfig) -> anyhow::Result<()> {
    use anyhow::Context;
    use log::info;
    use std::sync::Arc;

    info!("Mentor Feedback starting...");

    let sink = tauri::async_runtime::block_on(persistence::connect(&config))
        .context("Failed to initialise feedback storage")?;
    let form = Arc::new(FeedbackForm::new(sink, &config));
    let events_form = form.clone();

    tauri::Builder::default()
        .invoke_handler(tauri::generate_handler![
            commands::list_form_fields,
            commands::update_field,
            commands::get_form_snapshot,
            commands::get_form_status,
            commands::submit_feedback,
        ])
        .manage(commands::AppState { form })
        .setup(move |app| {
            commands::forward_form_events(app.handle().clone(), &events_form);
            info!("✅ Feedback form ready");
            Ok(())
        })
        .run(tauri::generate_context!())
        .context("Error while running tauri application")?;

    Ok(())
}
