use chrono::Utc;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

use super::{FormStatus, SubmitOutcome, SubmitState, GENERIC_FAILURE};
use crate::config::FeedbackConfig;
use crate::form::{check, FieldSnapshot, FieldStore, FormError};
use crate::persistence::{FeedbackRecord, FeedbackSink, PersistenceError};

/// One feedback form instance: its field values, its submit state and the
/// store submissions go to.
pub struct FeedbackForm {
    fields: FieldStore,
    status: watch::Sender<FormStatus>,
    sink: Arc<dyn FeedbackSink>,
    submit_timeout: Duration,
}

impl FeedbackForm {
    pub fn new(sink: Arc<dyn FeedbackSink>, config: &FeedbackConfig) -> Self {
        Self::with_timeout(sink, config.submit_timeout())
    }

    pub fn with_timeout(sink: Arc<dyn FeedbackSink>, submit_timeout: Duration) -> Self {
        let (status, _) = watch::channel(FormStatus::default());
        Self {
            fields: FieldStore::new(),
            status,
            sink,
            submit_timeout,
        }
    }

    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    pub fn update_field(&self, field_name: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.fields.update(field_name, value)
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        self.fields.snapshot()
    }

    pub fn status(&self) -> FormStatus {
        self.status.borrow().clone()
    }

    pub fn state(&self) -> SubmitState {
        self.status.borrow().state.clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<FormStatus> {
        self.status.subscribe()
    }

    /// Runs one submit attempt: guard, validate, insert, then reset on success.
    ///
    /// A request arriving while another is in flight is ignored.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(guard) = SubmittingGuard::acquire(&self.status) else {
            debug!("Submit ignored: a submission is already in flight");
            return SubmitOutcome::Ignored;
        };

        let attempt = Uuid::new_v4();
        let snapshot = self.fields.snapshot();
        info!("📨 Feedback submission {} started", attempt);

        let ratings = match check(&snapshot) {
            Ok(ratings) => ratings,
            Err(message) => {
                warn!("Submission {} rejected: {}", attempt, message);
                guard.settle(SubmitState::Failed(message.clone()));
                return SubmitOutcome::Rejected(message);
            }
        };
        let record = FeedbackRecord::from_snapshot(&snapshot, ratings);

        let result = match tokio::time::timeout(self.submit_timeout, self.sink.insert_feedback(&record)).await {
            Ok(result) => result,
            Err(_) => Err(PersistenceError::Timeout(self.submit_timeout)),
        };

        match result {
            Ok(rows) => {
                self.fields.reset();
                guard.settle(SubmitState::Success);
                info!(
                    "✅ Submission {} stored in {} ({} row(s))",
                    attempt,
                    self.sink.name(),
                    rows.len()
                );
                SubmitOutcome::Stored(rows)
            }
            Err(e) => {
                let message = failure_message(&e);
                error!("❌ Submission {} failed: {}", attempt, e);
                guard.settle(SubmitState::Failed(message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }
}

fn failure_message(err: &PersistenceError) -> String {
    let detail = err.detail();
    if detail.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        format!("Database error: {}", detail)
    }
}

/// Holds the form in `Submitting`. Dropping it unsettled (the submit future
/// was dropped mid-flight) moves the form to `Failed`.
struct SubmittingGuard<'a> {
    status: &'a watch::Sender<FormStatus>,
    settled: bool,
}

impl<'a> SubmittingGuard<'a> {
    fn acquire(status: &'a watch::Sender<FormStatus>) -> Option<Self> {
        let acquired = status.send_if_modified(|current| {
            if current.state == SubmitState::Submitting {
                return false;
            }
            current.state = SubmitState::Submitting;
            true
        });

        acquired.then(|| Self { status, settled: false })
    }

    fn settle(mut self, state: SubmitState) {
        self.finish(state);
        self.settled = true;
    }

    fn finish(&self, state: SubmitState) {
        self.status.send_modify(|current| {
            if state == SubmitState::Success {
                current.last_submitted_at = Some(Utc::now());
            }
            current.state = state;
        });
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Submission abandoned before the store answered");
            self.finish(SubmitState::Failed(GENERIC_FAILURE.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormField;
    use crate::persistence::MemoryFeedbackStore;
    use futures::future::BoxFuture;
    use futures::FutureExt;

    /// A store that never answers.
    struct SilentStore;

    impl FeedbackSink for SilentStore {
        fn insert_feedback<'a>(
            &'a self,
            _record: &'a FeedbackRecord,
        ) -> BoxFuture<'a, crate::persistence::Result<Vec<FeedbackRecord>>> {
            futures::future::pending().boxed()
        }

        fn name(&self) -> &'static str {
            "silent"
        }
    }

    fn fill_valid(form: &FeedbackForm) {
        for field in FormField::ALL {
            form.fields().set(field, "filled");
        }
        form.fields().set(FormField::Cohort, "3");
        form.fields().set(FormField::EnrollmentId, "25MBY2001");
        form.fields().set(FormField::TeachingStyleRating, "4");
        form.fields().set(FormField::OverallRating, "5");
    }

    #[test]
    fn test_initial_status_is_idle() {
        let form = FeedbackForm::with_timeout(Arc::new(MemoryFeedbackStore::new()), Duration::from_secs(1));
        let status = form.status();
        assert_eq!(status.state, SubmitState::Idle);
        assert!(!status.is_loading());
        assert!(!status.is_success());
        assert_eq!(status.error(), None);
        assert!(form.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_fails_and_keeps_fields() {
        let form = FeedbackForm::with_timeout(Arc::new(SilentStore), Duration::from_millis(50));
        fill_valid(&form);
        let before = form.snapshot();

        let outcome = form.submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed("Database error: request timed out after 50ms".to_string()));
        assert_eq!(form.state(), SubmitState::Failed("Database error: request timed out after 50ms".to_string()));
        assert_eq!(form.snapshot(), before);
    }

    #[tokio::test]
    async fn test_abandoned_submit_leaves_submitting() {
        let form = FeedbackForm::with_timeout(Arc::new(SilentStore), Duration::from_secs(60));
        fill_valid(&form);

        let abandoned = tokio::time::timeout(Duration::from_millis(20), form.submit()).await;
        assert!(abandoned.is_err());

        assert_eq!(form.state(), SubmitState::Failed(GENERIC_FAILURE.to_string()));
        assert!(!form.status().is_loading());
    }

    #[tokio::test]
    async fn test_ignored_submit_keeps_first_in_flight() {
        let form = Arc::new(FeedbackForm::with_timeout(Arc::new(SilentStore), Duration::from_secs(60)));
        fill_valid(&form);
        let mut rx = form.subscribe_status();

        let first = tokio::spawn({
            let form = form.clone();
            async move { form.submit().await }
        });
        rx.wait_for(|s| s.is_loading()).await.unwrap();

        assert_eq!(form.submit().await, SubmitOutcome::Ignored);
        assert_eq!(form.state(), SubmitState::Submitting);
        assert_eq!(form.status().error(), None);
        assert_eq!(form.submit().await, SubmitOutcome::Ignored);
        assert_eq!(form.state(), SubmitState::Submitting);

        first.abort();
        let _ = first.await;
        assert_eq!(form.state(), SubmitState::Failed(GENERIC_FAILURE.to_string()));
    }

    #[tokio::test]
    async fn test_rating_with_sign_is_rejected_before_store() {
        let store = Arc::new(MemoryFeedbackStore::new());
        let form = FeedbackForm::with_timeout(store.clone(), Duration::from_secs(1));
        fill_valid(&form);
        form.fields().set(FormField::TeachingStyleRating, "+3");

        let outcome = form.submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Rejected("Mentor teaching style rating must be a whole number from 1 to 5.".to_string())
        );
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_success_records_timestamp() {
        let form = FeedbackForm::with_timeout(Arc::new(MemoryFeedbackStore::new()), Duration::from_secs(1));
        fill_valid(&form);

        assert!(matches!(form.submit().await, SubmitOutcome::Stored(_)));
        let status = form.status();
        assert!(status.is_success());
        assert!(status.last_submitted_at.is_some());
    }

    #[tokio::test]
    async fn test_status_subscribers_see_transitions() {
        let form = FeedbackForm::with_timeout(Arc::new(MemoryFeedbackStore::new()), Duration::from_secs(1));
        let mut rx = form.subscribe_status();

        form.submit().await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().error().is_some());
    }

    #[test]
    fn test_empty_detail_uses_generic_message() {
        let err = PersistenceError::Rejected("  ".to_string());
        assert_eq!(failure_message(&err), GENERIC_FAILURE);

        let err = PersistenceError::Rejected("duplicate key".to_string());
        assert_eq!(failure_message(&err), "Database error: duplicate key");
    }
}
