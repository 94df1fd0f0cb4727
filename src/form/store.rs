use log::debug;
use tokio::sync::watch;

use super::{FieldSnapshot, FormError, FormField};

/// Current value of every form input for one form instance.
///
/// Values live inside a `watch` channel so every update doubles as the
/// re-render notification for whoever is subscribed.
pub struct FieldStore {
    values: watch::Sender<FieldSnapshot>,
}

impl FieldStore {
    pub fn new() -> Self {
        let (values, _) = watch::channel(FieldSnapshot::empty());
        Self { values }
    }

    /// Applies a change event from the input boundary. No validation happens here.
    pub fn update(&self, field_name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let field = FormField::from_key(field_name)
            .ok_or_else(|| FormError::UnknownField(field_name.to_string()))?;
        self.set(field, value);
        Ok(())
    }

    pub fn set(&self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        debug!("Field {} updated ({} chars)", field.key(), value.chars().count());
        self.values.send_modify(|snapshot| snapshot.set(field, value));
    }

    pub fn reset(&self) {
        self.values.send_replace(FieldSnapshot::empty());
        debug!("Form fields reset");
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        self.values.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FieldSnapshot> {
        self.values.subscribe()
    }
}

impl Default for FieldStore {
    fn default() -> Self {
        Self::new()
    }
}
