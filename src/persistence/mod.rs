pub mod memory;
pub mod models;
pub mod postgres;
pub mod supabase;

pub use memory::MemoryFeedbackStore;
pub use models::FeedbackRecord;
pub use postgres::PostgresFeedbackStore;
pub use supabase::SupabaseClient;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::info;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{Backend, FeedbackConfig};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The store answered and refused the record.
    #[error("{0}")]
    Rejected(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl PersistenceError {
    /// Detail shown to the user after the "Database error" prefix.
    pub fn detail(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Anything that can durably store one feedback record.
pub trait FeedbackSink: Send + Sync {
    /// Inserts one record and returns the rows as stored.
    fn insert_feedback<'a>(&'a self, record: &'a FeedbackRecord) -> BoxFuture<'a, Result<Vec<FeedbackRecord>>>;

    fn name(&self) -> &'static str;
}

/// Builds the sink selected by `config.backend`.
pub async fn connect(config: &FeedbackConfig) -> Result<Arc<dyn FeedbackSink>> {
    let sink: Arc<dyn FeedbackSink> = match config.backend {
        Backend::Supabase => Arc::new(SupabaseClient::new(config)?),
        Backend::Postgres => Arc::new(PostgresFeedbackStore::connect(config).await?),
        Backend::Memory => Arc::new(MemoryFeedbackStore::new()),
    };
    info!("Feedback storage ready: {} (table {})", sink.name(), config.table);
    Ok(sink)
}

impl FeedbackSink for MemoryFeedbackStore {
    fn insert_feedback<'a>(&'a self, record: &'a FeedbackRecord) -> BoxFuture<'a, Result<Vec<FeedbackRecord>>> {
        async move { self.insert(record) }.boxed()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

impl FeedbackSink for SupabaseClient {
    fn insert_feedback<'a>(&'a self, record: &'a FeedbackRecord) -> BoxFuture<'a, Result<Vec<FeedbackRecord>>> {
        self.insert(record).boxed()
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}

impl FeedbackSink for PostgresFeedbackStore {
    fn insert_feedback<'a>(&'a self, record: &'a FeedbackRecord) -> BoxFuture<'a, Result<Vec<FeedbackRecord>>> {
        self.insert(record).boxed()
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
