use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use log::{error, info};
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

use super::{FeedbackRecord, PersistenceError, Result};
use crate::config::FeedbackConfig;
use crate::form::FormField;

/// Writes feedback straight into PostgreSQL, for deployments without the REST layer.
pub struct PostgresFeedbackStore {
    pool: Pool,
    insert_sql: String,
}

impl PostgresFeedbackStore {
    pub async fn connect(config: &FeedbackConfig) -> Result<Self> {
        info!(
            "Connecting to database: {}@{}:{}/{}",
            config.db_user, config.db_host, config.db_port, config.db_name
        );

        let mut cfg = Config::new();
        cfg.host = Some(config.db_host.clone());
        cfg.port = Some(config.db_port);
        cfg.dbname = Some(config.db_name.clone());
        cfg.user = Some(config.db_user.clone());
        cfg.password = Some(config.db_password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| PersistenceError::ConnectionFailed(format!("Pool creation failed: {}", e)))?;

        // Test connection
        let _client = pool
            .get()
            .await
            .map_err(|e| PersistenceError::ConnectionFailed(format!("Connection test failed: {}", e)))?;

        info!("Database connection established successfully");

        Ok(Self {
            pool,
            insert_sql: insert_statement(&config.table),
        })
    }

    pub async fn insert(&self, record: &FeedbackRecord) -> Result<Vec<FeedbackRecord>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| PersistenceError::ConnectionFailed(e.to_string()))?;

        let texts = record.text_values();
        let teaching_style_rating = i32::from(record.teaching_style_rating);
        let overall_rating = i32::from(record.overall_rating);

        let mut params: Vec<&(dyn ToSql + Sync)> = texts.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        params.push(&teaching_style_rating);
        params.push(&overall_rating);

        let rows = client.query(self.insert_sql.as_str(), &params).await.map_err(|e| {
            error!("Failed to insert feedback for {}: {}", record.enrollment_id, e);
            // Surface the server's own message (constraint violations etc.) to the user.
            match e.as_db_error() {
                Some(db_error) => PersistenceError::Rejected(db_error.message().to_string()),
                None => PersistenceError::ConnectionFailed(e.to_string()),
            }
        })?;

        info!("Inserted {} feedback row(s) for {}", rows.len(), record.enrollment_id);
        rows.iter().map(record_from_row).collect()
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn insert_statement(table: &str) -> String {
    let columns = FormField::ALL
        .iter()
        .map(|field| quote_ident(field.column()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=FormField::ALL.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quote_ident(table),
        columns,
        placeholders,
        columns
    )
}

fn record_from_row(row: &Row) -> Result<FeedbackRecord> {
    let text = |idx: usize| -> Result<String> {
        row.try_get::<_, String>(idx)
            .map_err(|e| PersistenceError::InvalidResponse(format!("column {}: {}", idx, e)))
    };
    let rating = |idx: usize| -> Result<u8> {
        let value = row
            .try_get::<_, i32>(idx)
            .map_err(|e| PersistenceError::InvalidResponse(format!("column {}: {}", idx, e)))?;
        u8::try_from(value)
            .map_err(|_| PersistenceError::InvalidResponse(format!("rating out of range: {}", value)))
    };

    Ok(FeedbackRecord {
        full_name: text(0)?,
        enrollment_id: text(1)?,
        mentor1_name: text(2)?,
        mentor2_name: text(3)?,
        batch: text(4)?,
        cohort: text(5)?,
        mentor1_feedback: text(6)?,
        mentor2_feedback: text(7)?,
        overall_feedback: text(8)?,
        challenges_faced: text(9)?,
        suggestions_to_improve: text(10)?,
        teaching_style_rating: rating(11)?,
        overall_rating: rating(12)?,
    })
}
