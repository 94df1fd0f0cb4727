use log::{debug, error, info};
use reqwest::{Client, Request, StatusCode};
use serde::Deserialize;
use url::Url;

use super::{FeedbackRecord, PersistenceError, Result};
use crate::config::FeedbackConfig;

/// Error body returned by PostgREST when an insert is refused.
#[derive(Deserialize)]
struct PostgrestError {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
    code: Option<String>,
}

/// Inserts feedback through the Supabase REST endpoint of the feedback table.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    endpoint: Url,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &FeedbackConfig) -> Result<Self> {
        let mut endpoint = Url::parse(&config.supabase_url)
            .map_err(|e| PersistenceError::ConnectionFailed(format!("Invalid Supabase URL: {}", e)))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| PersistenceError::ConnectionFailed("Supabase URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["rest", "v1", config.table.as_str()]);

        Ok(Self {
            client: Client::new(),
            endpoint,
            anon_key: config.supabase_anon_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub(crate) fn build_request(&self, record: &FeedbackRecord) -> reqwest::Result<Request> {
        self.client
            .post(self.endpoint.clone())
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(&[record])
            .build()
    }

    pub async fn insert(&self, record: &FeedbackRecord) -> Result<Vec<FeedbackRecord>> {
        let request = self
            .build_request(record)
            .map_err(|e| PersistenceError::ConnectionFailed(e.to_string()))?;

        info!("Sending feedback for {} to {}", record.enrollment_id, self.endpoint);

        let response = self.client.execute(request).await.map_err(|e| {
            error!("Supabase request failed: {}", e);
            PersistenceError::ConnectionFailed(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PersistenceError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let detail = error_detail(status, &body);
            error!("Supabase refused feedback insert ({}): {}", status, detail);
            return Err(PersistenceError::Rejected(detail));
        }

        let rows = decode_rows(&body)?;
        info!("Supabase stored {} feedback row(s)", rows.len());
        Ok(rows)
    }
}

fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<PostgrestError>(body) {
        if let Some(message) = err.message.filter(|m| !m.trim().is_empty()) {
            debug!(
                "PostgREST error code={:?} details={:?} hint={:?}",
                err.code,
                err.details,
                err.hint
            );
            return message;
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}

fn decode_rows(body: &str) -> Result<Vec<FeedbackRecord>> {
    // `Prefer: return=representation` can be ignored by proxies, leaving a bare 201.
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body).map_err(|e| PersistenceError::InvalidResponse(e.to_string()))
}
