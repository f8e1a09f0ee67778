//! HTTP client for the Callbox ingestion endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Request timeout applied to every outbound post.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for posting conversation turns to the callback receiver.
pub struct CallbackClient {
    client: Client,
    endpoint_url: String,
    api_key: Option<String>,
}

impl CallbackClient {
    /// Creates a new client for the given ingestion endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint_url: endpoint_url.to_string(),
            api_key,
        })
    }

    /// Posts one conversation turn and returns the receiver's acknowledgement.
    ///
    /// A connection failure, a timeout, or a non-success status aborts the
    /// turn; the client never retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn send_turn(&self, payload: &TurnPayload) -> Result<CallbackAck> {
        tracing::debug!(turn_id = %payload.turn_id, "Posting conversation turn");

        let mut req = self.client.post(&self.endpoint_url).json(payload);
        if let Some(key) = &self.api_key {
            req = req.header("X-API-Key", key);
        }

        let response = req.send().await.context("Failed to send request")?;

        if response.status().is_success() {
            response.json().await.context("Failed to parse response")
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({status}): {body}")
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// One conversation turn posted to the strict ingestion endpoint.
#[derive(Debug, Serialize)]
pub struct TurnPayload {
    /// Synthetic answer text for this turn.
    pub agent_answer: String,
    /// Session id shared by every turn of one producer run.
    pub session_id: String,
    /// Turn tag, `turn-001` style.
    pub turn_id: String,
    /// Producer-identifying metadata.
    pub metadata: serde_json::Value,
}

/// Receiver acknowledgement for an accepted callback.
#[derive(Debug, Deserialize)]
pub struct CallbackAck {
    /// Always `"success"` on the success path.
    pub status: String,
    /// Receiver-side ingestion timestamp.
    pub received_at: DateTime<Utc>,
    /// Sequence id the receiver assigned to the stored record.
    pub callback_id: u64,
}
