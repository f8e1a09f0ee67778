//! # callbox-producer
//!
//! Synthetic user that drives the Callbox callback receiver.
//!
//! Every run plays a fixed two-turn conversation script against the strict
//! ingestion endpoint: one fresh session id is generated up front, each turn
//! is posted as its own callback, and the receiver's acknowledgement is
//! printed. The first failed post aborts the run; there are no retries.
//!
//! ## Configuration
//!
//! The producer uses environment variables or command-line flags:
//!
//! - `CALLBACK_URL` - ingestion endpoint (default: `http://127.0.0.1:8008/api/v1/callback`)
//! - `APP_KEY` - shared secret sent as `X-API-Key` (header omitted when unset)

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// Progress is reported on stdout intentionally
#![allow(clippy::print_stdout)]

pub mod client;

use anyhow::Result;
use clap::Parser;
use uuid::Uuid;

use crate::client::{CallbackClient, TurnPayload};

/// Conversation script played by every producer run, one callback per turn.
pub const SCRIPT: [&str; 2] = [
    "Hello, this is a synthetic user.",
    "Can you confirm you received my message?",
];

/// Callbox producer - synthetic conversation driver.
#[derive(Debug, Parser)]
#[command(name = "callbox-producer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ingestion endpoint URL.
    #[arg(
        long,
        env = "CALLBACK_URL",
        default_value = "http://127.0.0.1:8008/api/v1/callback"
    )]
    pub endpoint_url: String,

    /// Shared secret sent as the `X-API-Key` header.
    #[arg(long, env = "APP_KEY")]
    pub api_key: Option<String>,
}

/// Plays the conversation script against the configured endpoint.
///
/// Turns are posted in script order with `turn-001`-style turn ids and a
/// session id shared across the run. Each acknowledgement is printed as
/// `Sent turn N: ...`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed, or if any
/// post fails, times out, or is rejected by the receiver.
pub async fn run(cli: &Cli) -> Result<()> {
    let client = CallbackClient::new(&cli.endpoint_url, cli.api_key.clone())?;
    let session_id = Uuid::new_v4().to_string();

    for (idx, text) in SCRIPT.iter().enumerate() {
        let turn_no = idx + 1;
        let payload = TurnPayload {
            agent_answer: (*text).to_string(),
            session_id: session_id.clone(),
            turn_id: format!("turn-{turn_no:03}"),
            metadata: serde_json::json!({"source": "synthetic_user"}),
        };

        let ack = client.send_turn(&payload).await?;
        println!(
            "Sent turn {turn_no}: callback_id={} received_at={}",
            ack.callback_id,
            ack.received_at.to_rfc3339()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_env_defaults() {
        let cli = Cli::parse_from([
            "callbox-producer",
            "--endpoint-url",
            "http://receiver.internal:9000/api/v1/callback",
            "--api-key",
            "secret-key",
        ]);

        assert_eq!(
            cli.endpoint_url,
            "http://receiver.internal:9000/api/v1/callback"
        );
        assert_eq!(cli.api_key.as_deref(), Some("secret-key"));
    }

    #[test]
    fn test_script_is_a_fixed_two_turn_conversation() {
        assert_eq!(SCRIPT.len(), 2);
        assert_eq!(SCRIPT[0], "Hello, this is a synthetic user.");
        assert_eq!(SCRIPT[1], "Can you confirm you received my message?");
    }
}
