//! `callbox-api` binary entrypoint.
//!
//! Loads configuration from environment variables, opens the durable
//! callback log, and starts the HTTP receiver.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::sync::Arc;

use anyhow::Result;

use callbox_api::config::Config;
use callbox_api::server::Server;
use callbox_core::observability::{LogFormat, init_logging};
use callbox_core::sink::JsonlSink;

fn choose_log_format(config: &Config) -> LogFormat {
    if config.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_logging(choose_log_format(&config));

    let log_path = config.log_path();
    let sink = JsonlSink::open(&log_path).await?;
    tracing::info!(path = %log_path.display(), "Durable callback log ready");

    let server = Server::with_record_sink(config, Arc::new(sink));
    server.serve().await?;
    Ok(())
}
