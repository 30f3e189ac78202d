//! Development console for the support-relay routing core.
//!
//! Reads newline-delimited JSON commands from stdin and writes responses and
//! inbox events to stdout. Logs go to stderr.

mod assistant;
mod command;
mod config;
mod error;

use crate::command::Console;
use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use rootcause::prelude::Report;
use serde_json::Value as JsonValue;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Report<ConsoleError>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ConsoleConfig::from_env().map_err(|e| ConsoleError::Config {
        details: e.to_string(),
    })?;
    config
        .routing
        .validate()
        .map_err(|e| ConsoleError::InvalidConfig {
            details: e.to_string(),
        })?;
    tracing::info!(
        assistant_id = %config.routing.assistant_id,
        admin_id = %config.routing.admin_id,
        mode = ?config.assistant.mode,
        "Loaded configuration"
    );

    let (output, pending) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_output(pending));

    let console = Console::new(
        &config,
        assistant::build_gateway(&config.assistant),
        output.clone(),
    );
    let result = read_commands(&console, &output).await;

    // Closing every sender lets the writer drain and stop.
    drop(console);
    drop(output);
    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(e) => {
            return Err(ConsoleError::Io {
                details: e.to_string(),
            }
            .into());
        }
    }

    tracing::info!("console stopped");
    result
}

async fn read_commands(
    console: &Console,
    output: &mpsc::UnboundedSender<JsonValue>,
) -> Result<(), Report<ConsoleError>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|e| ConsoleError::Io {
                details: e.to_string(),
            })?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = console.execute_line(line).await;
        if output.send(response).is_err() {
            return Err(ConsoleError::Io {
                details: "output writer stopped".to_string(),
            }
            .into());
        }
    }
}

async fn write_output(mut pending: mpsc::UnboundedReceiver<JsonValue>) -> Result<(), ConsoleError> {
    let mut stdout = tokio::io::stdout();
    while let Some(value) = pending.recv().await {
        let mut line = value.to_string();
        line.push('\n');
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ConsoleError::Io {
                details: e.to_string(),
            })?;
        stdout.flush().await.map_err(|e| ConsoleError::Io {
            details: e.to_string(),
        })?;
    }
    Ok(())
}
