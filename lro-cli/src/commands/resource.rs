//! Resource command handlers
//!
//! Submits PUT and DELETE requests and polls them to completion.

use anyhow::{Context, Result};
use lro_client::OperationError;
use lro_core::PollingStatus;
use std::path::Path;

use crate::config::Config;
use crate::output::{print_failure, print_success};

/// Create or update the resource at `path` with the payload in `body_file`
pub async fn put(config: &Config, path: &str, body_file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(body_file)
        .with_context(|| format!("Failed to read {}", body_file.display()))?;
    let body: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", body_file.display()))?;

    let client = config.client()?;
    let outcome = client
        .create_or_update_then_poll(&config.context(), path, &body)
        .await;

    report(outcome)
}

/// Delete the resource at `path`
pub async fn delete(config: &Config, path: &str) -> Result<()> {
    let client = config.client()?;
    let outcome = client.delete_then_poll(&config.context(), path).await;

    report(outcome)
}

fn report(outcome: std::result::Result<lro_core::ResponseSnapshot, OperationError>) -> Result<()> {
    match outcome {
        Ok(response) => {
            print_success(PollingStatus::Succeeded, Some(&response));
            Ok(())
        }
        Err(e) => {
            if let Some(polling_error) = e.polling_error() {
                print_failure(polling_error);
            }
            Err(e.into())
        }
    }
}
