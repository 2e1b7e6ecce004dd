//! Wait command handler
//!
//! Attaches to an operation that was started elsewhere and polls it until it
//! completes.

use anyhow::Result;
use clap::ValueEnum;
use lro_client::{
    AsyncOperationPoller, DeletePoller, LocationPoller, ProvisioningStatePoller,
    ResourceManagerClient,
};
use lro_core::{Poller, PollerType};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::output::{print_failure, print_success};

/// Long-running operation conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Convention {
    /// Poll an Azure-AsyncOperation URL and read its `status`
    AsyncOperation,
    /// Poll a Location URL until it stops returning 202
    Location,
    /// Poll a resource until its provisioningState is terminal
    ProvisioningState,
    /// Poll a deleted resource until it returns 404
    Delete,
}

impl Convention {
    /// Builds the poller for this convention
    pub fn poller_type(self, client: &ResourceManagerClient, url: &str) -> Arc<dyn PollerType> {
        let url = client.resolve(url);
        match self {
            Convention::AsyncOperation => Arc::new(AsyncOperationPoller::new(client.clone(), url)),
            Convention::Location => Arc::new(LocationPoller::new(client.clone(), url)),
            Convention::ProvisioningState => {
                Arc::new(ProvisioningStatePoller::new(client.clone(), url))
            }
            Convention::Delete => Arc::new(DeletePoller::new(client.clone(), url)),
        }
    }
}

/// Poll `url` until the operation completes
pub async fn wait(config: &Config, url: &str, convention: Convention) -> Result<()> {
    let client = config.client()?;
    let poller_type = convention.poller_type(&client, url);
    let mut poller = Poller::new(
        poller_type,
        config.initial_delay,
        config.max_dropped_connections,
    );

    info!("Waiting for {} ({:?})", url, convention);

    match poller.poll_until_done(&config.context()).await {
        Ok(()) => {
            print_success(poller.latest_status(), poller.latest_response().as_ref());
            Ok(())
        }
        Err(e) => {
            print_failure(&e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_parses_from_kebab_case() {
        assert_eq!(
            Convention::from_str("async-operation", false).unwrap(),
            Convention::AsyncOperation
        );
        assert_eq!(
            Convention::from_str("provisioning-state", false).unwrap(),
            Convention::ProvisioningState
        );
        assert!(Convention::from_str("body", false).is_err());
    }
}
