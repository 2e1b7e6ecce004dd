//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod resource;
mod wait;

pub use wait::Convention;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Wait for an operation that is already running
    Wait {
        /// Operation URL (Azure-AsyncOperation or Location header value, or the resource URL)
        url: String,

        /// How the operation reports its progress
        #[arg(long, value_enum, default_value_t = Convention::AsyncOperation)]
        convention: Convention,
    },
    /// Create or update a resource and wait for it to finish provisioning
    Put {
        /// Resource path (e.g., /subscriptions/.../resourceGroups/example)
        path: String,

        /// JSON file containing the resource payload
        #[arg(long)]
        body: PathBuf,
    },
    /// Delete a resource and wait for the deletion to complete
    Delete {
        /// Resource path
        path: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Wait { url, convention } => wait::wait(config, &url, convention).await,
        Commands::Put { path, body } => resource::put(config, &path, &body).await,
        Commands::Delete { path } => resource::delete(config, &path).await,
    }
}
