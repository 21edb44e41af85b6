//! Shell error types

use dev_select::{DiscoveryError, SelectorError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("plugin {name} failed: {message}")]
    Plugin { name: String, message: String },

    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("selector actor task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
