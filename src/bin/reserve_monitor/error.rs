//! Error types for the reserve monitor.

use prize_reserve::{error::ProviderError, reserve::ReconcileError};

/// Main error type for the reserve monitor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Reserve series not ready after the first refresh")]
    NotReady,
}

pub type Result<T> = std::result::Result<T, Error>;
