use tally_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode last-reset marker: {0}")]
    Encoding(String),
}
