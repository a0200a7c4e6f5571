//! Sync-layer errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("audit source failed: {0}")]
    Source(String),

    #[error("report sink failed: {0}")]
    Sink(String),

    #[error("calendar feed failed: {0}")]
    Feed(#[from] creg_sla::FeedError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
