use thiserror::Error;

/// Error type for pool and contract operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool has begun shutting down and no longer accepts jobs.
    #[error("pool is closed")]
    PoolClosed,

    /// The job panicked while executing. Carries the panic message when
    /// one could be extracted from the payload.
    #[error("job panicked: {0}")]
    JobPanicked(String),

    /// The job was discarded during a hard stop before it could run.
    #[error("job was discarded before it could run")]
    Cancelled,
}

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
