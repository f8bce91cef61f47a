//! Dense square matrix multiplication farmed out to a pool of worker
//! processes over blocking point-to-point messages. Rank 0 acts as the
//! manager, every other rank computes one block of rows of the product.

use thiserror::Error;

pub mod local;
pub mod matrix;
pub mod partition;
pub mod root;
pub mod transport;
pub mod worker;

#[cfg(feature = "mpi")]
pub mod mpi_link;

/// Everything that can abort a multiplication run. There are no retries:
/// each of these is either a precondition the launcher has to guarantee or
/// a fatal protocol violation.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before any message is exchanged.
    #[error("configuration error: {0}")]
    Config(String),

    /// A payload's declared size disagrees with the buffer prepared for it.
    #[error("payload size mismatch: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    /// A send or receive has no matching participant.
    #[error("no messaging partner: {0}")]
    PartnerUnavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed input: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, Error>;
