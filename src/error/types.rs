use thiserror::Error;

use crate::zone::Zone;

/// Unified result type for the grid engine.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors surfaced by the grid engine.
///
/// The layout hot path (pinning, partitioning, header building, height sync)
/// degrades silently instead of erroring; these variants cover the
/// construction and terminal I/O boundary.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("duplicate column key `{0}`")]
    DuplicateKey(String),
    #[error("zone `{0}` has no registered surface")]
    ZoneNotFound(Zone),
    #[error("terminal backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
