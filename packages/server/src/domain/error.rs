//! Domain-level error types.

use thiserror::Error;

/// Errors surfaced by compound registry operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The connection was unregistered before the operation ran; a late
    /// message racing a disconnect lands here and is ignored by callers.
    #[error("connection '{0}' is not registered")]
    StaleConnection(String),
}
