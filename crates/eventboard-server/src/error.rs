//! Server error types.

use eventboard_providers::ProviderError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the publish loop.
///
/// Publish failures are not among them; they are logged per cycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Authentication or event fetch failed.
    #[error("calendar error: {0}")]
    Provider(#[from] ProviderError),
}
