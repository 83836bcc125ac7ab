use thiserror::Error;

/// Business-level failures of catalog operations.
///
/// These propagate unchanged through the telemetry wrapper; the span records
/// the message but the caller always sees the error itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The request failed input validation.
    #[error("{0}")]
    Validation(String),

    /// No product exists under the given id.
    #[error("product not found: {id}")]
    NotFound { id: u32 },
}
