use thiserror::Error;

/// Errors raised when converting between `TagValue` and concrete types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtoError {
    /// The value does not hold (and cannot be widened to) the requested type.
    #[error("wrong tag value type")]
    WrongValueType,
}
