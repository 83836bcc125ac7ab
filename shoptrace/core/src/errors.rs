use thiserror::Error;

use crate::metrics::InstrumentKind;

/// Errors raised by the telemetry kernel itself.
///
/// Only `InstrumentKind` ever reaches callers, and only at registration
/// time. Everything that can go wrong after startup is logged and swallowed
/// inside the kernel so telemetry can never change a business outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    /// An instrument name was re-registered with a conflicting kind.
    #[error("instrument `{name}` already registered as {registered}, requested {requested}")]
    InstrumentKind {
        name: String,
        registered: InstrumentKind,
        requested: InstrumentKind,
    },

    /// A write was attempted on a span that has already been sealed.
    #[error("span has already been sealed")]
    SpanSealed,
}
