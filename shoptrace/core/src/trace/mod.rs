mod ambient;
mod scope;
mod span;

pub use ambient::{current_span, tag, ActiveSpan};
pub use scope::SpanScope;
pub use span::{Span, SpanStatus, Tag, Timestamp};
