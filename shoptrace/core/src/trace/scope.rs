//! Scoped span execution.
//!
//! `SpanScope::run` is the single place the open/tag/close span lifecycle
//! lives; business operations wrap themselves in it instead of repeating
//! the pattern per call site.

use std::fmt::Display;
use std::sync::Arc;

use crate::context::TelemetryContext;
use crate::export::SpanSink;
use crate::trace::ambient::{self, ActiveSpan};
use crate::trace::span::Span;

/// One span-wrapped unit of work, bound to a telemetry context.
///
/// Obtained from [`TelemetryContext::scope`]; consumed by [`run`](Self::run).
pub struct SpanScope<'a> {
    ctx: &'a TelemetryContext,
    name: String,
}

impl<'a> SpanScope<'a> {
    pub(crate) fn new(ctx: &'a TelemetryContext, name: String) -> Self {
        SpanScope { ctx, name }
    }

    /// Runs `body` inside a span.
    ///
    /// The span becomes the ambient span for the duration of the call (a
    /// child of the previous ambient span, if any), is marked `Ok` on
    /// `Ok(_)` and `Error` with the error's message on `Err(_)`, and is
    /// sealed and handed to the exporter sink on every exit path, panics
    /// included. The body's result is returned unchanged; telemetry never
    /// masks a business outcome.
    pub fn run<T, E, F>(self, body: F) -> Result<T, E>
    where
        F: FnOnce(&ActiveSpan) -> Result<T, E>,
        E: Display,
    {
        let span = match ambient::current_span() {
            Some(parent) => parent.child(self.name),
            None => Span::new_root(self.name),
        };
        let active = ActiveSpan::new(span);
        ambient::push(&active);
        let _guard = ScopeGuard {
            span: active.clone(),
            sink: self.ctx.sink(),
        };

        let result = body(&active);
        match &result {
            Ok(_) => active.mark_ok(),
            Err(e) => active.mark_error(e.to_string()),
        }
        result
    }
}

// Restores the previous ambient span and seals exactly once, whether the
// body returned, failed, or unwound.
struct ScopeGuard {
    span: ActiveSpan,
    sink: Arc<dyn SpanSink>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ambient::pop();
        let finished = self.span.seal();
        self.sink.offer(finished);
    }
}
