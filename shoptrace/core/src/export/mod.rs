//! Span export.
//!
//! `offer` is called from the hot path of every traced operation, so sinks
//! must be cheap and must never block on transport I/O; anything slow
//! belongs behind the buffer, in whatever drains it.

use std::sync::{Mutex, PoisonError};

use crate::trace::Span;

/// Destination for finished spans.
pub trait SpanSink: Send + Sync {
    /// Accepts a sealed span. Must not block or fail observably.
    fn offer(&self, span: Span);

    /// Removes and returns everything buffered so far.
    fn drain(&self) -> Vec<Span>;
}

/// Buffers finished spans in memory until drained.
///
/// The default backing for tests, the demo binary, and any embedder that
/// ships spans out of process on its own schedule.
#[derive(Debug, Default)]
pub struct MemorySink {
    spans: Mutex<Vec<Span>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn len(&self) -> usize {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpanSink for MemorySink {
    fn offer(&self, span: Span) {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(span);
    }

    fn drain(&self) -> Vec<Span> {
        std::mem::take(&mut self.spans.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Emits one debug log line per finished span and keeps nothing.
#[derive(Debug, Default)]
pub struct LogSink;

impl SpanSink for LogSink {
    fn offer(&self, span: Span) {
        let duration_us = span
            .duration()
            .map(|d| d.as_micros() as u64)
            .unwrap_or_default();
        log::debug!(
            "span closed: name={} trace_id={} span_id={} status={:?} duration_us={duration_us}",
            span.name,
            span.trace_id,
            span.span_id,
            span.status,
        );
    }

    fn drain(&self) -> Vec<Span> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Span;

    fn sealed(name: &str) -> Span {
        let mut span = Span::new_root(name);
        span.mark_ok();
        span.seal();
        span
    }

    #[test]
    fn test_memory_sink_buffers_until_drained() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.offer(sealed("a"));
        sink.offer(sealed("b"));
        assert_eq!(sink.len(), 2);

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].name, "a");
        assert!(sink.is_empty(), "Drain must leave the buffer empty");
    }

    #[test]
    fn test_log_sink_keeps_nothing() {
        let sink = LogSink;
        sink.offer(sealed("a"));
        assert!(sink.drain().is_empty());
    }
}
