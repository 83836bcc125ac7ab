//! The ambient span slot.
//!
//! Each worker thread carries its own stack of open spans so nested code can
//! tag the innermost one without threading span references through every
//! call. The slot is strictly thread-local; spans never leak between
//! workers.

use std::cell::RefCell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shoptrace_proto::types::TagValue;

use crate::trace::span::Span;

thread_local! {
    static SPAN_STACK: RefCell<Vec<ActiveSpan>> = const { RefCell::new(Vec::new()) };
}

/// Shared handle to a span that is still open.
///
/// Cloning is cheap; all clones refer to the same span. Writes through a
/// handle never fail observably: a write to a sealed span is logged and
/// dropped.
#[derive(Clone)]
pub struct ActiveSpan {
    inner: Arc<Mutex<Span>>,
}

impl ActiveSpan {
    pub(crate) fn new(span: Span) -> Self {
        ActiveSpan {
            inner: Arc::new(Mutex::new(span)),
        }
    }

    // A poisoned lock only means another thread panicked mid-write; the span
    // data itself is a plain record, so recover the guard and keep going.
    fn lock(&self) -> MutexGuard<'_, Span> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a tag to the span. Logged and dropped if the span is sealed.
    pub fn set_tag<K: Into<String>, V: Into<TagValue>>(&self, key: K, value: V) {
        let key = key.into();
        if let Err(e) = self.lock().set_tag(key.clone(), value) {
            log::warn!("dropping tag `{key}`: {e}");
        }
    }

    pub fn span_id(&self) -> u64 {
        self.lock().span_id
    }

    pub fn trace_id(&self) -> u64 {
        self.lock().trace_id
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    /// Returns a copy of the span's current state.
    pub fn snapshot(&self) -> Span {
        self.lock().clone()
    }

    pub(crate) fn child<N: Into<String>>(&self, name: N) -> Span {
        Span::new_child(&self.lock(), name)
    }

    pub(crate) fn mark_ok(&self) {
        self.lock().mark_ok();
    }

    pub(crate) fn mark_error(&self, message: String) {
        self.lock().mark_error(message);
    }

    /// Seals the span and returns the finished record for export.
    pub(crate) fn seal(&self) -> Span {
        let mut span = self.lock();
        span.seal();
        span.clone()
    }
}

pub(crate) fn push(span: &ActiveSpan) {
    SPAN_STACK.with(|stack| stack.borrow_mut().push(span.clone()));
}

pub(crate) fn pop() {
    SPAN_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

/// Gets the current active span, the innermost still-open one on this thread.
pub fn current_span() -> Option<ActiveSpan> {
    SPAN_STACK.with(|stack| stack.borrow().last().cloned())
}

/// Tags the ambient span if one is active; silently does nothing otherwise.
///
/// This is the hook business code uses to annotate whatever span happens to
/// wrap it, without holding a span reference.
pub fn tag<K: Into<String>, V: Into<TagValue>>(key: K, value: V) {
    if let Some(span) = current_span() {
        span.set_tag(key, value);
    }
}
