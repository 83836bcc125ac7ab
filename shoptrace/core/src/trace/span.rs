use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use shoptrace_proto::types::TagValue;

use crate::errors::TelemetryError;

// Global atomic counters for generating unique IDs.
static NEXT_TRACE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SPAN_ID: AtomicU64 = AtomicU64::new(1);

/// Obtain a numeric thread identifier using platform facilities where possible.
///
/// On macOS we use `pthread_self()` which is stable per thread lifetime.
/// On Linux we use the `gettid` syscall for the OS thread id.
/// On other platforms we hash the opaque `std::thread::ThreadId` debug output
/// to yield a reproducible u64 within process lifetime.
fn current_thread_id() -> u64 {
    #[cfg(target_os = "macos")]
    unsafe {
        return libc::pthread_self() as u64;
    }
    #[cfg(target_os = "linux")]
    unsafe {
        return libc::syscall(libc::SYS_gettid) as u64;
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let tid = std::thread::current().id();
        let mut h = DefaultHasher::new();
        // ThreadId only implements Debug; convert to string and hash.
        format!("{:?}", tid).hash(&mut h);
        h.finish()
    }
}

// --- Timestamp ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u128);

impl Timestamp {
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or_else(
                |_| Timestamp(0), // Fallback for systems where time might be before UNIX_EPOCH
                |d| Timestamp(d.as_nanos()),
            )
    }

    pub fn duration_since(&self, earlier: Timestamp) -> Duration {
        if self.0 > earlier.0 {
            Duration::from_nanos((self.0 - earlier.0) as u64)
        } else {
            Duration::from_nanos(0) // Avoid panic if earlier is not actually earlier
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag(pub String, pub TagValue);

impl Tag {
    pub fn new<K: Into<String>, V: Into<TagValue>>(key: K, value: V) -> Self {
        Tag(key.into(), value.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> &TagValue {
        &self.1
    }
}

// --- Span Status ---
/// Outcome of a traced operation.
///
/// A span starts `Unset` and is marked `Ok` or `Error` before it is sealed;
/// a span sealed while still `Unset` (the wrapped work never reported an
/// outcome, e.g. it unwound) is recorded as `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanStatus {
    Unset,
    Ok,
    Error,
}

/// A timed record of one logical operation.
///
/// Mutable only while open; `seal` fixes the end timestamp and makes every
/// later write fail with `TelemetryError::SpanSealed`.
#[derive(Debug, Clone)]
pub struct Span {
    // --- identity ---
    pub trace_id: u64,
    pub span_id: u64,
    pub parent_id: Option<u64>,
    pub thread_id: u64, // stable numeric id for the originating thread

    pub name: String,

    // --- timing ---
    pub start: Timestamp,
    pub end: Option<Timestamp>,

    // --- outcome ---
    pub status: SpanStatus,
    pub tags: Vec<Tag>,
    pub error: Option<String>,
}

impl Span {
    /// Creates a new root span (starts a new trace).
    pub fn new_root<N: Into<String>>(name: N) -> Self {
        let trace_id = NEXT_TRACE_ID.fetch_add(1, Ordering::Relaxed);
        let span_id = NEXT_SPAN_ID.fetch_add(1, Ordering::Relaxed);

        Span {
            trace_id,
            span_id,
            parent_id: None,
            thread_id: current_thread_id(),
            name: name.into(),
            start: Timestamp::now(),
            end: None,
            status: SpanStatus::Unset,
            tags: vec![],
            error: None,
        }
    }

    /// Creates a new child span within an existing trace.
    pub fn new_child<N: Into<String>>(parent: &Span, name: N) -> Self {
        let span_id = NEXT_SPAN_ID.fetch_add(1, Ordering::Relaxed);

        Span {
            trace_id: parent.trace_id,
            span_id,
            parent_id: Some(parent.span_id),
            thread_id: current_thread_id(), // child bound to the current executing thread
            name: name.into(),
            start: Timestamp::now(),
            end: None,
            status: SpanStatus::Unset,
            tags: vec![],
            error: None,
        }
    }

    /// Adds a tag to this span.
    ///
    /// Returns an error if the span has already been sealed.
    pub fn set_tag<K: Into<String>, V: Into<TagValue>>(
        &mut self,
        key: K,
        value: V,
    ) -> Result<(), TelemetryError> {
        if self.end.is_some() {
            return Err(TelemetryError::SpanSealed);
        }
        self.tags.push(Tag::new(key, value));
        Ok(())
    }

    /// Marks the span outcome as successful. No-op once sealed.
    pub fn mark_ok(&mut self) {
        if self.end.is_none() {
            self.status = SpanStatus::Ok;
        }
    }

    /// Records a failure outcome with the error's message. No-op once sealed.
    pub fn mark_error<M: Into<String>>(&mut self, message: M) {
        if self.end.is_none() {
            self.status = SpanStatus::Error;
            self.error = Some(message.into());
        }
    }

    /// Fixes the end timestamp, exactly once.
    ///
    /// A span sealed while its status is still `Unset` never had an outcome
    /// reported, which means the wrapped work aborted.
    pub fn seal(&mut self) {
        if self.end.is_some() {
            return;
        }
        if self.status == SpanStatus::Unset {
            self.status = SpanStatus::Error;
            self.error = Some("aborted".to_string());
        }
        self.end = Some(Timestamp::now());
    }

    /// Returns the value of the first tag with the given key.
    pub fn tag_value(&self, key: &str) -> Option<&TagValue> {
        self.tags.iter().find(|tag| tag.0 == key).map(Tag::value)
    }

    /// Returns the duration of this span if it has been sealed.
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|et| et.duration_since(self.start))
    }

    /// Checks if this span has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.end.is_some()
    }
}
