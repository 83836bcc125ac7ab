//! Instrument cells: the shared aggregation state behind counter and
//! histogram handles.
//!
//! Cells are created once at registration and shared by every worker;
//! recording is an atomic add or a short lock, never exporter I/O.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use shoptrace_proto::dto::{
    BucketCount, CounterSeries, CounterSnapshot, HistogramSeries, HistogramSnapshot,
};

/// Default histogram bucket upper bounds, the OpenTelemetry SDK defaults.
static DEFAULT_BUCKET_BOUNDS: Lazy<Vec<f64>> = Lazy::new(|| {
    vec![
        0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2500.0, 5000.0,
        7500.0, 10000.0,
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    Counter,
    Histogram,
}

impl Display for InstrumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentKind::Counter => f.write_str("counter"),
            InstrumentKind::Histogram => f.write_str("histogram"),
        }
    }
}

// Tag sets are identified by their sorted pairs, so `a=1,b=2` and `b=2,a=1`
// land in the same series.
type SeriesKey = Vec<(String, String)>;

fn normalize_tags(tags: &[(&str, &str)]) -> SeriesKey {
    let mut key: SeriesKey = tags
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// Monotonic counter state: a lock-free running total plus per-tag-set
/// sub-totals behind a short write lock.
#[derive(Debug, Default)]
pub(crate) struct CounterCell {
    total: AtomicU64,
    series: RwLock<BTreeMap<SeriesKey, u64>>,
}

impl CounterCell {
    pub(crate) fn add(&self, amount: u64, tags: &[(&str, &str)]) {
        self.total.fetch_add(amount, Ordering::Relaxed);
        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        *series.entry(normalize_tags(tags)).or_insert(0) += amount;
    }

    pub(crate) fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self, name: &str, description: &str) -> CounterSnapshot {
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        CounterSnapshot {
            name: name.to_string(),
            description: description.to_string(),
            total: self.total(),
            series: series
                .iter()
                .map(|(tags, value)| CounterSeries {
                    tags: tags.clone(),
                    value: *value,
                })
                .collect(),
        }
    }
}

#[derive(Debug)]
struct HistogramState {
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    bucket_counts: Vec<u64>,
    series: BTreeMap<SeriesKey, (u64, f64)>,
}

/// Histogram state: aggregate plus per-tag-set (count, sum) pairs, all
/// behind one short lock.
#[derive(Debug)]
pub(crate) struct HistogramCell {
    bounds: Vec<f64>,
    state: RwLock<HistogramState>,
}

impl HistogramCell {
    pub(crate) fn new() -> Self {
        let bounds = DEFAULT_BUCKET_BOUNDS.clone();
        let state = HistogramState {
            count: 0,
            sum: 0.0,
            min: None,
            max: None,
            bucket_counts: vec![0; bounds.len() + 1],
            series: BTreeMap::new(),
        };
        HistogramCell {
            bounds,
            state: RwLock::new(state),
        }
    }

    pub(crate) fn record(&self, value: f64, tags: &[(&str, &str)]) {
        let bucket = self
            .bounds
            .iter()
            .position(|bound| value <= *bound)
            .unwrap_or(self.bounds.len());

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.count += 1;
        state.sum += value;
        state.min = Some(state.min.map_or(value, |m| m.min(value)));
        state.max = Some(state.max.map_or(value, |m| m.max(value)));
        state.bucket_counts[bucket] += 1;
        let entry = state.series.entry(normalize_tags(tags)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += value;
    }

    pub(crate) fn snapshot(
        &self,
        name: &str,
        description: &str,
        unit: Option<&str>,
    ) -> HistogramSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let buckets = state
            .bucket_counts
            .iter()
            .enumerate()
            .map(|(i, count)| BucketCount {
                upper_bound: self.bounds.get(i).copied(),
                count: *count,
            })
            .collect();
        HistogramSnapshot {
            name: name.to_string(),
            description: description.to_string(),
            unit: unit.map(str::to_string),
            count: state.count,
            sum: state.sum,
            min: state.min,
            max: state.max,
            buckets,
            series: state
                .series
                .iter()
                .map(|(tags, (count, sum))| HistogramSeries {
                    tags: tags.clone(),
                    count: *count,
                    sum: *sum,
                })
                .collect(),
        }
    }
}

/// Handle to a registered counter. Cheap to clone, safe to share.
#[derive(Clone, Debug)]
pub struct CounterHandle {
    pub(crate) cell: Arc<CounterCell>,
}

/// Handle to a registered histogram. Cheap to clone, safe to share.
#[derive(Clone, Debug)]
pub struct HistogramHandle {
    pub(crate) cell: Arc<HistogramCell>,
}
