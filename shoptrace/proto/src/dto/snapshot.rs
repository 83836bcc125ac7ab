use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time aggregate of every registered instrument.
///
/// Produced on demand by the telemetry context and at teardown; this is the
/// shape exporter backends and the demo binary consume.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MetricsSnapshot {
    pub service: String,
    pub version: String,
    pub captured_at: DateTime<Utc>,
    pub counters: Vec<CounterSnapshot>,
    pub histograms: Vec<HistogramSnapshot>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CounterSnapshot {
    pub name: String,
    pub description: String,
    /// Sum over all tag sets.
    pub total: u64,
    pub series: Vec<CounterSeries>,
}

/// One tagged sub-aggregate of a counter.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CounterSeries {
    pub tags: Vec<(String, String)>,
    pub value: u64,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct HistogramSnapshot {
    pub name: String,
    pub description: String,
    pub unit: Option<String>,
    pub count: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub buckets: Vec<BucketCount>,
    pub series: Vec<HistogramSeries>,
}

/// Samples at or below `upper_bound`; `None` is the overflow bucket.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct BucketCount {
    pub upper_bound: Option<f64>,
    pub count: u64,
}

/// One tagged sub-aggregate of a histogram.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct HistogramSeries {
    pub tags: Vec<(String, String)>,
    pub count: u64,
    pub sum: f64,
}
