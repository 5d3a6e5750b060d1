//! Process-wide metrics registry.
//!
//! Counter/gauge/histogram types with dynamic labels backed by `DashMap` and
//! atomics, so concurrent requests never serialize on a registry lock. Labels
//! are flattened into sorted key vectors to keep deterministic ordering.
//! Histogram buckets are fixed in microseconds to avoid floating point math on
//! the hot path; they are rendered in seconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Write side of the registry as seen by the instrumentation chain.
pub trait MetricsRecorder: Send + Sync {
    fn inc_in_flight(&self);
    fn dec_in_flight(&self);
    fn observe_duration(&self, labels: &[(&str, &str)], seconds: f64);
    fn inc_count(&self, labels: &[(&str, &str)]);
}

/// Shared handle passed into the middleware.
pub type SharedRecorder = Arc<dyn MetricsRecorder>;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_str(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

fn write_sample(out: &mut String, name: &str, labels: &str, value: impl std::fmt::Display) {
    if labels.is_empty() {
        let _ = writeln!(out, "{} {}", name, value);
    } else {
        let _ = writeln!(out, "{}{{{}}} {}", name, labels, value);
    }
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for a label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum across every label set.
    pub fn total(&self) -> u64 {
        self.map.iter().map(|r| r.value().load(Ordering::Relaxed)).sum()
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "counter");
        for r in self.map.iter() {
            write_sample(out, name, &label_str(r.key()), r.value().load(Ordering::Relaxed));
        }
    }
}

/// Unlabelled gauge.
#[derive(Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "gauge");
        write_sample(out, name, "", self.get());
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    /// Set to an absolute value.
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<i64> {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "gauge");
        for r in self.map.iter() {
            write_sample(out, name, &label_str(r.key()), r.value().load(Ordering::Relaxed));
        }
    }
}

// Fixed buckets in microseconds, rendered as seconds.
// 50ms, 100ms, 200ms, 300ms, 500ms
const BUCKETS: [(u64, &str); 5] = [
    (50_000, "0.05"),
    (100_000, "0.1"),
    (200_000, "0.2"),
    (300_000, "0.3"),
    (500_000, "0.5"),
];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: [AtomicU64; BUCKETS.len()],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicHistogram::default);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_micros.fetch_add(micros, Ordering::Relaxed);

        for (i, &(le, _)) in BUCKETS.iter().enumerate() {
            if micros <= le {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of observations for a label set.
    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "histogram");
        for r in self.map.iter() {
            let labels = label_str(r.key());
            let hist = r.value();
            let prefix = if labels.is_empty() { String::new() } else { format!("{},", labels) };

            for (i, &(_, le)) in BUCKETS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = hist.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0;
            write_sample(out, &format!("{}_sum", name), &labels, sum);
            write_sample(out, &format!("{}_count", name), &labels, count);
        }
    }
}

/// Labels of the static build-info gauge.
#[derive(Debug, Clone, Default)]
pub struct BuildLabels {
    pub version: String,
    pub branch: String,
    pub rustversion: String,
}

/// All metrics exported by the service.
#[derive(Default)]
pub struct ServiceMetrics {
    pub in_flight: Gauge,
    pub requests: CounterVec,
    pub duration: HistogramVec,
    pub build_info: GaugeVec,
}

impl ServiceMetrics {
    pub fn new(build: &BuildLabels) -> Self {
        let metrics = Self::default();
        metrics.build_info.set(
            &[
                ("version", &build.version),
                ("branch", &build.branch),
                ("rustversion", &build.rustversion),
            ],
            1,
        );
        metrics
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.in_flight.render(
            "in_flight_requests",
            "A gauge of requests currently being served by the wrapped handler",
            &mut out,
        );
        self.requests.render(
            "requests_total",
            "A counter for requests to the wrapped handler",
            &mut out,
        );
        self.duration.render(
            "request_duration_seconds",
            "A histogram of latencies for requests.",
            &mut out,
        );
        self.build_info.render(
            "faultline_build_info",
            "A metric with a constant '1' value labeled by attributes from which faultline was built.",
            &mut out,
        );
        out
    }
}

impl MetricsRecorder for ServiceMetrics {
    fn inc_in_flight(&self) {
        self.in_flight.inc();
    }

    fn dec_in_flight(&self) {
        self.in_flight.dec();
    }

    fn observe_duration(&self, labels: &[(&str, &str)], seconds: f64) {
        let d = Duration::try_from_secs_f64(seconds).unwrap_or_default();
        self.duration.observe(labels, d);
    }

    fn inc_count(&self, labels: &[(&str, &str)]) {
        self.requests.inc(labels);
    }
}
