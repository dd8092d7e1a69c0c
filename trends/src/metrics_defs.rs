//! Common types and definitions for metrics.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

impl MetricType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "Counter",
            MetricType::Gauge => "Gauge",
            MetricType::Histogram => "Histogram",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

pub const UPSTREAM_REQUESTS: MetricDef = MetricDef {
    name: "upstream.requests",
    metric_type: MetricType::Counter,
    description: "Interest-over-time queries sent upstream. Tagged with geo.",
};

pub const GEOS_SKIPPED: MetricDef = MetricDef {
    name: "aggregate.geos_skipped",
    metric_type: MetricType::Counter,
    description: "Geos dropped from a response. Tagged with reason (error, empty).",
};

pub const ALL_METRICS: &[MetricDef] = &[UPSTREAM_REQUESTS, GEOS_SKIPPED];
