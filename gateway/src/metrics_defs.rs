use trends::metrics_defs::{MetricDef, MetricType};

pub const TRENDS_REQUESTS: MetricDef = MetricDef {
    name: "http.trends_requests",
    metric_type: MetricType::Counter,
    description: "Requests hitting /trends, counted before validation.",
};

pub const ALL_METRICS: &[MetricDef] = &[TRENDS_REQUESTS];
