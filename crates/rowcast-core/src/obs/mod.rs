//! Observability: per-operation counters and the sink abstraction.
//!
//! Engine logic never touches counter state directly; all
//! instrumentation flows through `MetricsEvent` and `MetricsSink`.

pub(crate) mod sink;

pub use sink::{
    ExecKind, MetricsEvent, MetricsReport, MetricsSink, OpCounters, metrics_report,
    metrics_reset_all, with_metrics_sink,
};
