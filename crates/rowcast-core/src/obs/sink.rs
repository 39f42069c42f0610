//! Metrics sink boundary.
//!
//! The default sink writes into process-global counters. Tests and
//! embedders can install a scoped sink override on the current thread;
//! the previous sink is always restored, including on unwind.

use serde::Serialize;
use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::Rc,
    sync::{LazyLock, Mutex},
};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

static STATE: LazyLock<Mutex<MetricsState>> = LazyLock::new(|| Mutex::new(MetricsState::default()));

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Create,
    Store,
    Delete,
    Load,
    Query,
}

///
/// MetricsEvent
///

#[derive(Clone, Debug)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        type_name: String,
    },
    ExecFinish {
        kind: ExecKind,
        type_name: String,
        rows_touched: u64,
    },
    CascadeStep {
        kind: ExecKind,
        type_name: String,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// OpCounters
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct OpCounters {
    pub create_calls: u64,
    pub store_calls: u64,
    pub delete_calls: u64,
    pub load_calls: u64,
    pub query_calls: u64,
    pub rows_touched: u64,
    pub cascade_steps: u64,
}

impl OpCounters {
    fn record_start(&mut self, kind: ExecKind) {
        let slot = match kind {
            ExecKind::Create => &mut self.create_calls,
            ExecKind::Store => &mut self.store_calls,
            ExecKind::Delete => &mut self.delete_calls,
            ExecKind::Load => &mut self.load_calls,
            ExecKind::Query => &mut self.query_calls,
        };
        *slot = slot.saturating_add(1);
    }
}

///
/// MetricsReport
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct MetricsReport {
    pub ops: OpCounters,
    pub types: BTreeMap<String, OpCounters>,
}

#[derive(Default)]
struct MetricsState {
    ops: OpCounters,
    types: BTreeMap<String, OpCounters>,
}

///
/// GlobalMetricsSink
///
/// Default process-local sink; the concrete sink when no scoped
/// override is installed on the current thread.
///

struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        let mut state = STATE.lock().expect("metrics state lock poisoned");

        match event {
            MetricsEvent::ExecStart { kind, type_name } => {
                state.ops.record_start(kind);
                state.types.entry(type_name).or_default().record_start(kind);
            }
            MetricsEvent::ExecFinish {
                type_name,
                rows_touched,
                ..
            } => {
                state.ops.rows_touched = state.ops.rows_touched.saturating_add(rows_touched);
                let entry = state.types.entry(type_name).or_default();
                entry.rows_touched = entry.rows_touched.saturating_add(rows_touched);
            }
            MetricsEvent::CascadeStep { type_name, .. } => {
                state.ops.cascade_steps = state.ops.cascade_steps.saturating_add(1);
                let entry = state.types.entry(type_name).or_default();
                entry.cascade_steps = entry.cascade_steps.saturating_add(1);
            }
        }
    }
}

pub(crate) fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    if let Some(sink) = override_sink {
        sink.record(event);
    } else {
        GlobalMetricsSink.record(event);
    }
}

/// Run a closure with a scoped metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0.take();
            });
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(previous);

    f()
}

/// Snapshot the global counters.
#[must_use]
pub fn metrics_report() -> MetricsReport {
    let state = STATE.lock().expect("metrics state lock poisoned");
    MetricsReport {
        ops: state.ops,
        types: state.types.clone(),
    }
}

/// Reset all global counters.
pub fn metrics_reset_all() {
    let mut state = STATE.lock().expect("metrics state lock poisoned");
    state.ops = OpCounters::default();
    state.types.clear();
}

///
/// Span
///
/// RAII guard emitting start/finish events for one engine call; finish
/// accounting happens even on unwind.
///

pub(crate) struct Span {
    kind: ExecKind,
    type_name: String,
    rows: u64,
}

impl Span {
    pub(crate) fn new(kind: ExecKind, type_name: &str) -> Self {
        record(MetricsEvent::ExecStart {
            kind,
            type_name: type_name.to_string(),
        });

        Self {
            kind,
            type_name: type_name.to_string(),
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            type_name: std::mem::take(&mut self.type_name),
            rows_touched: self.rows,
        });
    }
}
