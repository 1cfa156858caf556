use std::collections::BTreeMap;

/// Monotonic engine counters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    ProjectionUpdates,
    SearchesScheduled,
    SearchesIssued,
    SearchFailures,
    FacilitiesRegistered,
    StaleLoadsDiscarded,
    LoadFailures,
    FocusSolves,
}

impl Counter {
    pub fn name(self) -> &'static str {
        match self {
            Counter::ProjectionUpdates => "projection.updates",
            Counter::SearchesScheduled => "search.scheduled",
            Counter::SearchesIssued => "search.issued",
            Counter::SearchFailures => "search.failures",
            Counter::FacilitiesRegistered => "facility.registered",
            Counter::StaleLoadsDiscarded => "facility.stale_discarded",
            Counter::LoadFailures => "facility.load_failures",
            Counter::FocusSolves => "focus.solves",
        }
    }
}

/// Point-in-time engine gauges.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gauge {
    RegisteredWaypoints,
    DrawnIcons,
    VisibleLabels,
}

impl Gauge {
    pub fn name(self) -> &'static str {
        match self {
            Gauge::RegisteredWaypoints => "renderer.registered",
            Gauge::DrawnIcons => "renderer.drawn_icons",
            Gauge::VisibleLabels => "labels.visible",
        }
    }
}

/// Deterministic metrics aggregation.
///
/// Metrics must not depend on wall-clock time or unordered iteration.
/// This type uses sorted maps so snapshots have stable ordering.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<Counter, u64>,
    gauges: BTreeMap<Gauge, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub gauges: Vec<(&'static str, i64)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    pub fn inc(&mut self, counter: Counter) {
        self.inc_by(counter, 1);
    }

    pub fn inc_by(&mut self, counter: Counter, by: u64) {
        *self.counters.entry(counter).or_insert(0) += by;
    }

    pub fn gauge(&self, gauge: Gauge) -> Option<i64> {
        self.gauges.get(&gauge).copied()
    }

    pub fn set_gauge(&mut self, gauge: Gauge, value: i64) {
        self.gauges.insert(gauge, value);
    }

    /// Folds another component's metrics into this one.
    pub fn merge(&mut self, other: &Metrics) {
        for (counter, value) in &other.counters {
            self.inc_by(*counter, *value);
        }
        for (gauge, value) in &other.gauges {
            self.set_gauge(*gauge, *value);
        }
    }

    /// Returns a stable, sorted snapshot suitable for logs.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (k.name(), *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (k.name(), *v)).collect(),
        }
    }
}
