//! Load telemetry.
//!
//! Per-kind counters for the items the passes load. The counters use
//! lock-free atomics and are reported once, at the end of a session, as a
//! [`ContentCounts`] snapshot.
//!
//! # Architecture
//!
//! ```text
//! Instantiation ─────► LoadCounters ─────► ContentCounts ─────► TelemetrySink
//!                      (atomic counters)   (point-in-time copy)  (host, logs)
//! ```
//!
//! # Example
//!
//! ```
//! use assetloader::telemetry::LoadCounters;
//! use assetloader::prefab::PrefabKind;
//!
//! let counters = LoadCounters::new();
//! counters.record(PrefabKind::Building);
//! counters.record(PrefabKind::Prop);
//! counters.record(PrefabKind::Prop);
//!
//! let counts = counters.snapshot();
//! assert_eq!(counts.buildings, 1);
//! assert_eq!(counts.props, 2);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::info;

use crate::prefab::PrefabKind;

/// Atomic per-kind load counters.
#[derive(Debug, Default)]
pub struct LoadCounters {
    buildings: AtomicU64,
    props: AtomicU64,
    trees: AtomicU64,
    vehicles: AtomicU64,
}

impl LoadCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one loaded item.
    pub fn record(&self, kind: PrefabKind) {
        let counter = match kind {
            PrefabKind::Building => &self.buildings,
            PrefabKind::Prop => &self.props,
            PrefabKind::Tree => &self.trees,
            PrefabKind::Vehicle => &self.vehicles,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy.
    pub fn snapshot(&self) -> ContentCounts {
        ContentCounts {
            buildings: self.buildings.load(Ordering::Relaxed),
            props: self.props.load(Ordering::Relaxed),
            trees: self.trees.load(Ordering::Relaxed),
            vehicles: self.vehicles.load(Ordering::Relaxed),
        }
    }
}

/// Loaded item counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentCounts {
    pub buildings: u64,
    pub props: u64,
    pub trees: u64,
    pub vehicles: u64,
}

impl ContentCounts {
    pub fn total(&self) -> u64 {
        self.buildings + self.props + self.trees + self.vehicles
    }
}

impl fmt::Display for ContentCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} buildings, {} props, {} trees, {} vehicles",
            self.buildings, self.props, self.trees, self.vehicles
        )
    }
}

/// Receiver of the end-of-session content counts.
pub trait TelemetrySink: Send + Sync {
    fn custom_content_info(&self, counts: &ContentCounts);
}

/// Sink that writes the counts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn custom_content_info(&self, counts: &ContentCounts) {
        info!(
            buildings = counts.buildings,
            props = counts.props,
            trees = counts.trees,
            vehicles = counts.vehicles,
            "Custom content loaded"
        );
    }
}
