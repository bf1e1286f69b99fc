//! Progress side channel.
//!
//! The loader reports what it is doing through a [`ProgressSink`]. The
//! host turns these events into loading-screen text; the CLI turns them
//! into a progress bar. Names are short display names (package prefix and
//! `_Data` suffix removed).

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

/// Receiver of loading progress events.
pub trait ProgressSink: Send + Sync {
    /// An item started instantiating.
    fn began_loading(&self, name: &str);

    /// The item that last began has finished, successfully or not.
    fn ended_loading(&self, name: &str);

    /// An item could not be found. Sent once per identifier.
    fn not_found(&self, name: &str);

    /// An item failed to load. Sent once per identifier.
    fn failed(&self, name: &str);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn began_loading(&self, _name: &str) {}
    fn ended_loading(&self, _name: &str) {}
    fn not_found(&self, _name: &str) {}
    fn failed(&self, _name: &str) {}
}

/// Sink that logs events and keeps counts.
#[derive(Debug, Default)]
pub struct TracingProgress {
    began: AtomicU64,
    not_found: AtomicU64,
    failed: AtomicU64,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// (began, not found, failed) counts so far.
    pub fn counts(&self) -> (u64, u64, u64) {
        (
            self.began.load(Ordering::Relaxed),
            self.not_found.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }
}

impl ProgressSink for TracingProgress {
    fn began_loading(&self, name: &str) {
        self.began.fetch_add(1, Ordering::Relaxed);
        trace!(name, "Loading");
    }

    fn ended_loading(&self, name: &str) {
        trace!(name, "Loaded");
    }

    fn not_found(&self, name: &str) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
        debug!(name, "Asset not found");
    }

    fn failed(&self, name: &str) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        debug!(name, "Asset failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_progress_counts() {
        let progress = TracingProgress::new();
        progress.began_loading("Lamp");
        progress.ended_loading("Lamp");
        progress.began_loading("Oak");
        progress.ended_loading("Oak");
        progress.not_found("Tree1");
        progress.failed("Bus");

        assert_eq!(progress.counts(), (2, 1, 1));
    }
}
