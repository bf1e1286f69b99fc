//! Terminal progress for load sessions.

use std::time::Duration;

use assetloader::progress::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {pos} loaded  {msg}";

/// Progress sink backed by an `indicatif` spinner.
///
/// The current item is shown as the spinner message; failures and missing
/// items are printed above it.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// A sink that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarProgress {
    fn began_loading(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn ended_loading(&self, _name: &str) {
        self.bar.inc(1);
    }

    fn not_found(&self, name: &str) {
        self.bar.println(format!("  not found: {}", name));
    }

    fn failed(&self, name: &str) {
        self.bar.println(format!("  failed:    {}", name));
    }
}
