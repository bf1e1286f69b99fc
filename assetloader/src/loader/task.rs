//! Resumable load task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::context::{InstantiateMode, LoadContext};
use super::decision::{object_name, Decision, Selection};
use crate::error::LoadError;
use crate::pool::{AssetType, PoolAsset};
use crate::prefab::PrefabCounts;
use crate::report::ReportSink;
use crate::sharing::SharingStats;
use crate::styles::{DistrictStyle, StyleCollector};
use crate::telemetry::{ContentCounts, TelemetrySink};
use crate::usage::{SnapshotGate, UsageIndex, UsageSets};

/// Result of one [`LoadTask::resume`] call.
#[derive(Debug, Clone)]
pub enum Step {
    /// Call `resume` again later.
    Yield,
    /// The session is complete.
    Done(LoadSummary),
}

/// What a finished session did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    /// Items counted by the passes.
    pub counts: ContentCounts,
    /// Prefabs registered, including out-of-band loads.
    pub registered: PrefabCounts,
    pub sharing: SharingStats,
    pub failed: usize,
    pub not_found: usize,
    /// Used items that no pass loaded.
    pub missing_used: usize,
    pub styles: Vec<DistrictStyle>,
    /// File name of the written report.
    pub report_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Styles,
    WaitSnapshot,
    PropsTreesTrailers,
    BuildingsVehicles,
    ReportMissing,
    FinalizeStyles,
    Telemetry,
    Flush,
    Finished,
}

/// A load session as a cooperative state machine.
///
/// Each [`resume`](LoadTask::resume) runs until the yield interval has
/// elapsed, the world snapshot is still pending, or the session is done.
/// Dropping the task between resumes cancels the session.
///
/// # Phases
///
/// ```text
/// Styles ─► WaitSnapshot ─► PropsTreesTrailers ─► BuildingsVehicles
///           (load_used)                                  │
///                                                        ▼
///      Finished ◄─ Flush ◄─ Telemetry ◄─ FinalizeStyles ◄─ ReportMissing
/// ```
pub struct LoadTask {
    ctx: Arc<LoadContext>,
    gate: Arc<SnapshotGate>,
    telemetry: Arc<dyn TelemetrySink>,
    report_sink: Arc<dyn ReportSink>,
    session_name: String,
    phase: Phase,
    candidates: Vec<Arc<PoolAsset>>,
    cursor: usize,
    selection: Selection,
    styles: StyleCollector,
    usage: Option<UsageIndex>,
    summary: LoadSummary,
    yield_interval: Duration,
    last_yield: Instant,
}

impl LoadTask {
    pub(crate) fn new(
        ctx: Arc<LoadContext>,
        gate: Arc<SnapshotGate>,
        telemetry: Arc<dyn TelemetrySink>,
        report_sink: Arc<dyn ReportSink>,
        session_name: String,
    ) -> Self {
        let settings = ctx.settings();
        let selection = Selection {
            load_enabled: settings.load_enabled,
            load_used: settings.load_used,
            owned_dlc: ctx.owned_dlc(),
            usage: Arc::new(UsageSets::new()),
        };
        let yield_interval = settings.yield_interval();

        Self {
            ctx,
            gate,
            telemetry,
            report_sink,
            session_name,
            phase: Phase::Styles,
            candidates: Vec::new(),
            cursor: 0,
            selection,
            styles: StyleCollector::default(),
            usage: None,
            summary: LoadSummary::default(),
            yield_interval,
            last_yield: Instant::now(),
        }
    }

    /// Check if the session is complete.
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Advance the session.
    pub fn resume(&mut self) -> Step {
        loop {
            match self.phase {
                Phase::Styles => {
                    self.styles = StyleCollector::collect(self.ctx.pool());
                    self.candidates = self
                        .ctx
                        .pool()
                        .filter_assets(AssetType::CustomAssetMetaData)
                        .cloned()
                        .collect();
                    self.phase = if self.selection.load_used {
                        Phase::WaitSnapshot
                    } else {
                        Phase::PropsTreesTrailers
                    };
                }
                Phase::WaitSnapshot => {
                    let Some(snapshot) = self.gate.try_take() else {
                        return Step::Yield;
                    };
                    let index = UsageIndex::build(snapshot.as_ref());
                    self.selection.usage = index.sets();
                    self.usage = Some(index);
                    self.phase = Phase::PropsTreesTrailers;
                }
                Phase::PropsTreesTrailers | Phase::BuildingsVehicles => {
                    let Some(candidate) = self.candidates.get(self.cursor).cloned() else {
                        self.end_pass();
                        continue;
                    };
                    self.cursor += 1;
                    self.process(&candidate);

                    if self.last_yield.elapsed() >= self.yield_interval {
                        self.last_yield = Instant::now();
                        return Step::Yield;
                    }
                }
                Phase::ReportMissing => {
                    if let Some(usage) = &self.usage {
                        self.summary.missing_used = usage.report_missing(&self.ctx);
                    }
                    self.phase = Phase::FinalizeStyles;
                }
                Phase::FinalizeStyles => {
                    self.summary.styles = self.styles.finalize(self.ctx.registry());
                    self.phase = Phase::Telemetry;
                }
                Phase::Telemetry => {
                    self.summary.counts = self.ctx.counters().snapshot();
                    self.telemetry.custom_content_info(&self.summary.counts);
                    self.phase = Phase::Flush;
                }
                Phase::Flush => {
                    self.flush_report();
                    self.finish();
                    self.phase = Phase::Finished;
                    return Step::Done(self.summary.clone());
                }
                Phase::Finished => return Step::Done(self.summary.clone()),
            }
        }
    }

    /// Resume until done, yielding the thread between steps.
    ///
    /// Does not return while `load_used` is set and no snapshot has been
    /// published.
    pub fn run_to_completion(mut self) -> LoadSummary {
        loop {
            match self.resume() {
                Step::Yield => std::thread::yield_now(),
                Step::Done(summary) => return summary,
            }
        }
    }

    fn end_pass(&mut self) {
        info!(
            pass = if self.phase == Phase::PropsTreesTrailers { 1 } else { 2 },
            registered = self.ctx.registry().len(),
            "Load pass complete"
        );
        self.cursor = 0;
        self.phase = match self.phase {
            Phase::PropsTreesTrailers => Phase::BuildingsVehicles,
            _ => Phase::ReportMissing,
        };
    }

    fn process(&self, candidate: &PoolAsset) {
        let pool = self.ctx.pool();
        let (decision, first_pass) = if self.phase == Phase::PropsTreesTrailers {
            (self.selection.prop_tree_trailer(pool, candidate), true)
        } else {
            (
                self.selection.building_vehicle(pool, candidate, &self.styles),
                false,
            )
        };

        match decision {
            Decision::Skip => {}
            Decision::Error(e) => self.ctx.failed(&candidate.full_name(), &e),
            Decision::Load { meta, wanted } => {
                let full_name = object_name(candidate, &meta);
                let Some(object) = pool.find_in_package(&candidate.package, &meta.asset_ref).cloned() else {
                    self.ctx.failed(&full_name, &LoadError::MissingObject(full_name.clone()));
                    return;
                };

                let mode = if first_pass {
                    InstantiateMode::PropTreeTrailer
                } else {
                    InstantiateMode::BuildingVehicle { wanted }
                };
                match self.ctx.instantiate(&object, mode) {
                    Ok(_) => {}
                    Err(LoadError::InProgress(_)) => {
                        debug!(asset = %full_name, "Already being loaded");
                    }
                    Err(e) => self.ctx.failed(&full_name, &e),
                }
            }
        }
    }

    fn flush_report(&mut self) {
        if !self.ctx.settings().report_assets {
            return;
        }

        let usage = self.usage.as_ref().map(|u| u.sets());
        let artifact = self.ctx.report().flush(
            &self.session_name,
            usage.as_deref(),
            chrono::Local::now().naive_local(),
        );
        match self.report_sink.write(&artifact) {
            Ok(()) => self.summary.report_file = Some(artifact.file_name),
            Err(e) => warn!(error = %e, file = %artifact.file_name, "Saving the assets report failed"),
        }
    }

    fn finish(&mut self) {
        let report = self.ctx.report();
        self.summary.registered = self.ctx.registry().counts();
        self.summary.sharing = self.ctx.sharing().stats();
        self.summary.failed = report.failed().len();
        self.summary.not_found = report.not_found().len();
        self.candidates.clear();

        info!(
            counts = %self.summary.counts,
            failed = self.summary.failed,
            not_found = self.summary.not_found,
            "Load session finished"
        );
    }
}

impl std::fmt::Debug for LoadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadTask")
            .field("session", &self.session_name)
            .field("phase", &self.phase)
            .field("cursor", &self.cursor)
            .finish()
    }
}
