//! Session construction and teardown.

use std::sync::Arc;

use tracing::info;

use super::context::{ContextParts, LoadContext};
use super::task::LoadTask;
use crate::config::LoaderSettings;
use crate::pool::{ContentPool, DlcMask};
use crate::prefab::{AssetDecoder, FieldResolver, PayloadDecoder, Prefab, PrefabKind, PrimitiveFieldResolver};
use crate::progress::{NoopProgress, ProgressSink};
use crate::report::{FileReportSink, ReportSink};
use crate::sharing::SharingStats;
use crate::telemetry::{LogTelemetry, TelemetrySink};
use crate::usage::SnapshotGate;

const DEFAULT_SESSION_NAME: &str = "Session";

/// One load session.
///
/// Owns the session context (prefab registry, checksum cache, report,
/// counters) and the snapshot gate the host publishes the decoded world
/// through. Create it at session start, drive [`Session::task`], and call
/// [`Session::teardown`] when the session's content is released.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use assetloader::config::LoaderSettings;
/// use assetloader::loader::Session;
/// use assetloader::pool::ContentPool;
/// use assetloader::report::MemoryReportSink;
///
/// let settings = LoaderSettings::default().with_load_used(false);
/// let session = Session::builder(settings, Arc::new(ContentPool::new()))
///     .with_report_sink(Arc::new(MemoryReportSink::new()))
///     .build();
///
/// let summary = session.task().run_to_completion();
/// assert_eq!(summary.counts.total(), 0);
/// ```
pub struct Session {
    ctx: Arc<LoadContext>,
    gate: Arc<SnapshotGate>,
    telemetry: Arc<dyn TelemetrySink>,
    report_sink: Arc<dyn ReportSink>,
    name: String,
}

impl Session {
    pub fn builder(settings: LoaderSettings, pool: Arc<ContentPool>) -> SessionBuilder {
        SessionBuilder::new(settings, pool)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared session context.
    pub fn context(&self) -> &Arc<LoadContext> {
        &self.ctx
    }

    /// Gate through which the host publishes the world snapshot.
    pub fn snapshot_gate(&self) -> Arc<SnapshotGate> {
        Arc::clone(&self.gate)
    }

    /// The cross-reference resolver installed for this session.
    pub fn resolver(&self) -> Arc<dyn FieldResolver> {
        self.ctx.resolver()
    }

    /// A task running the whole session.
    pub fn task(&self) -> LoadTask {
        LoadTask::new(
            Arc::clone(&self.ctx),
            Arc::clone(&self.gate),
            Arc::clone(&self.telemetry),
            Arc::clone(&self.report_sink),
            self.name.clone(),
        )
    }

    /// Find a loaded prefab.
    pub fn find_loaded(&self, kind: PrefabKind, name: &str) -> Option<Arc<Prefab>> {
        self.ctx.registry().find_loaded(kind, name)
    }

    /// Release the shared tables and return their final statistics.
    ///
    /// Registered prefabs stay reachable through handles the host holds.
    pub fn teardown(self) -> SharingStats {
        let stats = self.ctx.release();
        info!(session = %self.name, "Session torn down");
        stats
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("ctx", &self.ctx)
            .finish()
    }
}

/// Builder for [`Session`].
///
/// Defaults: [`PayloadDecoder`], [`PrimitiveFieldResolver`] as the
/// fallback for non-reference fields, no progress output, log telemetry,
/// reports written to the configured report directory, and every DLC owned.
pub struct SessionBuilder {
    settings: LoaderSettings,
    pool: Arc<ContentPool>,
    decoder: Arc<dyn AssetDecoder>,
    fallback: Arc<dyn FieldResolver>,
    progress: Arc<dyn ProgressSink>,
    telemetry: Arc<dyn TelemetrySink>,
    report_sink: Option<Arc<dyn ReportSink>>,
    owned_dlc: DlcMask,
    name: String,
}

impl SessionBuilder {
    pub fn new(settings: LoaderSettings, pool: Arc<ContentPool>) -> Self {
        Self {
            settings,
            pool,
            decoder: Arc::new(PayloadDecoder),
            fallback: Arc::new(PrimitiveFieldResolver),
            progress: Arc::new(NoopProgress),
            telemetry: Arc::new(LogTelemetry),
            report_sink: None,
            owned_dlc: DlcMask::ALL,
            name: DEFAULT_SESSION_NAME.to_string(),
        }
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn AssetDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Resolver for fields that are not cross references.
    pub fn with_field_resolver(mut self, resolver: Arc<dyn FieldResolver>) -> Self {
        self.fallback = resolver;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.report_sink = Some(sink);
        self
    }

    pub fn with_owned_dlc(mut self, owned: DlcMask) -> Self {
        self.owned_dlc = owned;
        self
    }

    /// Name used in the report file name and header.
    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn build(self) -> Session {
        let report_sink = self
            .report_sink
            .unwrap_or_else(|| Arc::new(FileReportSink::new(self.settings.report_dir.clone())));

        info!(
            session = %self.name,
            packages = self.pool.len(),
            load_enabled = self.settings.load_enabled,
            load_used = self.settings.load_used,
            "Load session created"
        );

        let ctx = LoadContext::new(ContextParts {
            settings: self.settings,
            owned_dlc: self.owned_dlc,
            pool: self.pool,
            decoder: self.decoder,
            fallback: self.fallback,
            progress: self.progress,
        });

        Session {
            ctx,
            gate: Arc::new(SnapshotGate::new()),
            telemetry: self.telemetry,
            report_sink,
            name: self.name,
        }
    }
}
