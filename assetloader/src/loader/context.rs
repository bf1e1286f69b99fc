//! Session-wide loading state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::config::LoaderSettings;
use crate::error::{LoadError, LoadResult};
use crate::ident::{display_name, short_name};
use crate::pool::{ContentPool, DlcMask, PoolAsset};
use crate::prefab::{
    AssetDecoder, DecodeHooks, FieldResolver, Prefab, PrefabKind, PrefabRegistry,
};
use crate::progress::ProgressSink;
use crate::report::DiagnosticReport;
use crate::sharing::SharingCache;
use crate::telemetry::LoadCounters;
use crate::usage::CrossRefResolver;

/// How an item is instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantiateMode {
    /// First pass, and every out-of-band load.
    PropTreeTrailer,
    /// Second pass. `wanted` is false for items loaded only because a style
    /// lists them.
    BuildingVehicle { wanted: bool },
}

/// Objects being decoded, the thread decoding each, and the object each
/// blocked thread waits for.
#[derive(Debug, Default)]
struct InFlight {
    owners: HashMap<String, ThreadId>,
    waiting: HashMap<ThreadId, String>,
}

impl InFlight {
    /// Whether `me` waiting for `name` would close a loop of waiting threads.
    fn leads_back(&self, name: &str, me: ThreadId) -> bool {
        let mut current = name;
        for _ in 0..=self.owners.len() {
            let Some(&owner) = self.owners.get(current) else {
                return false;
            };
            if owner == me {
                return true;
            }
            match self.waiting.get(&owner) {
                Some(next) => current = next,
                None => return false,
            }
        }
        true
    }
}

enum Claim<'a> {
    Owned(ClaimGuard<'a>),
    Loaded(Arc<Prefab>),
    Cycle,
}

/// Exclusive right to decode one object; released on drop.
struct ClaimGuard<'a> {
    ctx: &'a LoadContext,
    name: String,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        self.ctx.in_flight.lock().owners.remove(&self.name);
        self.ctx.load_finished.notify_all();
    }
}

pub(crate) struct ContextParts {
    pub settings: LoaderSettings,
    pub owned_dlc: DlcMask,
    pub pool: Arc<ContentPool>,
    pub decoder: Arc<dyn AssetDecoder>,
    pub fallback: Arc<dyn FieldResolver>,
    pub progress: Arc<dyn ProgressSink>,
}

/// Everything a load session shares between the task, the resolver and
/// the host.
///
/// Each table sits behind its own short-lived lock; none is held while an
/// item is being decoded, so the resolver can re-enter the context from
/// inside a decode. An object is decoded by one thread at a time: others
/// asking for it wait and then share the result.
pub struct LoadContext {
    settings: LoaderSettings,
    owned_dlc: DlcMask,
    pool: Arc<ContentPool>,
    decoder: Arc<dyn AssetDecoder>,
    resolver: Arc<dyn FieldResolver>,
    registry: PrefabRegistry,
    sharing: SharingCache,
    report: DiagnosticReport,
    counters: LoadCounters,
    /// Identifiers already surfaced as failed or not found.
    failed: Mutex<HashSet<String>>,
    in_flight: Mutex<InFlight>,
    load_finished: Condvar,
    progress: Arc<dyn ProgressSink>,
}

impl std::fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadContext")
            .field("settings", &self.settings)
            .field("owned_dlc", &self.owned_dlc)
            .field("packages", &self.pool.len())
            .field("registered", &self.registry.len())
            .finish()
    }
}

impl LoadContext {
    /// Build the context with a cross-reference resolver pointing back at it.
    pub(crate) fn new(parts: ContextParts) -> Arc<Self> {
        let sharing = SharingCache::new(parts.settings.sharing_options());
        Arc::new_cyclic(|weak| LoadContext {
            resolver: Arc::new(CrossRefResolver::new(weak.clone(), parts.fallback)),
            settings: parts.settings,
            owned_dlc: parts.owned_dlc,
            pool: parts.pool,
            decoder: parts.decoder,
            registry: PrefabRegistry::new(),
            sharing,
            report: DiagnosticReport::new(),
            counters: LoadCounters::new(),
            failed: Mutex::new(HashSet::new()),
            in_flight: Mutex::new(InFlight::default()),
            load_finished: Condvar::new(),
            progress: parts.progress,
        })
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    pub fn owned_dlc(&self) -> DlcMask {
        self.owned_dlc
    }

    pub fn pool(&self) -> &ContentPool {
        &self.pool
    }

    pub fn registry(&self) -> &PrefabRegistry {
        &self.registry
    }

    pub fn sharing(&self) -> &SharingCache {
        &self.sharing
    }

    pub fn report(&self) -> &DiagnosticReport {
        &self.report
    }

    pub fn counters(&self) -> &LoadCounters {
        &self.counters
    }

    /// The session's field resolver.
    pub fn resolver(&self) -> Arc<dyn FieldResolver> {
        Arc::clone(&self.resolver)
    }

    /// Check if a prefab with this exact name is registered under any kind.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded(name).is_some()
    }

    fn loaded(&self, name: &str) -> Option<Arc<Prefab>> {
        PrefabKind::ALL
            .iter()
            .find_map(|&kind| self.registry.find_loaded(kind, name).filter(|p| p.name == name))
    }

    /// Take the right to decode `name`.
    ///
    /// Waits while another thread decodes it, unless that thread is itself
    /// waiting (directly or down a chain) on the caller.
    fn claim(&self, name: &str) -> Claim<'_> {
        let me = thread::current().id();
        let mut in_flight = self.in_flight.lock();
        loop {
            if let Some(prefab) = self.loaded(name) {
                return Claim::Loaded(prefab);
            }
            if !in_flight.owners.contains_key(name) {
                in_flight.owners.insert(name.to_string(), me);
                return Claim::Owned(ClaimGuard {
                    ctx: self,
                    name: name.to_string(),
                });
            }
            if in_flight.leads_back(name, me) {
                return Claim::Cycle;
            }

            debug!(asset = name, "Waiting for load on another thread");
            in_flight.waiting.insert(me, name.to_string());
            self.load_finished.wait(&mut in_flight);
            in_flight.waiting.remove(&me);
        }
    }

    /// Decode an object asset and register the prefab.
    ///
    /// The prefab is named `<package>.<decoded name>` and marked as custom
    /// content. Buildings loaded in the second pass only because a style
    /// lists them are marked "do not spawn normally". Props and trees are
    /// always counted; buildings and vehicles only in the second pass.
    ///
    /// An object that is already registered is returned as is, without
    /// being decoded or counted again. One that this thread is already
    /// decoding fails with [`LoadError::InProgress`].
    pub fn instantiate(&self, object: &PoolAsset, mode: InstantiateMode) -> LoadResult<Arc<Prefab>> {
        let full_name = object.full_name();
        let _claim = match self.claim(&full_name) {
            Claim::Owned(guard) => guard,
            Claim::Loaded(prefab) => {
                debug!(asset = %full_name, "Already loaded");
                return Ok(prefab);
            }
            Claim::Cycle => return Err(LoadError::InProgress(full_name)),
        };

        let label = display_name(&object.name);
        self.progress.began_loading(label);

        let hooks = DecodeHooks {
            package: &object.package,
            referrer: &full_name,
            sharing: &self.sharing,
            pool: &self.pool,
            resolver: self.resolver.as_ref(),
        };
        let decoded = self.decoder.decode(object, &hooks);
        self.progress.ended_loading(label);

        let mut prefab = decoded?;
        prefab.name = format!("{}.{}", object.package, prefab.name);
        prefab.is_custom_content = true;

        let counted = match (mode, prefab.kind) {
            (_, PrefabKind::Prop | PrefabKind::Tree) => true,
            (InstantiateMode::BuildingVehicle { wanted }, PrefabKind::Building) => {
                prefab.dont_spawn_normally = !wanted;
                true
            }
            (InstantiateMode::BuildingVehicle { .. }, PrefabKind::Vehicle) => true,
            _ => false,
        };
        if counted {
            self.counters.record(prefab.kind);
        }

        debug!(name = %prefab.name, kind = %prefab.kind, ?mode, "Instantiated");
        Ok(self.registry.register(prefab))
    }

    /// Record a failed item.
    ///
    /// Each identifier reaches the report and the progress channel once.
    pub fn failed(&self, name: &str, error: &LoadError) {
        warn!(asset = name, error = %error, "Asset failed");
        if self.failed.lock().insert(name.to_string()) {
            self.report.record_failed(name);
            self.progress.failed(short_name(name));
        }
    }

    /// Record an item that could not be found.
    ///
    /// The report collects every referrer; the progress channel hears about
    /// each identifier once.
    pub fn not_found(&self, name: &str, referrer: Option<&str>) {
        debug!(asset = name, referrer, "Asset not found");
        self.report.record_not_found(name, referrer);
        if self.failed.lock().insert(name.to_string()) {
            self.progress.not_found(short_name(name));
        }
    }

    /// Load a prop or tree referenced from inside another item.
    ///
    /// Returns the registered prefab name, or `None` when the item cannot be
    /// found, fails to load, or is already being decoded further up the
    /// stack. An item another thread is decoding is waited for.
    pub fn load_prop_tree(&self, name: &str, referrer: &str) -> Option<String> {
        let Some(object) = self.pool.find_asset(name).cloned() else {
            self.not_found(name, Some(referrer));
            return None;
        };
        self.load_out_of_band(&object)
    }

    /// Load a trailer named by a vehicle in the same package.
    pub fn load_trailer(&self, package: &str, name: &str, referrer: &str) -> bool {
        let Some(object) = self.pool.find_in_package(package, name).cloned() else {
            self.not_found(&format!("{}.{}", package, name), Some(referrer));
            return false;
        };
        self.load_out_of_band(&object).is_some()
    }

    fn load_out_of_band(&self, object: &PoolAsset) -> Option<String> {
        let full_name = object.full_name();
        match self.instantiate(object, InstantiateMode::PropTreeTrailer) {
            Ok(prefab) => Some(prefab.name.clone()),
            Err(LoadError::InProgress(_)) => {
                debug!(asset = %full_name, "Reference cycle, not loading again");
                None
            }
            Err(e) => {
                self.failed(&full_name, &e);
                None
            }
        }
    }

    /// Forget the failed set and release the shared tables.
    pub(crate) fn release(&self) -> crate::sharing::SharingStats {
        self.failed.lock().clear();
        self.sharing.teardown()
    }
}
