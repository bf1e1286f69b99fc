//! Usage index construction and missing-item reporting.

use std::sync::Arc;

use tracing::{debug, info};

use super::sets::UsageSets;
use super::snapshot::WorldSnapshot;
use crate::loader::LoadContext;
use crate::prefab::{PrefabKind, PrefabRegistry};

/// The items a saved world references.
///
/// Built once per session before loading starts and read-only afterwards.
#[derive(Debug, Clone)]
pub struct UsageIndex {
    sets: Arc<UsageSets>,
}

impl UsageIndex {
    /// Scan a snapshot.
    ///
    /// Buildings count only when their flags are non-empty. Props, trees and
    /// vehicles count by prefab name.
    pub fn build(snapshot: &dyn WorldSnapshot) -> Self {
        let mut sets = UsageSets::new();

        for building in snapshot.buildings().iter().filter(|b| b.is_live()) {
            sets.add(PrefabKind::Building, &building.name);
        }
        for name in snapshot.props() {
            sets.add(PrefabKind::Prop, name);
        }
        for name in snapshot.trees() {
            sets.add(PrefabKind::Tree, name);
        }
        for name in snapshot.vehicles() {
            sets.add(PrefabKind::Vehicle, name);
        }

        info!(
            buildings = sets.assets(PrefabKind::Building).len(),
            props = sets.assets(PrefabKind::Prop).len(),
            trees = sets.assets(PrefabKind::Tree).len(),
            vehicles = sets.assets(PrefabKind::Vehicle).len(),
            "Usage index built"
        );

        Self {
            sets: Arc::new(sets),
        }
    }

    /// Wrap prebuilt sets.
    pub fn from_sets(sets: UsageSets) -> Self {
        Self {
            sets: Arc::new(sets),
        }
    }

    /// Shared handle to the sets.
    pub fn sets(&self) -> Arc<UsageSets> {
        Arc::clone(&self.sets)
    }

    /// Names used in the world but not loaded, in kind then name order.
    pub fn missing(&self, registry: &PrefabRegistry) -> Vec<(PrefabKind, String)> {
        PrefabKind::ALL
            .iter()
            .flat_map(|&kind| {
                self.sets
                    .assets(kind)
                    .iter()
                    .filter(move |name| !registry.contains(kind, name))
                    .map(move |name| (kind, name.clone()))
            })
            .collect()
    }

    /// Report every used name that no pass loaded as not found.
    ///
    /// These entries carry no referrer. Returns the number reported.
    pub fn report_missing(&self, ctx: &LoadContext) -> usize {
        let missing = self.missing(ctx.registry());
        for (kind, name) in &missing {
            debug!(%kind, name = %name, "Used asset missing");
            ctx.not_found(name, None);
        }
        missing.len()
    }
}
