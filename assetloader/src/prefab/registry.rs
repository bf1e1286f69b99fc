//! Registry of loaded prefabs.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{trace, warn};

use super::model::{Prefab, PrefabKind};
use crate::ident::{package_split, ItemId};

/// Number of registered prefabs per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrefabCounts {
    pub buildings: usize,
    pub props: usize,
    pub trees: usize,
    pub vehicles: usize,
}

/// Every prefab materialized in the session, keyed by kind and name.
///
/// This is the loader's "find loaded" lookup: the usage index checks it
/// for missing items, and the cross-reference resolver checks it before
/// loading anything out of band.
#[derive(Debug, Default)]
pub struct PrefabRegistry {
    prefabs: Mutex<BTreeMap<(PrefabKind, String), Arc<Prefab>>>,
}

impl PrefabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prefab under its name.
    ///
    /// A second prefab with the same kind and name replaces the first.
    pub fn register(&self, prefab: Prefab) -> Arc<Prefab> {
        let prefab = Arc::new(prefab);
        let key = (prefab.kind, prefab.name.clone());
        let previous = self.prefabs.lock().insert(key, Arc::clone(&prefab));
        if previous.is_some() {
            warn!(name = %prefab.name, kind = %prefab.kind, "Duplicate prefab name, replaced");
        } else {
            trace!(name = %prefab.name, kind = %prefab.kind, "Prefab registered");
        }
        prefab
    }

    /// Find a loaded prefab.
    ///
    /// A name without a package prefix also matches a loaded prefab whose
    /// item part equals it, so early references that predate package
    /// prefixes still resolve.
    pub fn find_loaded(&self, kind: PrefabKind, name: &str) -> Option<Arc<Prefab>> {
        if name.is_empty() {
            return None;
        }

        let prefabs = self.prefabs.lock();
        if let Some(prefab) = prefabs.get(&(kind, name.to_string())) {
            return Some(Arc::clone(prefab));
        }

        if package_split(name).is_some() {
            return None;
        }

        prefabs
            .range((kind, String::new())..)
            .take_while(|((k, _), _)| *k == kind)
            .find(|((_, full), _)| ItemId::parse(full.as_str()).item() == name)
            .map(|(_, prefab)| Arc::clone(prefab))
    }

    /// Check if a prefab is loaded.
    pub fn contains(&self, kind: PrefabKind, name: &str) -> bool {
        self.find_loaded(kind, name).is_some()
    }

    /// Names of loaded prefabs of one kind, sorted.
    pub fn names(&self, kind: PrefabKind) -> Vec<String> {
        self.prefabs
            .lock()
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Counts per kind.
    pub fn counts(&self) -> PrefabCounts {
        let prefabs = self.prefabs.lock();
        let mut counts = PrefabCounts::default();
        for (kind, _) in prefabs.keys() {
            match kind {
                PrefabKind::Building => counts.buildings += 1,
                PrefabKind::Prop => counts.props += 1,
                PrefabKind::Tree => counts.trees += 1,
                PrefabKind::Vehicle => counts.vehicles += 1,
            }
        }
        counts
    }

    /// Total number of registered prefabs.
    pub fn len(&self) -> usize {
        self.prefabs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every prefab.
    pub fn clear(&self) {
        self.prefabs.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_find() {
        let registry = PrefabRegistry::new();
        registry.register(Prefab::new("MyPack.Lamp_Data", PrefabKind::Prop));

        assert!(registry.contains(PrefabKind::Prop, "MyPack.Lamp_Data"));
        assert!(!registry.contains(PrefabKind::Tree, "MyPack.Lamp_Data"));
        assert!(!registry.contains(PrefabKind::Prop, "Other.Lamp_Data"));
    }

    #[test]
    fn test_find_legacy_name() {
        let registry = PrefabRegistry::new();
        registry.register(Prefab::new("MyPack.Lamp_Data", PrefabKind::Prop));

        let found = registry.find_loaded(PrefabKind::Prop, "Lamp_Data").unwrap();
        assert_eq!(found.name, "MyPack.Lamp_Data");
    }

    #[test]
    fn test_find_empty_name() {
        let registry = PrefabRegistry::new();
        assert!(registry.find_loaded(PrefabKind::Prop, "").is_none());
    }

    #[test]
    fn test_duplicate_replaces() {
        let registry = PrefabRegistry::new();
        registry.register(Prefab::new("A.B", PrefabKind::Building));
        let mut second = Prefab::new("A.B", PrefabKind::Building);
        second.dont_spawn_normally = true;
        registry.register(second);

        assert_eq!(registry.len(), 1);
        assert!(
            registry
                .find_loaded(PrefabKind::Building, "A.B")
                .unwrap()
                .dont_spawn_normally
        );
    }

    #[test]
    fn test_counts_and_names() {
        let registry = PrefabRegistry::new();
        registry.register(Prefab::new("P.b", PrefabKind::Building));
        registry.register(Prefab::new("P.a", PrefabKind::Building));
        registry.register(Prefab::new("P.t", PrefabKind::Tree));

        assert_eq!(
            registry.counts(),
            PrefabCounts {
                buildings: 2,
                props: 0,
                trees: 1,
                vehicles: 0
            }
        );
        assert_eq!(registry.names(PrefabKind::Building), vec!["P.a", "P.b"]);

        registry.clear();
        assert!(registry.is_empty());
    }
}
