//! Usage sets.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::ident::package_split;
use crate::prefab::PrefabKind;

/// Items placed in the saved world, with a coarse per-package index.
///
/// Fine sets hold full names (`package.item`). Package sets hold the text
/// before the first dot of each full name. Because dots may also appear in
/// package and item names, the package predicates over-approximate: any
/// package name containing a dot is accepted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageSets {
    buildings: BTreeSet<String>,
    props: BTreeSet<String>,
    trees: BTreeSet<String>,
    vehicles: BTreeSet<String>,
    #[serde(skip)]
    building_packages: HashSet<String>,
    #[serde(skip)]
    prop_packages: HashSet<String>,
    #[serde(skip)]
    tree_packages: HashSet<String>,
    #[serde(skip)]
    vehicle_packages: HashSet<String>,
}

impl UsageSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a placed prefab name.
    ///
    /// Names without an internal dot are built-in or legacy and are ignored.
    /// Returns `true` if the name was recorded.
    pub fn add(&mut self, kind: PrefabKind, name: &str) -> bool {
        let Some(j) = package_split(name) else {
            return false;
        };
        let package = name[..j].to_string();
        let (packages, assets) = match kind {
            PrefabKind::Building => (&mut self.building_packages, &mut self.buildings),
            PrefabKind::Prop => (&mut self.prop_packages, &mut self.props),
            PrefabKind::Tree => (&mut self.tree_packages, &mut self.trees),
            PrefabKind::Vehicle => (&mut self.vehicle_packages, &mut self.vehicles),
        };
        packages.insert(package);
        assets.insert(name.to_string());
        true
    }

    /// Fine set for one kind, sorted.
    pub fn assets(&self, kind: PrefabKind) -> &BTreeSet<String> {
        match kind {
            PrefabKind::Building => &self.buildings,
            PrefabKind::Prop => &self.props,
            PrefabKind::Tree => &self.trees,
            PrefabKind::Vehicle => &self.vehicles,
        }
    }

    /// Package set for one kind.
    pub fn packages(&self, kind: PrefabKind) -> &HashSet<String> {
        match kind {
            PrefabKind::Building => &self.building_packages,
            PrefabKind::Prop => &self.prop_packages,
            PrefabKind::Tree => &self.tree_packages,
            PrefabKind::Vehicle => &self.vehicle_packages,
        }
    }

    /// Total number of recorded names.
    pub fn len(&self) -> usize {
        self.buildings.len() + self.props.len() + self.trees.len() + self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Package filter for the first pass.
    pub fn got_prop_tree_trailer_package(&self, package: &str) -> bool {
        self.prop_packages.contains(package)
            || self.tree_packages.contains(package)
            || self.vehicle_packages.contains(package)
            || package.contains('.')
    }

    /// Package filter for the second pass.
    pub fn got_building_vehicle_package(&self, package: &str) -> bool {
        self.building_packages.contains(package)
            || self.vehicle_packages.contains(package)
            || package.contains('.')
    }

    pub fn got_prop_tree_asset(&self, name: &str) -> bool {
        self.props.contains(name) || self.trees.contains(name)
    }

    /// Trailers are placed as vehicles.
    pub fn got_trailer_asset(&self, name: &str) -> bool {
        self.vehicles.contains(name)
    }

    pub fn got_building_vehicle_asset(&self, name: &str) -> bool {
        self.buildings.contains(name) || self.vehicles.contains(name)
    }

    /// Check if the package part of `name` passes either package filter.
    ///
    /// Never false for a name present in a fine set.
    pub fn package_match(&self, name: &str) -> bool {
        let package = match package_split(name) {
            Some(j) => &name[..j],
            None => name,
        };
        self.got_prop_tree_trailer_package(package) || self.got_building_vehicle_package(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_records_package_and_name() {
        let mut sets = UsageSets::new();
        assert!(sets.add(PrefabKind::Tree, "77777777.Tree1"));

        assert!(sets.assets(PrefabKind::Tree).contains("77777777.Tree1"));
        assert!(sets.packages(PrefabKind::Tree).contains("77777777"));
        assert_eq!(sets.len(), 1);
    }

    #[test]
    fn test_add_ignores_names_without_package() {
        let mut sets = UsageSets::new();
        assert!(!sets.add(PrefabKind::Prop, "Lamp"));
        assert!(!sets.add(PrefabKind::Prop, "Lamp."));
        assert!(!sets.add(PrefabKind::Prop, ""));
        assert!(sets.is_empty());
    }

    #[test]
    fn test_add_splits_on_first_dot() {
        let mut sets = UsageSets::new();
        sets.add(PrefabKind::Building, "pac.kagename.assetname");
        assert!(sets.packages(PrefabKind::Building).contains("pac"));
    }

    #[test]
    fn test_package_predicates() {
        let mut sets = UsageSets::new();
        sets.add(PrefabKind::Prop, "P.lamp");
        sets.add(PrefabKind::Building, "B.house");
        sets.add(PrefabKind::Vehicle, "V.bus");

        assert!(sets.got_prop_tree_trailer_package("P"));
        assert!(sets.got_prop_tree_trailer_package("V"));
        assert!(!sets.got_prop_tree_trailer_package("B"));

        assert!(sets.got_building_vehicle_package("B"));
        assert!(sets.got_building_vehicle_package("V"));
        assert!(!sets.got_building_vehicle_package("P"));
    }

    #[test]
    fn test_dotted_package_is_false_positive() {
        let sets = UsageSets::new();
        assert!(sets.got_prop_tree_trailer_package("my.pack"));
        assert!(sets.got_building_vehicle_package("my.pack"));
    }

    #[test]
    fn test_asset_predicates() {
        let mut sets = UsageSets::new();
        sets.add(PrefabKind::Tree, "T.oak");
        sets.add(PrefabKind::Vehicle, "V.trailer");
        sets.add(PrefabKind::Building, "B.house");

        assert!(sets.got_prop_tree_asset("T.oak"));
        assert!(sets.got_trailer_asset("V.trailer"));
        assert!(!sets.got_trailer_asset("T.oak"));
        assert!(sets.got_building_vehicle_asset("B.house"));
        assert!(sets.got_building_vehicle_asset("V.trailer"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn kind() -> impl Strategy<Value = PrefabKind> {
            prop_oneof![
                Just(PrefabKind::Building),
                Just(PrefabKind::Prop),
                Just(PrefabKind::Tree),
                Just(PrefabKind::Vehicle),
            ]
        }

        proptest! {
            /// Every recorded name passes the package filter.
            #[test]
            fn package_match_has_no_false_negatives(
                entries in prop::collection::vec((kind(), "[a-z0-9.]{0,12}"), 0..32)
            ) {
                let mut sets = UsageSets::new();
                for (kind, name) in &entries {
                    sets.add(*kind, name);
                }
                for kind in PrefabKind::ALL {
                    for name in sets.assets(kind) {
                        prop_assert!(sets.package_match(name));
                    }
                }
            }

            /// The package predicate for a recorded kind accepts its package.
            #[test]
            fn pass_predicates_accept_recorded_packages(
                package in "[A-Za-z0-9]{1,8}",
                item in "[A-Za-z0-9._]{1,8}",
            ) {
                let name = format!("{}.{}", package, item);
                let mut sets = UsageSets::new();
                sets.add(PrefabKind::Tree, &name);
                sets.add(PrefabKind::Building, &name);

                prop_assert!(sets.got_prop_tree_trailer_package(&package));
                prop_assert!(sets.got_building_vehicle_package(&package));
            }
        }
    }
}
