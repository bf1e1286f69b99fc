//! Per-candidate load decisions.

use std::sync::Arc;

use tracing::trace;

use crate::error::LoadError;
use crate::pool::{AssetMetadata, ContentPool, DlcMask, ItemKind, PoolAsset};
use crate::styles::StyleCollector;
use crate::usage::UsageSets;

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Instantiate the candidate's object.
    ///
    /// `wanted` is false when only a style membership selected it.
    Load { meta: AssetMetadata, wanted: bool },
    Skip,
    /// The candidate's metadata could not be decoded.
    Error(LoadError),
}

impl Decision {
    pub fn is_load(&self) -> bool {
        matches!(self, Decision::Load { .. })
    }
}

/// Inputs shared by every decision in a session.
///
/// When used items are not loaded, `usage` is empty and never consulted.
#[derive(Debug, Clone)]
pub struct Selection {
    pub load_enabled: bool,
    pub load_used: bool,
    pub owned_dlc: DlcMask,
    pub usage: Arc<UsageSets>,
}

impl Selection {
    /// First pass: props, trees and trailers.
    pub fn prop_tree_trailer(&self, pool: &ContentPool, candidate: &PoolAsset) -> Decision {
        let wanted = self.load_enabled && pool.effective_enabled(candidate);
        if !wanted && !(self.load_used && self.usage.got_prop_tree_trailer_package(&candidate.package)) {
            return Decision::Skip;
        }

        let meta = match self.decode(candidate) {
            Ok(meta) => meta,
            Err(e) => return Decision::Error(e),
        };
        if !meta.kind.is_first_pass() || !meta.dlc.is_owned_by(self.owned_dlc) {
            return Decision::Skip;
        }

        let object = object_name(candidate, &meta);
        let used = self.load_used
            && (self.usage.got_prop_tree_asset(&object)
                || meta.kind == ItemKind::Trailer && self.usage.got_trailer_asset(&object));

        if wanted || used {
            trace!(candidate = %candidate.full_name(), wanted, "Selected in first pass");
            Decision::Load { meta, wanted }
        } else {
            Decision::Skip
        }
    }

    /// Second pass: buildings, vehicles and items of unknown kind.
    ///
    /// Candidates listed by a style are loaded even when nothing else wants
    /// them.
    pub fn building_vehicle(
        &self,
        pool: &ContentPool,
        candidate: &PoolAsset,
        styles: &StyleCollector,
    ) -> Decision {
        let wanted_by_config = self.load_enabled && pool.effective_enabled(candidate);
        let in_style = styles.contains(&candidate.full_name());
        if !wanted_by_config
            && !in_style
            && !(self.load_used && self.usage.got_building_vehicle_package(&candidate.package))
        {
            return Decision::Skip;
        }

        let meta = match self.decode(candidate) {
            Ok(meta) => meta,
            Err(e) => return Decision::Error(e),
        };
        if !meta.kind.is_second_pass() || !meta.dlc.is_owned_by(self.owned_dlc) {
            return Decision::Skip;
        }

        let object = object_name(candidate, &meta);
        let wanted =
            wanted_by_config || self.load_used && self.usage.got_building_vehicle_asset(&object);

        if wanted || in_style {
            trace!(candidate = %candidate.full_name(), wanted, in_style, "Selected in second pass");
            Decision::Load { meta, wanted }
        } else {
            Decision::Skip
        }
    }

    fn decode(&self, candidate: &PoolAsset) -> Result<AssetMetadata, LoadError> {
        AssetMetadata::decode(candidate.payload()).map_err(|source| LoadError::Metadata {
            asset: candidate.full_name(),
            source,
        })
    }
}

/// Full name of the object a candidate points at.
pub(crate) fn object_name(candidate: &PoolAsset, meta: &AssetMetadata) -> String {
    format!("{}.{}", candidate.package, meta.asset_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{AssetType, Package};
    use crate::prefab::PrefabKind;
    use crate::styles::StyleMetadata;
    use bytes::Bytes;

    fn pool() -> ContentPool {
        ContentPool::from_packages([
            Package::builder("MyPack")
                .item_with_enabled(
                    "Lamp",
                    AssetMetadata::new(ItemKind::Prop, "Lamp_Data"),
                    Bytes::new(),
                    false,
                )
                .build(),
            Package::builder("1234567")
                .item("House", AssetMetadata::new(ItemKind::Building, "House_Data"), Bytes::new())
                .build(),
            Package::builder("2345678")
                .item(
                    "Cart",
                    AssetMetadata::new(ItemKind::Trailer, "Cart_Data"),
                    Bytes::new(),
                )
                .build(),
            Package::builder("3456789")
                .item_with_enabled(
                    "Barn",
                    AssetMetadata::new(ItemKind::Building, "Barn_Data"),
                    Bytes::new(),
                    false,
                )
                .build(),
            Package::builder("Dlc")
                .item(
                    "Kiosk",
                    AssetMetadata::new(ItemKind::Prop, "Kiosk_Data").with_dlc(DlcMask(0b10)),
                    Bytes::new(),
                )
                .asset(PoolAsset::new(
                    "Bad",
                    AssetType::CustomAssetMetaData,
                    Bytes::from_static(&[9]),
                ))
                .build(),
        ])
        .unwrap()
    }

    fn selection(load_enabled: bool, load_used: bool, usage: UsageSets) -> Selection {
        Selection {
            load_enabled,
            load_used,
            owned_dlc: DlcMask(0b01),
            usage: Arc::new(usage),
        }
    }

    fn candidate<'a>(pool: &'a ContentPool, package: &str, name: &str) -> &'a PoolAsset {
        pool.find_in_package(package, name).unwrap()
    }

    #[test]
    fn test_enabled_prop_is_wanted() {
        let pool = pool();
        let sel = selection(true, false, UsageSets::new());
        let cart = candidate(&pool, "2345678", "Cart");
        assert!(matches!(
            sel.prop_tree_trailer(&pool, cart),
            Decision::Load { wanted: true, .. }
        ));
    }

    #[test]
    fn test_disabled_unused_prop_skipped() {
        let pool = pool();
        let sel = selection(true, false, UsageSets::new());
        let lamp = candidate(&pool, "MyPack", "Lamp");
        assert!(matches!(sel.prop_tree_trailer(&pool, lamp), Decision::Skip));
    }

    #[test]
    fn test_used_prop_loaded_when_disabled() {
        let pool = pool();
        let mut usage = UsageSets::new();
        usage.add(PrefabKind::Prop, "MyPack.Lamp_Data");
        let sel = selection(true, true, usage);
        let lamp = candidate(&pool, "MyPack", "Lamp");
        assert!(matches!(
            sel.prop_tree_trailer(&pool, lamp),
            Decision::Load { wanted: false, .. }
        ));
    }

    #[test]
    fn test_used_trailer_matches_vehicle_set() {
        let pool = pool();
        let mut usage = UsageSets::new();
        usage.add(PrefabKind::Vehicle, "2345678.Cart_Data");
        let sel = selection(false, true, usage);
        let cart = candidate(&pool, "2345678", "Cart");
        assert!(sel.prop_tree_trailer(&pool, cart).is_load());
    }

    #[test]
    fn test_wrong_pass_kind_skipped() {
        let pool = pool();
        let sel = selection(true, false, UsageSets::new());
        let house = candidate(&pool, "1234567", "House");
        assert!(matches!(sel.prop_tree_trailer(&pool, house), Decision::Skip));

        let cart = candidate(&pool, "2345678", "Cart");
        assert!(matches!(
            sel.building_vehicle(&pool, cart, &StyleCollector::default()),
            Decision::Skip
        ));
    }

    #[test]
    fn test_unowned_dlc_skipped() {
        let pool = pool();
        let sel = selection(true, false, UsageSets::new());
        let kiosk = candidate(&pool, "Dlc", "Kiosk");
        assert!(matches!(sel.prop_tree_trailer(&pool, kiosk), Decision::Skip));
    }

    #[test]
    fn test_bad_metadata_is_error() {
        let pool = pool();
        let sel = selection(true, false, UsageSets::new());
        let bad = candidate(&pool, "Dlc", "Bad");
        match sel.prop_tree_trailer(&pool, bad) {
            Decision::Error(LoadError::Metadata { asset, .. }) => assert_eq!(asset, "Dlc.Bad"),
            other => panic!("expected metadata error, got {:?}", other),
        }
    }

    #[test]
    fn test_style_member_loaded_unwanted() {
        let pool = pool();
        let sel = selection(true, false, UsageSets::new());
        let mut styles = StyleCollector::default();
        styles.add(
            StyleMetadata::new("Farms", vec!["3456789.Barn".to_string()]),
            "9999999",
            true,
        );

        let barn = candidate(&pool, "3456789", "Barn");
        assert!(matches!(
            sel.building_vehicle(&pool, barn, &styles),
            Decision::Load { wanted: false, .. }
        ));
        assert!(matches!(
            sel.building_vehicle(&pool, barn, &StyleCollector::default()),
            Decision::Skip
        ));
    }

    #[test]
    fn test_used_building_is_wanted() {
        let pool = pool();
        let mut usage = UsageSets::new();
        usage.add(PrefabKind::Building, "3456789.Barn_Data");
        let sel = selection(false, true, usage);
        let barn = candidate(&pool, "3456789", "Barn");
        assert!(matches!(
            sel.building_vehicle(&pool, barn, &StyleCollector::default()),
            Decision::Load { wanted: true, .. }
        ));
    }

    #[test]
    fn test_package_filter_skips_before_decode() {
        let pool = pool();
        let mut usage = UsageSets::new();
        usage.add(PrefabKind::Building, "Elsewhere.Shed_Data");
        let sel = selection(false, true, usage);
        // Metadata is malformed, but the package filter rejects it first.
        let bad = candidate(&pool, "Dlc", "Bad");
        assert!(matches!(
            sel.building_vehicle(&pool, bad, &StyleCollector::default()),
            Decision::Skip
        ));
    }
}
