//! Indexed content pool.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::asset::{AssetType, PoolAsset};
use super::package::Package;
use crate::ident::{package_split, workshop_package_id};

/// Errors raised while assembling a content pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Two packages share a name.
    #[error("duplicate package: {0}")]
    DuplicatePackage(String),
}

/// The host's package store.
///
/// Packages keep their insertion order, which is also the enumeration order
/// of [`ContentPool::filter_assets`]. A checksum index maps every payload
/// checksum to the first asset carrying it.
#[derive(Debug, Default)]
pub struct ContentPool {
    packages: Vec<Package>,
    by_name: HashMap<String, usize>,
    by_workshop_id: HashMap<u64, usize>,
    by_checksum: HashMap<(AssetType, String), Arc<PoolAsset>>,
}

impl ContentPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from packages.
    pub fn from_packages(packages: impl IntoIterator<Item = Package>) -> Result<Self, PoolError> {
        let mut pool = Self::new();
        for package in packages {
            pool.add_package(package)?;
        }
        Ok(pool)
    }

    /// Add a package and index its assets.
    pub fn add_package(&mut self, package: Package) -> Result<(), PoolError> {
        if self.by_name.contains_key(&package.name) {
            return Err(PoolError::DuplicatePackage(package.name));
        }

        let index = self.packages.len();
        for asset in package.assets() {
            self.by_checksum
                .entry((asset.asset_type, asset.checksum().to_string()))
                .or_insert_with(|| Arc::clone(asset));
        }
        if let Some(id) = package.workshop_id {
            self.by_workshop_id.insert(id, index);
        }
        self.by_name.insert(package.name.clone(), index);

        debug!(package = %package.name, assets = package.assets().len(), "Package added to pool");
        self.packages.push(package);
        Ok(())
    }

    /// All packages in insertion order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if the pool has no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Every asset of one type, in package order.
    pub fn filter_assets(&self, asset_type: AssetType) -> impl Iterator<Item = &Arc<PoolAsset>> + '_ {
        self.packages
            .iter()
            .flat_map(|p| p.assets().iter())
            .filter(move |a| a.asset_type == asset_type)
    }

    /// Package by name.
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.by_name.get(name).map(|&i| &self.packages[i])
    }

    /// Package by workshop id.
    pub fn find_package_by_workshop_id(&self, id: u64) -> Option<&Package> {
        self.by_workshop_id.get(&id).map(|&i| &self.packages[i])
    }

    /// Asset by package and asset name.
    pub fn find_in_package(&self, package: &str, name: &str) -> Option<&Arc<PoolAsset>> {
        self.package(package).and_then(|p| p.find(name))
    }

    /// Sub-resource by payload checksum.
    pub fn find_by_checksum(&self, asset_type: AssetType, checksum: &str) -> Option<&Arc<PoolAsset>> {
        self.by_checksum.get(&(asset_type, checksum.to_string()))
    }

    /// Enabled flag that honours the package's main asset.
    ///
    /// The host store reports secondary metadata records as always enabled.
    /// A secondary asset therefore inherits the main asset's flag, and is
    /// disabled when the main asset is missing.
    pub fn effective_enabled(&self, asset: &PoolAsset) -> bool {
        if asset.is_main {
            return asset.enabled;
        }
        self.package(&asset.package)
            .and_then(|p| p.find(&p.main_asset))
            .map(|main| main.enabled)
            .unwrap_or(false)
    }

    /// Find an object asset by `package.name`.
    ///
    /// Dots may appear anywhere, so a workshop package is tried first: the
    /// text before the first dot parsed as a workshop id, the rest as the
    /// asset name. Otherwise every object asset is scanned for a matching
    /// full name or, for early names without a package, a matching name.
    pub fn find_asset(&self, name: &str) -> Option<&Arc<PoolAsset>> {
        if let Some(j) = package_split(name) {
            let found = workshop_package_id(&name[..j])
                .and_then(|id| self.find_package_by_workshop_id(id))
                .and_then(|p| p.find(&name[j + 1..]));
            if found.is_some() {
                return found;
            }
        }

        self.filter_assets(AssetType::Object)
            .find(|a| a.full_name() == name || a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{AssetMetadata, ItemKind};
    use bytes::Bytes;

    fn pool() -> ContentPool {
        let mesh = PoolAsset::new("mesh", AssetType::Mesh, Bytes::from_static(b"verts"));
        ContentPool::from_packages([
            Package::builder("MyPack")
                .item("Lamp", AssetMetadata::new(ItemKind::Prop, "Lamp_Data"), Bytes::new())
                .item_with_enabled(
                    "Bench",
                    AssetMetadata::new(ItemKind::Prop, "Bench_Data"),
                    Bytes::from_static(b"bench"),
                    true,
                )
                .asset(mesh)
                .build(),
            Package::builder("1234567")
                .item_with_enabled(
                    "Bus",
                    AssetMetadata::new(ItemKind::Vehicle, "Bus_Data"),
                    Bytes::from_static(b"bus"),
                    false,
                )
                .item(
                    "Trailer",
                    AssetMetadata::new(ItemKind::Trailer, "Trailer_Data"),
                    Bytes::from_static(b"trailer"),
                )
                .build(),
            Package::builder("Orphan")
                .main("Gone")
                .item("Tree", AssetMetadata::new(ItemKind::Tree, "Tree_Data"), Bytes::new())
                .build(),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_package() {
        let mut pool = pool();
        let err = pool.add_package(Package::builder("MyPack").build());
        assert_eq!(err, Err(PoolError::DuplicatePackage("MyPack".to_string())));
    }

    #[test]
    fn test_filter_assets_in_order() {
        let pool = pool();
        let names: Vec<_> = pool
            .filter_assets(AssetType::CustomAssetMetaData)
            .map(|a| a.full_name())
            .collect();
        assert_eq!(
            names,
            vec!["MyPack.Lamp", "MyPack.Bench", "1234567.Bus", "1234567.Trailer", "Orphan.Tree"]
        );
    }

    #[test]
    fn test_effective_enabled_main() {
        let pool = pool();
        let bus = pool.find_in_package("1234567", "Bus").unwrap();
        assert!(!pool.effective_enabled(bus));
    }

    #[test]
    fn test_effective_enabled_inherits_from_main() {
        let pool = pool();
        // Raw flag is true, but the main asset is disabled.
        let trailer = pool.find_in_package("1234567", "Trailer").unwrap();
        assert!(trailer.enabled);
        assert!(!pool.effective_enabled(trailer));

        let bench = pool.find_in_package("MyPack", "Bench").unwrap();
        assert!(pool.effective_enabled(bench));
    }

    #[test]
    fn test_effective_enabled_missing_main() {
        let pool = pool();
        let tree = pool.find_in_package("Orphan", "Tree").unwrap();
        assert!(!pool.effective_enabled(tree));
    }

    #[test]
    fn test_find_asset_workshop_fast_path() {
        let pool = pool();
        let found = pool.find_asset("1234567.Bus_Data").unwrap();
        assert_eq!(found.full_name(), "1234567.Bus_Data");
    }

    #[test]
    fn test_find_asset_by_full_name() {
        let pool = pool();
        let found = pool.find_asset("MyPack.Lamp_Data").unwrap();
        assert_eq!(found.asset_type, AssetType::Object);
    }

    #[test]
    fn test_find_asset_legacy_name() {
        let pool = pool();
        let found = pool.find_asset("Bench_Data").unwrap();
        assert_eq!(found.full_name(), "MyPack.Bench_Data");
    }

    #[test]
    fn test_find_asset_only_objects() {
        let pool = pool();
        assert!(pool.find_asset("MyPack.Lamp").is_none());
        assert!(pool.find_asset("Nope.Nothing").is_none());
    }

    #[test]
    fn test_find_by_checksum() {
        let pool = pool();
        let checksum = crate::pool::payload_checksum(b"verts");
        let mesh = pool.find_by_checksum(AssetType::Mesh, &checksum).unwrap();
        assert_eq!(mesh.name, "mesh");
        assert!(pool.find_by_checksum(AssetType::Texture, &checksum).is_none());
    }

    #[test]
    fn test_find_package_by_workshop_id() {
        let pool = pool();
        assert_eq!(
            pool.find_package_by_workshop_id(1234567).map(|p| p.name.as_str()),
            Some("1234567")
        );
        assert!(pool.find_package_by_workshop_id(42).is_none());
    }
}
