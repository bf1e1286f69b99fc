//! Package type and builder.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::asset::{AssetType, PoolAsset};
use super::metadata::AssetMetadata;
use crate::ident::workshop_package_id;

/// A named bundle of assets.
///
/// # Example
///
/// ```
/// use assetloader::pool::{AssetMetadata, ItemKind, Package};
/// use bytes::Bytes;
///
/// let package = Package::builder("MyPack")
///     .item("Lamp", AssetMetadata::new(ItemKind::Prop, "Lamp_Data"), Bytes::new())
///     .build();
///
/// assert_eq!(package.main_asset, "Lamp");
/// assert!(package.find("Lamp_Data").is_some());
/// assert_eq!(package.workshop_id, None);
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    /// Package name; a numeric name denotes published workshop content.
    pub name: String,

    /// Name of the main asset.
    pub main_asset: String,

    /// Workshop id, when the package name parses as one.
    pub workshop_id: Option<u64>,

    assets: Vec<Arc<PoolAsset>>,
}

impl Package {
    /// Start building a package.
    pub fn builder(name: impl Into<String>) -> PackageBuilder {
        PackageBuilder::new(name)
    }

    /// Find an asset by name.
    pub fn find(&self, name: &str) -> Option<&Arc<PoolAsset>> {
        self.assets.iter().find(|a| a.name == name)
    }

    /// All assets of this package.
    pub fn assets(&self) -> &[Arc<PoolAsset>] {
        &self.assets
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} assets)", self.name, self.assets.len())
    }
}

/// Builder for [`Package`].
///
/// The first metadata asset added becomes the main asset unless
/// [`PackageBuilder::main`] names another one.
#[derive(Debug)]
pub struct PackageBuilder {
    name: String,
    main_asset: Option<String>,
    assets: Vec<PoolAsset>,
}

impl PackageBuilder {
    /// Create a builder for a package name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_asset: None,
            assets: Vec::new(),
        }
    }

    /// Name the main asset explicitly.
    pub fn main(mut self, name: impl Into<String>) -> Self {
        self.main_asset = Some(name.into());
        self
    }

    /// Add an arbitrary asset.
    pub fn asset(mut self, asset: PoolAsset) -> Self {
        self.assets.push(asset);
        self
    }

    /// Add an enabled item: a metadata record plus its object payload.
    pub fn item(self, name: impl Into<String>, meta: AssetMetadata, prefab: Bytes) -> Self {
        self.item_with_enabled(name, meta, prefab, true)
    }

    /// Add an item with an explicit raw enabled flag.
    pub fn item_with_enabled(
        self,
        name: impl Into<String>,
        meta: AssetMetadata,
        prefab: Bytes,
        enabled: bool,
    ) -> Self {
        let object = PoolAsset::new(meta.asset_ref.clone(), AssetType::Object, prefab);
        let record = PoolAsset::new(name, AssetType::CustomAssetMetaData, meta.encode())
            .with_enabled(enabled);
        self.asset(record).asset(object)
    }

    /// Finish the package.
    pub fn build(self) -> Package {
        let main_asset = self.main_asset.unwrap_or_else(|| {
            self.assets
                .iter()
                .find(|a| a.asset_type == AssetType::CustomAssetMetaData)
                .or_else(|| self.assets.first())
                .map(|a| a.name.clone())
                .unwrap_or_default()
        });

        let assets = self
            .assets
            .into_iter()
            .map(|mut asset| {
                asset.package = self.name.clone();
                asset.is_main = asset.name == main_asset;
                Arc::new(asset)
            })
            .collect();

        Package {
            workshop_id: workshop_package_id(&self.name),
            name: self.name,
            main_asset,
            assets,
        }
    }
}
