//! Style groupings.
//!
//! A style is a named list of buildings. Every building a style lists is
//! loaded in the second pass even when neither the configuration nor the
//! saved world wants it; such buildings are marked "do not spawn normally".
//!
//! Styles are collected before the passes and finalized after them, when
//! the listed buildings can be looked up in the prefab registry.

use std::collections::HashSet;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{CodecResult, PackageReader, PackageWriter};
use crate::pool::{AssetType, ContentPool};
use crate::prefab::{PrefabKind, PrefabRegistry};

/// Decoded `DistrictStyleMetaData` record.
///
/// Payload layout: `string` name, `bool` built-in, `i32` count, then
/// `string` full names of the listed buildings' metadata assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleMetadata {
    pub name: String,
    pub builtin: bool,
    pub assets: Vec<String>,
}

impl StyleMetadata {
    pub fn new(name: impl Into<String>, assets: Vec<String>) -> Self {
        Self {
            name: name.into(),
            builtin: false,
            assets,
        }
    }

    pub fn decode(payload: Bytes) -> CodecResult<Self> {
        let mut r = PackageReader::new(payload);
        let name = r.read_string()?;
        let builtin = r.read_bool()?;
        let count = r.read_count("style asset")?;
        let mut assets = Vec::with_capacity(count.min(256));
        for _ in 0..count {
            assets.push(r.read_string()?);
        }
        Ok(Self {
            name,
            builtin,
            assets,
        })
    }

    pub fn encode(&self) -> Bytes {
        let mut w = PackageWriter::new();
        w.write_string(&self.name)
            .write_bool(self.builtin)
            .write_count(self.assets.len());
        for asset in &self.assets {
            w.write_string(asset);
        }
        w.finish()
    }
}

/// A finalized style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictStyle {
    pub name: String,
    /// Owning package name, set for workshop styles only.
    pub package_name: Option<String>,
    /// Registered building prefab names.
    pub buildings: Vec<String>,
}

#[derive(Debug, Clone)]
struct CollectedStyle {
    meta: StyleMetadata,
    package: String,
    workshop: bool,
}

/// Style metadata gathered at session start.
#[derive(Debug, Clone, Default)]
pub struct StyleCollector {
    styles: Vec<CollectedStyle>,
    buildings: HashSet<String>,
}

impl StyleCollector {
    /// Gather every enabled, non-built-in style in the pool.
    ///
    /// Styles whose metadata cannot be decoded are logged and skipped.
    pub fn collect(pool: &ContentPool) -> Self {
        let mut collector = Self::default();

        for asset in pool.filter_assets(AssetType::DistrictStyleMetaData) {
            if !asset.enabled {
                continue;
            }
            let meta = match StyleMetadata::decode(asset.payload()) {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(asset = %asset.full_name(), error = %e, "Loading custom district style failed");
                    continue;
                }
            };
            if meta.builtin {
                continue;
            }

            let workshop = pool
                .package(&asset.package)
                .map(|p| p.workshop_id.is_some())
                .unwrap_or(false);
            collector.add(meta, &asset.package, workshop);
        }

        info!(
            styles = collector.styles.len(),
            buildings = collector.buildings.len(),
            "District styles collected"
        );
        collector
    }

    /// Add a style directly.
    pub fn add(&mut self, meta: StyleMetadata, package: &str, workshop: bool) {
        self.buildings.extend(meta.assets.iter().cloned());
        self.styles.push(CollectedStyle {
            meta,
            package: package.to_string(),
            workshop,
        });
    }

    /// Check if a metadata asset's full name is listed by any style.
    pub fn contains(&self, full_name: &str) -> bool {
        self.buildings.contains(full_name)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Resolve every style's buildings against the registry.
    ///
    /// A listed name is tried as is, then with the `_Data` suffix prefab
    /// objects carry. Missing buildings are logged and left out.
    pub fn finalize(&self, registry: &PrefabRegistry) -> Vec<DistrictStyle> {
        self.styles
            .iter()
            .map(|style| {
                let mut buildings = Vec::with_capacity(style.meta.assets.len());
                for asset in &style.meta.assets {
                    let found = registry
                        .find_loaded(PrefabKind::Building, asset)
                        .or_else(|| {
                            registry.find_loaded(PrefabKind::Building, &format!("{}_Data", asset))
                        });
                    match found {
                        Some(prefab) => buildings.push(prefab.name.clone()),
                        None => warn!(asset = %asset, style = %style.meta.name, "Missing asset in style"),
                    }
                }
                debug!(style = %style.meta.name, buildings = buildings.len(), "Style finalized");

                DistrictStyle {
                    name: style.meta.name.clone(),
                    package_name: style.workshop.then(|| style.package.clone()),
                    buildings,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Package, PoolAsset};
    use crate::prefab::Prefab;

    fn style_asset(name: &str, meta: &StyleMetadata, enabled: bool) -> PoolAsset {
        PoolAsset::new(name, AssetType::DistrictStyleMetaData, meta.encode()).with_enabled(enabled)
    }

    #[test]
    fn test_metadata_decode() {
        let meta = StyleMetadata::new("Euro", vec!["1234567.House".to_string()]);
        assert_eq!(StyleMetadata::decode(meta.encode()).unwrap(), meta);
    }

    #[test]
    fn test_collect_skips_disabled_builtin_and_broken() {
        let good = StyleMetadata::new("Good", vec!["1234567.House".to_string()]);
        let off = StyleMetadata::new("Off", vec!["1234567.Shed".to_string()]);
        let mut builtin = StyleMetadata::new("Builtin", vec!["1234567.Barn".to_string()]);
        builtin.builtin = true;

        let pool = ContentPool::from_packages([Package::builder("7654321")
            .asset(style_asset("Good", &good, true))
            .asset(style_asset("Off", &off, false))
            .asset(style_asset("Builtin", &builtin, true))
            .asset(PoolAsset::new(
                "Broken",
                AssetType::DistrictStyleMetaData,
                Bytes::from_static(&[3]),
            ))
            .build()])
        .unwrap();

        let collector = StyleCollector::collect(&pool);
        assert_eq!(collector.len(), 1);
        assert!(collector.contains("1234567.House"));
        assert!(!collector.contains("1234567.Shed"));
        assert!(!collector.contains("1234567.Barn"));
    }

    #[test]
    fn test_finalize_resolves_data_suffix() {
        let mut collector = StyleCollector::default();
        collector.add(
            StyleMetadata::new(
                "Mine",
                vec!["1234567.House".to_string(), "1234567.Gone".to_string()],
            ),
            "7654321",
            true,
        );
        collector.add(StyleMetadata::new("Local", vec![]), "MyStyles", false);

        let registry = PrefabRegistry::new();
        registry.register(Prefab::new("1234567.House_Data", PrefabKind::Building));

        let styles = collector.finalize(&registry);
        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0].buildings, vec!["1234567.House_Data"]);
        assert_eq!(styles[0].package_name.as_deref(), Some("7654321"));
        assert_eq!(styles[1].package_name, None);
    }
}
