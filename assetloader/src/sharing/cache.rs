//! Per-session sharing cache.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::resource::{Material, Mesh, Texture};
use super::table::ChecksumTable;
use super::{ResourceKind, SharingOptions};
use crate::error::{LoadError, LoadResult};
use crate::pool::{AssetType, ContentPool};

/// A resource type stored in one of the [`SharingCache`] tables.
pub trait SharedResource: Sized {
    /// Kind used for the sharing toggle.
    const KIND: ResourceKind;

    /// The table holding this type.
    fn table(cache: &SharingCache) -> &ChecksumTable<Self>;
}

impl SharedResource for Texture {
    const KIND: ResourceKind = ResourceKind::Texture;

    fn table(cache: &SharingCache) -> &ChecksumTable<Self> {
        &cache.textures
    }
}

impl SharedResource for Material {
    const KIND: ResourceKind = ResourceKind::Material;

    fn table(cache: &SharingCache) -> &ChecksumTable<Self> {
        &cache.materials
    }
}

impl SharedResource for Mesh {
    const KIND: ResourceKind = ResourceKind::Mesh;

    fn table(cache: &SharingCache) -> &ChecksumTable<Self> {
        &cache.meshes
    }
}

/// Hit/load counts for one resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub hits: u64,
    pub loads: u64,
}

/// Snapshot of sharing statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SharingStats {
    pub textures: KindStats,
    pub materials: KindStats,
    pub meshes: KindStats,
}

impl fmt::Display for SharingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Textures / Materials / Meshes loaded: {} / {} / {} referenced: {} / {} / {}",
            self.textures.loads,
            self.materials.loads,
            self.meshes.loads,
            self.textures.hits,
            self.materials.hits,
            self.meshes.hits
        )
    }
}

/// Sub-resource cache shared by every decode in a session.
///
/// Created at session start, consulted by the prefab decoder for each
/// checksum it meets, and released by [`SharingCache::teardown`].
#[derive(Debug)]
pub struct SharingCache {
    options: SharingOptions,
    textures: ChecksumTable<Texture>,
    materials: ChecksumTable<Material>,
    meshes: ChecksumTable<Mesh>,
}

impl SharingCache {
    /// Create an empty cache.
    pub fn new(options: SharingOptions) -> Self {
        Self {
            options,
            textures: ChecksumTable::new(),
            materials: ChecksumTable::new(),
            meshes: ChecksumTable::new(),
        }
    }

    /// Sharing toggles in effect.
    pub fn options(&self) -> SharingOptions {
        self.options
    }

    /// Return the resource for `checksum`, loading it when needed.
    ///
    /// When sharing is enabled for `T`, a cached handle is returned if
    /// present; otherwise `loader` runs and its result is stored. When
    /// sharing is disabled for `T`, `loader` always runs and nothing is
    /// stored.
    pub fn get_or_load<T, E>(
        &self,
        checksum: &str,
        loader: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E>
    where
        T: SharedResource,
    {
        let table = T::table(self);
        if self.options.shares(T::KIND) {
            table.get_or_load(checksum, loader)
        } else {
            table.load_unshared(loader)
        }
    }

    /// Texture by checksum, loaded from the pool.
    pub fn texture(&self, checksum: &str, pool: &ContentPool) -> LoadResult<Arc<Texture>> {
        self.get_or_load(checksum, || {
            let asset = find(pool, AssetType::Texture, ResourceKind::Texture, checksum)?;
            Ok(Texture::new(checksum, asset))
        })
    }

    /// Mesh by checksum, loaded from the pool.
    pub fn mesh(&self, checksum: &str, pool: &ContentPool) -> LoadResult<Arc<Mesh>> {
        self.get_or_load(checksum, || {
            let asset = find(pool, AssetType::Mesh, ResourceKind::Mesh, checksum)?;
            Ok(Mesh::new(checksum, asset))
        })
    }

    /// Material by checksum, loaded from the pool.
    ///
    /// Texture properties go through [`SharingCache::texture`].
    pub fn material(&self, checksum: &str, pool: &ContentPool) -> LoadResult<Arc<Material>> {
        self.get_or_load(checksum, || {
            let asset = pool
                .find_by_checksum(AssetType::Material, checksum)
                .ok_or_else(|| missing(ResourceKind::Material, checksum))?;
            Material::decode(&asset.full_name(), asset.payload(), |tex| {
                self.texture(tex, pool)
            })
        })
    }

    /// Current statistics.
    pub fn stats(&self) -> SharingStats {
        SharingStats {
            textures: kind_stats(&self.textures),
            materials: kind_stats(&self.materials),
            meshes: kind_stats(&self.meshes),
        }
    }

    /// Log final statistics and release every table.
    pub fn teardown(&self) -> SharingStats {
        let stats = self.stats();
        info!(
            textures_loaded = stats.textures.loads,
            materials_loaded = stats.materials.loads,
            meshes_loaded = stats.meshes.loads,
            textures_referenced = stats.textures.hits,
            materials_referenced = stats.materials.hits,
            meshes_referenced = stats.meshes.hits,
            "Sharing cache released"
        );
        self.textures.clear();
        self.materials.clear();
        self.meshes.clear();
        stats
    }
}

fn kind_stats<T>(table: &ChecksumTable<T>) -> KindStats {
    KindStats {
        hits: table.hits(),
        loads: table.loads(),
    }
}

fn missing(kind: ResourceKind, checksum: &str) -> LoadError {
    LoadError::MissingResource {
        kind,
        checksum: checksum.to_string(),
    }
}

fn find(
    pool: &ContentPool,
    asset_type: AssetType,
    kind: ResourceKind,
    checksum: &str,
) -> LoadResult<bytes::Bytes> {
    let asset = pool
        .find_by_checksum(asset_type, checksum)
        .ok_or_else(|| missing(kind, checksum))?;
    debug!(%kind, checksum, asset = %asset.full_name(), "Loading shared resource");
    Ok(asset.payload())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{payload_checksum, Package, PoolAsset};
    use crate::sharing::MaterialPayload;
    use bytes::Bytes;
    use std::cell::Cell;

    fn pool_with(assets: Vec<PoolAsset>) -> ContentPool {
        let mut builder = Package::builder("Res");
        for asset in assets {
            builder = builder.asset(asset);
        }
        ContentPool::from_packages([builder.build()]).unwrap()
    }

    #[test]
    fn test_shared_mesh_loads_once() {
        let cache = SharingCache::new(SharingOptions::default());
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok::<_, LoadError>(Mesh::new("abc", Bytes::new()))
        };

        let a = cache.get_or_load::<Mesh, _>("abc", load).unwrap();
        let b = cache.get_or_load::<Mesh, _>("abc", load).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.stats().meshes, KindStats { hits: 1, loads: 1 });
    }

    #[test]
    fn test_unshared_mesh_loads_every_time() {
        let options = SharingOptions {
            meshes: false,
            ..SharingOptions::default()
        };
        let cache = SharingCache::new(options);
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok::<_, LoadError>(Mesh::new("abc", Bytes::new()))
        };

        let a = cache.get_or_load::<Mesh, _>("abc", load).unwrap();
        let b = cache.get_or_load::<Mesh, _>("abc", load).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.stats().meshes, KindStats { hits: 0, loads: 2 });
    }

    #[test]
    fn test_mesh_from_pool() {
        let data = Bytes::from_static(b"mesh-data");
        let checksum = payload_checksum(&data);
        let pool = pool_with(vec![PoolAsset::new("m", AssetType::Mesh, data.clone())]);
        let cache = SharingCache::new(SharingOptions::default());

        let mesh = cache.mesh(&checksum, &pool).unwrap();
        assert_eq!(mesh.data, data);

        let err = cache.mesh("nope", &pool).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingResource {
                kind: ResourceKind::Mesh,
                ..
            }
        ));
        assert_eq!(cache.stats().meshes.loads, 1);
    }

    #[test]
    fn test_material_shares_textures() {
        let tex = Bytes::from_static(b"pixels");
        let tex_checksum = payload_checksum(&tex);
        let mat_a = MaterialPayload::new("a", "Shader")
            .texture("_MainTex", Some(&tex_checksum))
            .build();
        let mat_b = MaterialPayload::new("b", "Shader")
            .texture("_MainTex", Some(&tex_checksum))
            .build();
        let a_checksum = payload_checksum(&mat_a);
        let b_checksum = payload_checksum(&mat_b);

        let pool = pool_with(vec![
            PoolAsset::new("tex", AssetType::Texture, tex),
            PoolAsset::new("mat_a", AssetType::Material, mat_a),
            PoolAsset::new("mat_b", AssetType::Material, mat_b),
        ]);
        let cache = SharingCache::new(SharingOptions::default());

        let a = cache.material(&a_checksum, &pool).unwrap();
        let b = cache.material(&b_checksum, &pool).unwrap();
        let again = cache.material(&a_checksum, &pool).unwrap();

        assert!(Arc::ptr_eq(&a, &again));
        let ta = a.textures().next().unwrap();
        let tb = b.textures().next().unwrap();
        assert!(Arc::ptr_eq(ta, tb));

        let stats = cache.stats();
        assert_eq!(stats.textures, KindStats { hits: 1, loads: 1 });
        assert_eq!(stats.materials, KindStats { hits: 1, loads: 2 });
    }

    #[test]
    fn test_teardown_clears_and_reports() {
        let cache = SharingCache::new(SharingOptions::default());
        cache
            .get_or_load::<Texture, _>("t", || Ok::<_, LoadError>(Texture::new("t", Bytes::new())))
            .unwrap();

        let stats = cache.teardown();
        assert_eq!(stats.textures.loads, 1);
        assert!(cache.textures.is_empty());
        assert_eq!(
            stats.to_string(),
            "Textures / Materials / Meshes loaded: 1 / 0 / 0 referenced: 0 / 0 / 0"
        );
    }
}
