//! JSON manifests describing a content pool and a saved world.
//!
//! ```json
//! {
//!   "packages": [
//!     {
//!       "name": "1234567",
//!       "items": [
//!         {
//!           "name": "House",
//!           "kind": "building",
//!           "prefab": {
//!             "meshes": ["walls"],
//!             "materials": ["brick"],
//!             "props": [{ "prop": "MyPack.Lamp_Data", "position": [0, 0, 4] }]
//!           }
//!         }
//!       ],
//!       "meshes": [{ "name": "walls", "data": "v 0 0 0" }],
//!       "textures": [{ "name": "brick_d", "data": "rgba" }],
//!       "materials": [{ "name": "brick", "textures": { "_MainTex": "brick_d" } }]
//!     }
//!   ],
//!   "world": { "buildings": [{ "name": "1234567.House_Data", "flags": 1 }] }
//! }
//! ```
//!
//! Resource references name a resource of the same package; anything else
//! is taken as a raw checksum.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use assetloader::pool::{
    payload_checksum, AssetMetadata, AssetType, ContentPool, DlcMask, ItemKind, Package,
    PoolAsset,
};
use assetloader::prefab::{PrefabKind, PrefabPayload};
use assetloader::sharing::MaterialPayload;
use assetloader::styles::StyleMetadata;
use assetloader::usage::SimulationSnapshot;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::CliError;

const DEFAULT_SHADER: &str = "Custom/Buildings/Building/Default";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub packages: Vec<PackageSpec>,
    /// The saved world; absent for a session without one.
    #[serde(default)]
    pub world: Option<SimulationSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
    #[serde(default)]
    pub meshes: Vec<BlobSpec>,
    #[serde(default)]
    pub textures: Vec<BlobSpec>,
    #[serde(default)]
    pub materials: Vec<MaterialSpec>,
    #[serde(default)]
    pub styles: Vec<StyleSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindSpec {
    Building,
    Prop,
    Tree,
    Vehicle,
    Trailer,
    Unknown,
}

impl KindSpec {
    fn item_kind(self) -> ItemKind {
        match self {
            KindSpec::Building => ItemKind::Building,
            KindSpec::Prop => ItemKind::Prop,
            KindSpec::Tree => ItemKind::Tree,
            KindSpec::Vehicle => ItemKind::Vehicle,
            KindSpec::Trailer => ItemKind::Trailer,
            KindSpec::Unknown => ItemKind::Unknown,
        }
    }

    fn prefab_kind(self) -> PrefabKind {
        match self {
            KindSpec::Building | KindSpec::Unknown => PrefabKind::Building,
            KindSpec::Prop => PrefabKind::Prop,
            KindSpec::Tree => PrefabKind::Tree,
            KindSpec::Vehicle | KindSpec::Trailer => PrefabKind::Vehicle,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    pub name: String,
    pub kind: KindSpec,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub dlc: u32,
    /// Object asset name; defaults to `<name>_Data`.
    #[serde(default)]
    pub asset_ref: Option<String>,
    #[serde(default)]
    pub prefab: PrefabSpec,
    /// Store an undecodable object payload.
    #[serde(default)]
    pub broken: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrefabSpec {
    #[serde(default)]
    pub meshes: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub props: Vec<PropSpec>,
    #[serde(default)]
    pub trailers: Vec<TrailerSpec>,
}

fn default_probability() -> i32 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropSpec {
    #[serde(default)]
    pub prop: String,
    #[serde(default)]
    pub tree: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub angle: f32,
    #[serde(default = "default_probability")]
    pub probability: i32,
    #[serde(default)]
    pub fixed_height: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrailerSpec {
    pub name: String,
    #[serde(default = "default_probability")]
    pub probability: i32,
    #[serde(default)]
    pub invert_probability: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobSpec {
    pub name: String,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialSpec {
    pub name: String,
    #[serde(default)]
    pub shader: Option<String>,
    /// Slot name to texture name.
    #[serde(default)]
    pub textures: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StyleSpec {
    pub name: String,
    /// Full names of the listed buildings' metadata assets.
    #[serde(default)]
    pub buildings: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|e| CliError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| CliError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build the content pool.
    pub fn pool(&self) -> Result<ContentPool, CliError> {
        let packages = self.packages.iter().map(PackageSpec::build);
        Ok(ContentPool::from_packages(packages)?)
    }
}

impl PackageSpec {
    fn build(&self) -> Package {
        let mut builder = Package::builder(&self.name);
        if let Some(main) = &self.main {
            builder = builder.main(main);
        }

        let meshes = blobs(&self.meshes);
        let textures = blobs(&self.textures);

        let mut materials = HashMap::new();
        let mut resources = Vec::new();
        for spec in &self.materials {
            let payload = spec.payload(&textures);
            materials.insert(spec.name.as_str(), payload_checksum(&payload));
            resources.push(PoolAsset::new(&spec.name, AssetType::Material, payload));
        }
        for (kind, specs) in [(AssetType::Mesh, &self.meshes), (AssetType::Texture, &self.textures)] {
            for spec in specs {
                resources.push(PoolAsset::new(
                    &spec.name,
                    kind,
                    Bytes::from(spec.data.clone().into_bytes()),
                ));
            }
        }

        for item in &self.items {
            let asset_ref = item
                .asset_ref
                .clone()
                .unwrap_or_else(|| format!("{}_Data", item.name));
            let meta = AssetMetadata::new(item.kind.item_kind(), &asset_ref).with_dlc(DlcMask(item.dlc));
            let prefab = if item.broken {
                Bytes::from_static(&[0xff])
            } else {
                item.prefab.payload(&asset_ref, item.kind.prefab_kind(), &meshes, &materials)
            };
            builder = builder.item_with_enabled(&item.name, meta, prefab, item.enabled);
        }

        for style in &self.styles {
            let meta = StyleMetadata::new(&style.name, style.buildings.clone());
            builder = builder.asset(
                PoolAsset::new(&style.name, AssetType::DistrictStyleMetaData, meta.encode())
                    .with_enabled(style.enabled),
            );
        }

        resources.into_iter().fold(builder, |b, r| b.asset(r)).build()
    }
}

impl MaterialSpec {
    fn payload(&self, textures: &HashMap<&str, String>) -> Bytes {
        let shader = self.shader.as_deref().unwrap_or(DEFAULT_SHADER);
        self.textures
            .iter()
            .fold(MaterialPayload::new(&self.name, shader), |m, (slot, texture)| {
                m.texture(slot, Some(resolve(textures, texture)))
            })
            .build()
    }
}

impl PrefabSpec {
    fn payload(
        &self,
        name: &str,
        kind: PrefabKind,
        meshes: &HashMap<&str, String>,
        materials: &HashMap<&str, String>,
    ) -> Bytes {
        let mut payload = PrefabPayload::new(name, kind);
        for mesh in &self.meshes {
            payload = payload.mesh(resolve(meshes, mesh));
        }
        if !self.materials.is_empty() {
            let checksums: Vec<&str> = self
                .materials
                .iter()
                .map(|m| resolve(materials, m))
                .collect();
            payload = payload.materials(&checksums);
        }
        for p in &self.props {
            payload = payload.building_prop(
                &p.prop,
                &p.tree,
                p.position,
                p.angle,
                p.probability,
                p.fixed_height,
            );
        }
        for t in &self.trailers {
            payload = payload.trailer(&t.name, t.probability, t.invert_probability);
        }
        payload.build()
    }
}

/// Resource name to checksum.
fn blobs(specs: &[BlobSpec]) -> HashMap<&str, String> {
    specs
        .iter()
        .map(|s| (s.name.as_str(), payload_checksum(s.data.as_bytes())))
        .collect()
}

fn resolve<'a>(by_name: &'a HashMap<&str, String>, reference: &'a str) -> &'a str {
    by_name.get(reference).map(String::as_str).unwrap_or(reference)
}
