//! Prefab payload decoding.
//!
//! Object payloads use the package codec:
//!
//! ```text
//! string  object name
//! i32     prefab kind (0 building, 1 prop, 2 tree, 3 vehicle)
//! i32     component count
//! component*:
//!   i32 0  mesh filter     string mesh checksum
//!   i32 1  mesh renderer   i32 count, string material checksum * count
//!   i32 2  field           i32 field kind, field data
//! ```
//!
//! Shared sub-resources go through the session's [`SharingCache`]. Field
//! data goes through a [`FieldResolver`] so the loader can intercept the
//! kinds that reference other prefabs.

use bytes::Bytes;
use tracing::trace;

use super::model::{FieldKind, FieldValue, Prefab, PrefabKind};
use crate::codec::{CodecError, PackageReader, PackageWriter};
use crate::error::{LoadError, LoadResult};
use crate::pool::{ContentPool, PoolAsset};
use crate::sharing::SharingCache;

const COMPONENT_MESH_FILTER: i32 = 0;
const COMPONENT_MESH_RENDERER: i32 = 1;
const COMPONENT_FIELD: i32 = 2;

/// Where a field is being decoded.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Package of the object being decoded.
    pub package: &'a str,
    /// Full name of the object being decoded.
    pub referrer: &'a str,
}

/// Strategy for decoding one serialized field.
///
/// The host installs one resolver per session. Implementations consume
/// exactly the bytes of the field they are given.
pub trait FieldResolver: Send + Sync {
    fn resolve(
        &self,
        ctx: &FieldContext<'_>,
        kind: FieldKind,
        reader: &mut PackageReader,
    ) -> LoadResult<FieldValue>;
}

/// Default resolver for primitive fields.
///
/// Cross-reference kinds need the prefab registry and are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveFieldResolver;

impl FieldResolver for PrimitiveFieldResolver {
    fn resolve(
        &self,
        ctx: &FieldContext<'_>,
        kind: FieldKind,
        reader: &mut PackageReader,
    ) -> LoadResult<FieldValue> {
        let codec = |source: CodecError| LoadError::Payload {
            asset: ctx.referrer.to_string(),
            source,
        };
        let value = match kind {
            FieldKind::Float => FieldValue::Float(reader.read_f32().map_err(codec)?),
            FieldKind::Int => FieldValue::Int(reader.read_i32().map_err(codec)?),
            FieldKind::Bool => FieldValue::Bool(reader.read_bool().map_err(codec)?),
            FieldKind::Text => FieldValue::Text(reader.read_string().map_err(codec)?),
            FieldKind::Vec3 => FieldValue::Vec3(reader.read_vec3().map_err(codec)?),
            FieldKind::BuildingProp | FieldKind::VehicleTrailer => {
                return Err(LoadError::UnsupportedField(kind.name()))
            }
        };
        Ok(value)
    }
}

/// Everything a decoder may call back into during one instantiation.
#[derive(Clone, Copy)]
pub struct DecodeHooks<'a> {
    /// Package owning the object.
    pub package: &'a str,
    /// Full name of the object, reported as referrer for missing references.
    pub referrer: &'a str,
    pub sharing: &'a SharingCache,
    pub pool: &'a ContentPool,
    pub resolver: &'a dyn FieldResolver,
}

impl DecodeHooks<'_> {
    fn field_context(&self) -> FieldContext<'_> {
        FieldContext {
            package: self.package,
            referrer: self.referrer,
        }
    }
}

/// Host deserializer for object payloads.
pub trait AssetDecoder: Send + Sync {
    /// Decode an object asset into a prefab.
    ///
    /// The returned prefab carries the decoded object name; the loader
    /// qualifies it with the package.
    fn decode(&self, object: &PoolAsset, hooks: &DecodeHooks<'_>) -> LoadResult<Prefab>;
}

/// Stock decoder for the package object format.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadDecoder;

impl AssetDecoder for PayloadDecoder {
    fn decode(&self, object: &PoolAsset, hooks: &DecodeHooks<'_>) -> LoadResult<Prefab> {
        let asset = object.full_name();
        let codec = |source: CodecError| LoadError::Payload {
            asset: asset.clone(),
            source,
        };

        let mut r = PackageReader::new(object.payload());
        let name = r.read_string().map_err(codec)?;
        let kind = PrefabKind::from_tag(r.read_i32().map_err(codec)?).map_err(codec)?;
        let components = r.read_count("component").map_err(codec)?;

        let mut prefab = Prefab::new(name, kind);
        let ctx = hooks.field_context();

        for _ in 0..components {
            match r.read_i32().map_err(codec)? {
                COMPONENT_MESH_FILTER => {
                    let checksum = r.read_string().map_err(codec)?;
                    prefab.meshes.push(hooks.sharing.mesh(&checksum, hooks.pool)?);
                }
                COMPONENT_MESH_RENDERER => {
                    let count = r.read_count("material").map_err(codec)?;
                    for _ in 0..count {
                        let checksum = r.read_string().map_err(codec)?;
                        prefab
                            .materials
                            .push(hooks.sharing.material(&checksum, hooks.pool)?);
                    }
                }
                COMPONENT_FIELD => {
                    let field = FieldKind::from_tag(r.read_i32().map_err(codec)?).map_err(codec)?;
                    match hooks.resolver.resolve(&ctx, field, &mut r)? {
                        FieldValue::BuildingProp(p) => prefab.props.push(p),
                        FieldValue::VehicleTrailer(t) => prefab.trailers.push(t),
                        other => prefab.fields.push(other),
                    }
                }
                tag => {
                    return Err(codec(CodecError::UnknownTag {
                        what: "component",
                        tag,
                    }))
                }
            }
        }

        trace!(
            asset = %asset,
            kind = %prefab.kind,
            meshes = prefab.meshes.len(),
            materials = prefab.materials.len(),
            props = prefab.props.len(),
            "Decoded prefab"
        );
        Ok(prefab)
    }
}

/// Builder for object payloads.
///
/// # Example
///
/// ```
/// use assetloader::prefab::{PrefabKind, PrefabPayload};
///
/// let payload = PrefabPayload::new("House_Data", PrefabKind::Building)
///     .mesh("abc")
///     .building_prop("MyPack.Lamp_Data", "", [0.0, 0.0, 4.0], 90.0, 100, false)
///     .build();
/// assert!(!payload.is_empty());
/// ```
#[derive(Debug)]
pub struct PrefabPayload {
    name: String,
    kind: PrefabKind,
    count: usize,
    body: PackageWriter,
}

impl PrefabPayload {
    pub fn new(name: impl Into<String>, kind: PrefabKind) -> Self {
        Self {
            name: name.into(),
            kind,
            count: 0,
            body: PackageWriter::new(),
        }
    }

    /// Add a mesh filter referencing a mesh checksum.
    pub fn mesh(mut self, checksum: &str) -> Self {
        self.body.write_i32(COMPONENT_MESH_FILTER).write_string(checksum);
        self.count += 1;
        self
    }

    /// Add a mesh renderer referencing material checksums.
    pub fn materials<S: AsRef<str>>(mut self, checksums: &[S]) -> Self {
        self.body
            .write_i32(COMPONENT_MESH_RENDERER)
            .write_count(checksums.len());
        for checksum in checksums {
            self.body.write_string(checksum.as_ref());
        }
        self.count += 1;
        self
    }

    fn field(&mut self, kind: FieldKind) -> &mut PackageWriter {
        self.count += 1;
        self.body.write_i32(COMPONENT_FIELD).write_i32(kind.tag())
    }

    /// Add a building prop/tree placement. Empty names mean "none".
    pub fn building_prop(
        mut self,
        prop: &str,
        tree: &str,
        position: [f32; 3],
        angle: f32,
        probability: i32,
        fixed_height: bool,
    ) -> Self {
        self.field(FieldKind::BuildingProp)
            .write_string(prop)
            .write_string(tree)
            .write_vec3(position)
            .write_f32(angle)
            .write_i32(probability)
            .write_bool(fixed_height);
        self
    }

    /// Add a trailer by its item name within the same package.
    pub fn trailer(mut self, name: &str, probability: i32, invert_probability: i32) -> Self {
        self.field(FieldKind::VehicleTrailer)
            .write_string(name)
            .write_i32(probability)
            .write_i32(invert_probability);
        self
    }

    /// Add a primitive field.
    pub fn value(mut self, value: &FieldValue) -> Self {
        match value {
            FieldValue::Float(v) => {
                self.field(FieldKind::Float).write_f32(*v);
            }
            FieldValue::Int(v) => {
                self.field(FieldKind::Int).write_i32(*v);
            }
            FieldValue::Bool(v) => {
                self.field(FieldKind::Bool).write_bool(*v);
            }
            FieldValue::Text(v) => {
                self.field(FieldKind::Text).write_string(v);
            }
            FieldValue::Vec3(v) => {
                self.field(FieldKind::Vec3).write_vec3(*v);
            }
            FieldValue::BuildingProp(p) => {
                return self.building_prop(
                    p.prop.as_deref().unwrap_or(""),
                    p.tree.as_deref().unwrap_or(""),
                    p.position,
                    p.angle,
                    p.probability,
                    p.fixed_height,
                );
            }
            FieldValue::VehicleTrailer(t) => {
                return self.trailer(
                    t.info.as_deref().unwrap_or(""),
                    t.probability,
                    t.invert_probability,
                );
            }
        }
        self
    }

    pub fn build(mut self) -> Bytes {
        let body = self.body.finish();
        let mut w = PackageWriter::new();
        w.write_string(&self.name)
            .write_i32(self.kind.tag())
            .write_count(self.count);
        let mut out = w.finish().to_vec();
        out.extend_from_slice(&body);
        Bytes::from(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{payload_checksum, AssetType, Package};
    use crate::sharing::{MaterialPayload, SharingOptions};

    struct Fixture {
        pool: ContentPool,
        sharing: SharingCache,
        mesh: String,
        material: String,
    }

    fn fixture() -> Fixture {
        let mesh = Bytes::from_static(b"mesh");
        let material = MaterialPayload::new("m", "Shader").float("_Gloss", 1.0).build();
        let mesh_checksum = payload_checksum(&mesh);
        let material_checksum = payload_checksum(&material);
        let package = Package::builder("Res")
            .asset(PoolAsset::new("mesh", AssetType::Mesh, mesh))
            .asset(PoolAsset::new("mat", AssetType::Material, material))
            .build();
        Fixture {
            pool: ContentPool::from_packages([package]).unwrap(),
            sharing: SharingCache::new(SharingOptions::default()),
            mesh: mesh_checksum,
            material: material_checksum,
        }
    }

    fn decode_with(
        fx: &Fixture,
        payload: Bytes,
        resolver: &dyn FieldResolver,
    ) -> LoadResult<Prefab> {
        let mut object = PoolAsset::new("Thing_Data", AssetType::Object, payload);
        object.package = "MyPack".to_string();
        let hooks = DecodeHooks {
            package: "MyPack",
            referrer: "MyPack.Thing_Data",
            sharing: &fx.sharing,
            pool: &fx.pool,
            resolver,
        };
        PayloadDecoder.decode(&object, &hooks)
    }

    #[test]
    fn test_decode_components() {
        let fx = fixture();
        let payload = PrefabPayload::new("Thing_Data", PrefabKind::Prop)
            .mesh(&fx.mesh)
            .materials(&[fx.material.as_str(), fx.material.as_str()])
            .value(&FieldValue::Int(3))
            .value(&FieldValue::Text("hello".to_string()))
            .build();

        let prefab = decode_with(&fx, payload, &PrimitiveFieldResolver).unwrap();

        assert_eq!(prefab.name, "Thing_Data");
        assert_eq!(prefab.kind, PrefabKind::Prop);
        assert_eq!(prefab.meshes.len(), 1);
        assert_eq!(prefab.materials.len(), 2);
        assert_eq!(
            prefab.fields,
            vec![FieldValue::Int(3), FieldValue::Text("hello".to_string())]
        );

        let stats = fx.sharing.stats();
        assert_eq!(stats.materials.loads, 1);
        assert_eq!(stats.materials.hits, 1);
    }

    #[test]
    fn test_decode_missing_mesh() {
        let fx = fixture();
        let payload = PrefabPayload::new("Thing_Data", PrefabKind::Prop)
            .mesh("missing")
            .build();

        let err = decode_with(&fx, payload, &PrimitiveFieldResolver).unwrap_err();
        assert!(matches!(err, LoadError::MissingResource { .. }));
    }

    #[test]
    fn test_primitive_resolver_rejects_cross_refs() {
        let fx = fixture();
        let payload = PrefabPayload::new("Bus_Data", PrefabKind::Vehicle)
            .trailer("Trailer_Data", 100, 0)
            .build();

        let err = decode_with(&fx, payload, &PrimitiveFieldResolver).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedField("vehicle trailer")));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let fx = fixture();
        let full = PrefabPayload::new("Thing_Data", PrefabKind::Prop)
            .mesh(&fx.mesh)
            .build();
        let truncated = full.slice(..full.len() - 3);

        match decode_with(&fx, truncated, &PrimitiveFieldResolver).unwrap_err() {
            LoadError::Payload { asset, .. } => assert_eq!(asset, "MyPack.Thing_Data"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_component() {
        let fx = fixture();
        let mut w = PackageWriter::new();
        w.write_string("X").write_i32(1).write_count(1).write_i32(77);

        let err = decode_with(&fx, w.finish(), &PrimitiveFieldResolver).unwrap_err();
        assert!(err.to_string().contains("component"));
    }
}
