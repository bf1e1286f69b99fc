//! Shared resource types.

use std::sync::Arc;

use bytes::Bytes;

use crate::codec::{CodecError, PackageReader, PackageWriter};
use crate::error::{LoadError, LoadResult};

/// A texture sub-resource.
///
/// Pixel data is kept opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub checksum: String,
    pub data: Bytes,
}

impl Texture {
    pub fn new(checksum: impl Into<String>, data: Bytes) -> Self {
        Self {
            checksum: checksum.into(),
            data,
        }
    }
}

/// A mesh sub-resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub checksum: String,
    pub data: Bytes,
}

impl Mesh {
    pub fn new(checksum: impl Into<String>, data: Bytes) -> Self {
        Self {
            checksum: checksum.into(),
            data,
        }
    }
}

/// One material property.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialProperty {
    Color { name: String, value: [f32; 4] },
    Vector { name: String, value: [f32; 4] },
    Float { name: String, value: f32 },
    /// A texture slot; `None` when the slot is explicitly empty.
    Texture {
        name: String,
        texture: Option<Arc<Texture>>,
    },
}

impl MaterialProperty {
    /// Property name.
    pub fn name(&self) -> &str {
        match self {
            MaterialProperty::Color { name, .. }
            | MaterialProperty::Vector { name, .. }
            | MaterialProperty::Float { name, .. }
            | MaterialProperty::Texture { name, .. } => name,
        }
    }
}

const PROP_COLOR: i32 = 0;
const PROP_VECTOR: i32 = 1;
const PROP_FLOAT: i32 = 2;
const PROP_TEXTURE: i32 = 3;

/// A material sub-resource.
///
/// Payload layout: `string` name, `string` shader, `i32` property count,
/// then per property an `i32` kind and its data. Kind 3 (texture) carries
/// the property name, an "is null" flag and, when not null, the texture
/// checksum.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub shader: String,
    pub properties: Vec<MaterialProperty>,
}

impl Material {
    /// Decode a material payload.
    ///
    /// Texture properties are resolved through `texture`, so composite
    /// materials share their textures with everything else in the session.
    pub fn decode<F>(asset: &str, payload: Bytes, mut texture: F) -> LoadResult<Self>
    where
        F: FnMut(&str) -> LoadResult<Arc<Texture>>,
    {
        let codec = |source: CodecError| LoadError::Payload {
            asset: asset.to_string(),
            source,
        };

        let mut r = PackageReader::new(payload);
        let name = r.read_string().map_err(codec)?;
        let shader = r.read_string().map_err(codec)?;
        let count = r.read_count("material property").map_err(codec)?;

        let mut properties = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let property = match r.read_i32().map_err(codec)? {
                PROP_COLOR => MaterialProperty::Color {
                    name: r.read_string().map_err(codec)?,
                    value: r.read_vec4().map_err(codec)?,
                },
                PROP_VECTOR => MaterialProperty::Vector {
                    name: r.read_string().map_err(codec)?,
                    value: r.read_vec4().map_err(codec)?,
                },
                PROP_FLOAT => MaterialProperty::Float {
                    name: r.read_string().map_err(codec)?,
                    value: r.read_f32().map_err(codec)?,
                },
                PROP_TEXTURE => {
                    let name = r.read_string().map_err(codec)?;
                    let texture = if r.read_bool().map_err(codec)? {
                        None
                    } else {
                        let checksum = r.read_string().map_err(codec)?;
                        Some(texture(&checksum)?)
                    };
                    MaterialProperty::Texture { name, texture }
                }
                tag => {
                    return Err(codec(CodecError::UnknownTag {
                        what: "material property",
                        tag,
                    }))
                }
            };
            properties.push(property);
        }

        Ok(Self {
            name,
            shader,
            properties,
        })
    }

    /// Textures referenced by this material.
    pub fn textures(&self) -> impl Iterator<Item = &Arc<Texture>> + '_ {
        self.properties.iter().filter_map(|p| match p {
            MaterialProperty::Texture {
                texture: Some(t), ..
            } => Some(t),
            _ => None,
        })
    }
}

/// Builder for material payloads.
///
/// # Example
///
/// ```
/// use assetloader::sharing::MaterialPayload;
///
/// let payload = MaterialPayload::new("Lamp", "Custom/Props/Prop/Default")
///     .color("_Color", [1.0, 1.0, 1.0, 1.0])
///     .texture("_MainTex", Some("abc"))
///     .build();
/// assert!(!payload.is_empty());
/// ```
#[derive(Debug)]
pub struct MaterialPayload {
    name: String,
    shader: String,
    count: usize,
    body: PackageWriter,
}

impl MaterialPayload {
    pub fn new(name: impl Into<String>, shader: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader: shader.into(),
            count: 0,
            body: PackageWriter::new(),
        }
    }

    pub fn color(mut self, name: &str, value: [f32; 4]) -> Self {
        self.body.write_i32(PROP_COLOR).write_string(name).write_vec4(value);
        self.count += 1;
        self
    }

    pub fn vector(mut self, name: &str, value: [f32; 4]) -> Self {
        self.body.write_i32(PROP_VECTOR).write_string(name).write_vec4(value);
        self.count += 1;
        self
    }

    pub fn float(mut self, name: &str, value: f32) -> Self {
        self.body.write_i32(PROP_FLOAT).write_string(name).write_f32(value);
        self.count += 1;
        self
    }

    /// Add a texture slot; `None` writes an empty slot.
    pub fn texture(mut self, name: &str, checksum: Option<&str>) -> Self {
        self.body.write_i32(PROP_TEXTURE).write_string(name);
        match checksum {
            Some(checksum) => {
                self.body.write_bool(false).write_string(checksum);
            }
            None => {
                self.body.write_bool(true);
            }
        }
        self.count += 1;
        self
    }

    pub fn build(mut self) -> Bytes {
        let body = self.body.finish();
        let mut w = PackageWriter::new();
        w.write_string(&self.name)
            .write_string(&self.shader)
            .write_count(self.count);
        let mut out = w.finish().to_vec();
        out.extend_from_slice(&body);
        Bytes::from(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_decode_all_kinds() {
        let payload = MaterialPayload::new("Lamp", "Shader")
            .color("_Color", [1.0, 0.5, 0.25, 1.0])
            .vector("_Wind", [0.0, 1.0, 0.0, 0.0])
            .float("_Gloss", 0.75)
            .texture("_MainTex", Some("tex1"))
            .texture("_ACIMap", None)
            .build();

        let mut requested = Vec::new();
        let material = Material::decode("MyPack.mat", payload, |checksum| {
            requested.push(checksum.to_string());
            Ok(Arc::new(Texture::new(checksum, Bytes::new())))
        })
        .unwrap();

        assert_eq!(material.name, "Lamp");
        assert_eq!(material.shader, "Shader");
        assert_eq!(material.properties.len(), 5);
        assert_eq!(requested, vec!["tex1"]);
        assert_eq!(material.textures().count(), 1);
        assert_eq!(material.properties[2].name(), "_Gloss");
        assert_eq!(
            material.properties[4],
            MaterialProperty::Texture {
                name: "_ACIMap".to_string(),
                texture: None
            }
        );
    }

    #[test]
    fn test_material_texture_error_propagates() {
        let payload = MaterialPayload::new("Lamp", "Shader")
            .texture("_MainTex", Some("missing"))
            .build();

        let err = Material::decode("MyPack.mat", payload, |checksum| {
            Err(LoadError::MissingResource {
                kind: crate::sharing::ResourceKind::Texture,
                checksum: checksum.to_string(),
            })
        })
        .unwrap_err();

        assert!(matches!(err, LoadError::MissingResource { .. }));
    }

    #[test]
    fn test_material_unknown_property_kind() {
        let mut w = PackageWriter::new();
        w.write_string("m").write_string("s").write_count(1).write_i32(9);

        let err = Material::decode("MyPack.mat", w.finish(), |_| unreachable!()).unwrap_err();
        match err {
            LoadError::Payload { asset, source } => {
                assert_eq!(asset, "MyPack.mat");
                assert_eq!(
                    source,
                    CodecError::UnknownTag {
                        what: "material property",
                        tag: 9
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
