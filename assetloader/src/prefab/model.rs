//! Decoded prefab model.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::codec::{CodecError, CodecResult};
use crate::sharing::{Material, Mesh};

/// Kind of a materialized prefab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefabKind {
    Building,
    Prop,
    Tree,
    Vehicle,
}

impl PrefabKind {
    /// Every kind, in report order.
    pub const ALL: [PrefabKind; 4] = [
        PrefabKind::Building,
        PrefabKind::Prop,
        PrefabKind::Tree,
        PrefabKind::Vehicle,
    ];

    pub(crate) fn tag(self) -> i32 {
        match self {
            PrefabKind::Building => 0,
            PrefabKind::Prop => 1,
            PrefabKind::Tree => 2,
            PrefabKind::Vehicle => 3,
        }
    }

    pub(crate) fn from_tag(tag: i32) -> CodecResult<Self> {
        match tag {
            0 => Ok(PrefabKind::Building),
            1 => Ok(PrefabKind::Prop),
            2 => Ok(PrefabKind::Tree),
            3 => Ok(PrefabKind::Vehicle),
            _ => Err(CodecError::UnknownTag {
                what: "prefab kind",
                tag,
            }),
        }
    }
}

impl fmt::Display for PrefabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrefabKind::Building => "building",
            PrefabKind::Prop => "prop",
            PrefabKind::Tree => "tree",
            PrefabKind::Vehicle => "vehicle",
        };
        f.write_str(name)
    }
}

/// A prop or tree placed inside a building.
///
/// `prop` and `tree` hold the resolved prefab names, or `None` when the
/// reference was empty or could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingProp {
    pub prop: Option<String>,
    pub tree: Option<String>,
    pub position: [f32; 3],
    pub angle: f32,
    pub probability: i32,
    pub fixed_height: bool,
}

/// A trailer attached to a vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleTrailer {
    /// Resolved trailer prefab name.
    pub info: Option<String>,
    pub probability: i32,
    pub invert_probability: i32,
}

/// Type tag of a serialized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Building prop/tree placement; cross-references other prefabs.
    BuildingProp,
    /// Vehicle trailer; cross-references a vehicle in the same package.
    VehicleTrailer,
    Float,
    Int,
    Bool,
    Text,
    Vec3,
}

impl FieldKind {
    pub(crate) fn tag(self) -> i32 {
        match self {
            FieldKind::BuildingProp => 0,
            FieldKind::VehicleTrailer => 1,
            FieldKind::Float => 2,
            FieldKind::Int => 3,
            FieldKind::Bool => 4,
            FieldKind::Text => 5,
            FieldKind::Vec3 => 6,
        }
    }

    pub(crate) fn from_tag(tag: i32) -> CodecResult<Self> {
        match tag {
            0 => Ok(FieldKind::BuildingProp),
            1 => Ok(FieldKind::VehicleTrailer),
            2 => Ok(FieldKind::Float),
            3 => Ok(FieldKind::Int),
            4 => Ok(FieldKind::Bool),
            5 => Ok(FieldKind::Text),
            6 => Ok(FieldKind::Vec3),
            _ => Err(CodecError::UnknownTag {
                what: "field kind",
                tag,
            }),
        }
    }

    /// Static name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::BuildingProp => "building prop",
            FieldKind::VehicleTrailer => "vehicle trailer",
            FieldKind::Float => "float",
            FieldKind::Int => "int",
            FieldKind::Bool => "bool",
            FieldKind::Text => "text",
            FieldKind::Vec3 => "vec3",
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    BuildingProp(BuildingProp),
    VehicleTrailer(VehicleTrailer),
    Float(f32),
    Int(i32),
    Bool(bool),
    Text(String),
    Vec3([f32; 3]),
}

/// A materialized item.
#[derive(Debug, Clone)]
pub struct Prefab {
    /// `package.name`; the key used by the prefab registry.
    pub name: String,
    pub kind: PrefabKind,
    /// Set for everything loaded from the content pool.
    pub is_custom_content: bool,
    /// Buildings loaded only because a style lists them are not spawned by
    /// normal growth.
    pub dont_spawn_normally: bool,
    pub meshes: Vec<Arc<Mesh>>,
    pub materials: Vec<Arc<Material>>,
    pub props: Vec<BuildingProp>,
    pub trailers: Vec<VehicleTrailer>,
    /// Primitive fields in payload order.
    pub fields: Vec<FieldValue>,
}

impl Prefab {
    /// Create an empty prefab.
    pub fn new(name: impl Into<String>, kind: PrefabKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_custom_content: false,
            dont_spawn_normally: false,
            meshes: Vec::new(),
            materials: Vec::new(),
            props: Vec::new(),
            trailers: Vec::new(),
            fields: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefab_kind_tags() {
        for kind in PrefabKind::ALL {
            assert_eq!(PrefabKind::from_tag(kind.tag()), Ok(kind));
        }
        assert!(PrefabKind::from_tag(4).is_err());
    }

    #[test]
    fn test_field_kind_unknown_tag() {
        assert_eq!(
            FieldKind::from_tag(-1),
            Err(CodecError::UnknownTag {
                what: "field kind",
                tag: -1
            })
        );
    }

    #[test]
    fn test_new_prefab_defaults() {
        let prefab = Prefab::new("MyPack.Lamp_Data", PrefabKind::Prop);
        assert!(!prefab.is_custom_content);
        assert!(!prefab.dont_spawn_normally);
        assert!(prefab.props.is_empty());
        assert_eq!(prefab.kind.to_string(), "prop");
    }
}
