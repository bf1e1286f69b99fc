//! Materialized prefabs.
//!
//! A prefab is what an object asset becomes once decoded: a named, typed
//! item with its shared meshes and materials, and any placements or trailers
//! that reference other prefabs.
//!
//! # Overview
//!
//! - **Prefab**: the decoded item ([`PrefabKind`] building, prop, tree or vehicle)
//! - **PrefabRegistry**: loaded prefabs by kind and name ("find loaded")
//! - **AssetDecoder**: the host deserializer seam, with [`PayloadDecoder`]
//!   as the stock implementation
//! - **FieldResolver**: per-field decode strategy passed in [`DecodeHooks`]
//!
//! # Decode flow
//!
//! ```text
//! PoolAsset (Object)
//!     │
//!     ▼
//! AssetDecoder::decode(object, hooks)
//!     ├── mesh filter    ──► SharingCache::mesh(checksum)
//!     ├── mesh renderer  ──► SharingCache::material(checksum) ──► textures
//!     └── field          ──► FieldResolver::resolve(kind, reader)
//!                                  └── cross references may load other prefabs
//!     │
//!     ▼
//! Prefab ──► PrefabRegistry::register
//! ```

mod decoder;
mod model;
mod registry;

pub use decoder::{
    AssetDecoder, DecodeHooks, FieldContext, FieldResolver, PayloadDecoder, PrefabPayload,
    PrimitiveFieldResolver,
};
pub use model::{BuildingProp, FieldKind, FieldValue, Prefab, PrefabKind, VehicleTrailer};
pub use registry::{PrefabCounts, PrefabRegistry};
