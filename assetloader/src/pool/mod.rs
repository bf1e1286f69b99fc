//! Content pool model.
//!
//! The content pool is the host's package store: every optional package the
//! player has installed, each owning one or more assets. The loader only
//! reads it.
//!
//! # Overview
//!
//! - **Package**: a named bundle with a main asset and an optional workshop id
//! - **PoolAsset**: one payload inside a package, typed by [`AssetType`]
//! - **AssetMetadata**: the decoded candidate record (declared kind, DLC mask,
//!   object reference) carried by `CustomAssetMetaData` assets
//! - **ContentPool**: the indexed collection with the lookups the loader needs
//!
//! # Type Hierarchy
//!
//! ```text
//! ContentPool
//! ├── Package "MyPack" (main: "Lamp")
//! │   ├── PoolAsset "Lamp"        CustomAssetMetaData ──► asset_ref "Lamp_Data"
//! │   ├── PoolAsset "Lamp_Data"   Object (prefab payload)
//! │   └── PoolAsset "lamp_mesh"   Mesh (addressed by checksum)
//! └── Package "1234567" (workshop id 1234567)
//!     └── ...
//! ```

mod asset;
mod metadata;
mod package;
mod store;

pub use asset::{payload_checksum, AssetType, PoolAsset};
pub use metadata::{AssetMetadata, DlcMask, ItemKind};
pub use package::{Package, PackageBuilder};
pub use store::{ContentPool, PoolError};
