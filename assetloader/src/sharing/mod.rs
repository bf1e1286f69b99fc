//! Checksum-keyed sharing of sub-resources.
//!
//! Many packages embed byte-identical meshes, textures and materials. The
//! pool indexes every sub-resource by the checksum of its payload, and the
//! prefab decoder asks this module for each checksum it meets. The first
//! request loads the resource; every later request for the same checksum gets
//! the same `Arc` handle back.
//!
//! # Overview
//!
//! - **ChecksumTable**: one table per resource kind, with hit/load counters
//! - **SharingCache**: the three tables plus the per-kind sharing toggles
//! - **Texture / Material / Mesh**: the decoded resource types
//!
//! # Concurrency
//!
//! Each table has a short-lived lock around its slot map and a per-checksum
//! slot lock held while one checksum loads. Concurrent requests for the same
//! checksum wait on the slot and then hit; requests for different checksums
//! load in parallel. A failed load leaves no entry behind.
//!
//! # Example
//!
//! ```
//! use assetloader::sharing::{Mesh, SharingCache, SharingOptions};
//! use bytes::Bytes;
//!
//! let cache = SharingCache::new(SharingOptions::default());
//! let load = || Ok::<_, std::convert::Infallible>(Mesh::new("abc", Bytes::new()));
//!
//! let first = cache.get_or_load::<Mesh, _>("abc", load).unwrap();
//! let second = cache.get_or_load::<Mesh, _>("abc", load).unwrap();
//!
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! assert_eq!(cache.stats().meshes.hits, 1);
//! ```

mod cache;
mod resource;
mod table;

use std::fmt;

pub use cache::{KindStats, SharedResource, SharingCache, SharingStats};
pub use resource::{Material, MaterialPayload, MaterialProperty, Mesh, Texture};
pub use table::ChecksumTable;

/// Kind of shared sub-resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    Material,
    Mesh,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Texture => write!(f, "texture"),
            ResourceKind::Material => write!(f, "material"),
            ResourceKind::Mesh => write!(f, "mesh"),
        }
    }
}

/// Per-kind sharing toggles.
///
/// A disabled kind is loaded on every request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharingOptions {
    pub textures: bool,
    pub materials: bool,
    pub meshes: bool,
}

impl Default for SharingOptions {
    fn default() -> Self {
        Self {
            textures: true,
            materials: true,
            meshes: true,
        }
    }
}

impl SharingOptions {
    /// Check if a kind is shared.
    pub fn shares(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Texture => self.textures,
            ResourceKind::Material => self.materials,
            ResourceKind::Mesh => self.meshes,
        }
    }
}
