//! Pool asset type.

use std::fmt;

use bytes::Bytes;
use sha2::{Digest, Sha256};

/// Kind of payload an asset carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    /// Candidate metadata record.
    CustomAssetMetaData,
    /// Style grouping metadata record.
    DistrictStyleMetaData,
    /// Prefab payload.
    Object,
    /// Texture sub-resource.
    Texture,
    /// Material sub-resource.
    Material,
    /// Mesh sub-resource.
    Mesh,
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetType::CustomAssetMetaData => "custom asset metadata",
            AssetType::DistrictStyleMetaData => "style metadata",
            AssetType::Object => "object",
            AssetType::Texture => "texture",
            AssetType::Material => "material",
            AssetType::Mesh => "mesh",
        };
        f.write_str(name)
    }
}

/// Lowercase hexadecimal SHA-256 of a payload.
pub fn payload_checksum(payload: &[u8]) -> String {
    format!("{:x}", Sha256::digest(payload))
}

/// One asset inside a package.
///
/// The checksum is computed from the payload when the asset is created, so
/// structurally identical sub-resources in different packages share it.
#[derive(Debug, Clone)]
pub struct PoolAsset {
    /// Asset name, unique within its package.
    pub name: String,

    /// Owning package name.
    pub package: String,

    /// Payload type.
    pub asset_type: AssetType,

    /// Raw enabled flag as reported by the package store.
    ///
    /// For secondary assets this is unreliable; see
    /// [`super::ContentPool::effective_enabled`].
    pub enabled: bool,

    /// Whether this is the package's main asset. Set by the package builder.
    pub is_main: bool,

    checksum: String,
    payload: Bytes,
}

impl PoolAsset {
    /// Create an enabled asset.
    pub fn new(name: impl Into<String>, asset_type: AssetType, payload: Bytes) -> Self {
        let checksum = payload_checksum(&payload);
        Self {
            name: name.into(),
            package: String::new(),
            asset_type,
            enabled: true,
            is_main: false,
            checksum,
            payload,
        }
    }

    /// Set the raw enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// `package.name`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }

    /// Content checksum of the payload.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Shared payload bytes.
    pub fn payload(&self) -> Bytes {
        self.payload.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_sha256_hex() {
        let checksum = payload_checksum(b"");
        assert_eq!(
            checksum,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_identical_payloads_share_checksum() {
        let a = PoolAsset::new("a", AssetType::Mesh, Bytes::from_static(b"verts"));
        let b = PoolAsset::new("b", AssetType::Mesh, Bytes::from_static(b"verts"));
        let c = PoolAsset::new("c", AssetType::Mesh, Bytes::from_static(b"other"));

        assert_eq!(a.checksum(), b.checksum());
        assert_ne!(a.checksum(), c.checksum());
    }

    #[test]
    fn test_new_asset_defaults() {
        let asset = PoolAsset::new("Lamp", AssetType::Object, Bytes::new());
        assert!(asset.enabled);
        assert!(!asset.is_main);
        assert!(!asset.with_enabled(false).enabled);
    }

    #[test]
    fn test_asset_type_display() {
        assert_eq!(AssetType::Mesh.to_string(), "mesh");
        assert_eq!(AssetType::Object.to_string(), "object");
    }
}
