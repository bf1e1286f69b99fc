//! Candidate metadata records.

use std::fmt;

use bytes::Bytes;

use crate::codec::{CodecError, CodecResult, PackageReader, PackageWriter};

/// Declared kind of a candidate item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Building,
    Prop,
    Tree,
    Vehicle,
    Trailer,
    Unknown,
}

impl ItemKind {
    fn tag(self) -> i32 {
        match self {
            ItemKind::Building => 0,
            ItemKind::Prop => 1,
            ItemKind::Tree => 2,
            ItemKind::Vehicle => 3,
            ItemKind::Trailer => 4,
            ItemKind::Unknown => 5,
        }
    }

    fn from_tag(tag: i32) -> CodecResult<Self> {
        match tag {
            0 => Ok(ItemKind::Building),
            1 => Ok(ItemKind::Prop),
            2 => Ok(ItemKind::Tree),
            3 => Ok(ItemKind::Vehicle),
            4 => Ok(ItemKind::Trailer),
            5 => Ok(ItemKind::Unknown),
            _ => Err(CodecError::UnknownTag {
                what: "item kind",
                tag,
            }),
        }
    }

    /// Kinds loaded by the first pass.
    pub fn is_first_pass(self) -> bool {
        matches!(self, ItemKind::Prop | ItemKind::Tree | ItemKind::Trailer)
    }

    /// Kinds loaded by the second pass.
    pub fn is_second_pass(self) -> bool {
        matches!(
            self,
            ItemKind::Building | ItemKind::Vehicle | ItemKind::Unknown
        )
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Building => "building",
            ItemKind::Prop => "prop",
            ItemKind::Tree => "tree",
            ItemKind::Vehicle => "vehicle",
            ItemKind::Trailer => "trailer",
            ItemKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Bitmask of DLC packs.
///
/// Used both for what an item requires and for what the player owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DlcMask(pub u32);

impl DlcMask {
    /// No DLC.
    pub const NONE: DlcMask = DlcMask(0);

    /// Every DLC.
    pub const ALL: DlcMask = DlcMask(u32::MAX);

    /// Check if every pack required by `self` is present in `owned`.
    ///
    /// # Example
    ///
    /// ```
    /// use assetloader::pool::DlcMask;
    ///
    /// assert!(DlcMask(0b01).is_owned_by(DlcMask(0b11)));
    /// assert!(!DlcMask(0b10).is_owned_by(DlcMask(0b01)));
    /// assert!(DlcMask::NONE.is_owned_by(DlcMask::NONE));
    /// ```
    pub fn is_owned_by(self, owned: DlcMask) -> bool {
        self.0 & !owned.0 == 0
    }
}

/// Decoded `CustomAssetMetaData` record.
///
/// Payload layout: `i32` kind, `u32` DLC mask, `string` object asset name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMetadata {
    /// Declared item kind.
    pub kind: ItemKind,

    /// DLC packs required by the item.
    pub dlc: DlcMask,

    /// Name of the object asset, in the same package, holding the prefab.
    pub asset_ref: String,
}

impl AssetMetadata {
    /// Create a metadata record.
    pub fn new(kind: ItemKind, asset_ref: impl Into<String>) -> Self {
        Self {
            kind,
            dlc: DlcMask::NONE,
            asset_ref: asset_ref.into(),
        }
    }

    /// Set the required DLC mask.
    pub fn with_dlc(mut self, dlc: DlcMask) -> Self {
        self.dlc = dlc;
        self
    }

    /// Decode a metadata payload.
    pub fn decode(payload: Bytes) -> CodecResult<Self> {
        let mut r = PackageReader::new(payload);
        let kind = ItemKind::from_tag(r.read_i32()?)?;
        let dlc = DlcMask(r.read_u32()?);
        let asset_ref = r.read_string()?;
        Ok(Self {
            kind,
            dlc,
            asset_ref,
        })
    }

    /// Encode into a metadata payload.
    pub fn encode(&self) -> Bytes {
        let mut w = PackageWriter::new();
        w.write_i32(self.kind.tag())
            .write_u32(self.dlc.0)
            .write_string(&self.asset_ref);
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_decode() {
        let meta = AssetMetadata::new(ItemKind::Trailer, "Trailer_Data").with_dlc(DlcMask(4));
        let decoded = AssetMetadata::decode(meta.encode()).unwrap();

        assert_eq!(decoded.kind, ItemKind::Trailer);
        assert_eq!(decoded.dlc, DlcMask(4));
        assert_eq!(decoded.asset_ref, "Trailer_Data");
    }

    #[test]
    fn test_metadata_unknown_kind() {
        let mut w = PackageWriter::new();
        w.write_i32(42).write_u32(0).write_string("x");
        assert_eq!(
            AssetMetadata::decode(w.finish()),
            Err(CodecError::UnknownTag {
                what: "item kind",
                tag: 42
            })
        );
    }

    #[test]
    fn test_metadata_truncated() {
        assert!(AssetMetadata::decode(Bytes::from_static(&[0, 0])).is_err());
    }

    #[test]
    fn test_pass_membership() {
        assert!(ItemKind::Prop.is_first_pass());
        assert!(ItemKind::Tree.is_first_pass());
        assert!(ItemKind::Trailer.is_first_pass());
        assert!(!ItemKind::Vehicle.is_first_pass());

        assert!(ItemKind::Building.is_second_pass());
        assert!(ItemKind::Vehicle.is_second_pass());
        assert!(ItemKind::Unknown.is_second_pass());
        assert!(!ItemKind::Trailer.is_second_pass());
    }

    #[test]
    fn test_dlc_ownership() {
        let owned = DlcMask(0b0101);
        assert!(DlcMask(0b0001).is_owned_by(owned));
        assert!(DlcMask(0b0101).is_owned_by(owned));
        assert!(!DlcMask(0b0010).is_owned_by(owned));
        assert!(DlcMask(0b1111).is_owned_by(DlcMask::ALL));
    }
}
