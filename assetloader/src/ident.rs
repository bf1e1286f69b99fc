//! Item identifier parsing and origin classification.
//!
//! This module is the single source of truth for how dotted item names are
//! taken apart:
//! - Package/item split (e.g., `1234567.Oak` → `1234567` + `Oak`)
//! - Origin classification (workshop, private, legacy)
//! - Display names (trailing `_Data` stripped)
//!
//! Dots may appear anywhere in package and item names, so the split on the
//! first dot is a best guess. Callers that filter by package accept the
//! resulting false positives.

use std::fmt;

/// Package ids at or below this value are never workshop ids.
pub const WORKSHOP_ID_THRESHOLD: u64 = 999_999;

/// Suffix the host appends to prefab object names.
const DATA_SUFFIX: &str = "_Data";

/// A `package.item` identifier.
///
/// The package part is `None` for legacy or built-in names that carry no
/// package prefix. A dot that is the first or last character does not
/// separate a package.
///
/// # Example
///
/// ```
/// use assetloader::ident::ItemId;
///
/// let id = ItemId::parse("MyPack.Lamp");
/// assert_eq!(id.package(), Some("MyPack"));
/// assert_eq!(id.item(), "Lamp");
///
/// let legacy = ItemId::parse("Lamp");
/// assert_eq!(legacy.package(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    full: String,
    split: Option<usize>,
}

impl ItemId {
    /// Parse a full name.
    pub fn parse(full: impl Into<String>) -> Self {
        let full = full.into();
        let split = package_split(&full).filter(|&j| j > 0);
        Self { full, split }
    }

    /// Build an identifier from its parts.
    pub fn new(package: &str, item: &str) -> Self {
        Self::parse(format!("{}.{}", package, item))
    }

    /// The full dotted name.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// The package part, if the name has an internal dot.
    pub fn package(&self) -> Option<&str> {
        self.split.map(|j| &self.full[..j])
    }

    /// The item part (the whole name for legacy identifiers).
    pub fn item(&self) -> &str {
        match self.split {
            Some(j) => &self.full[j + 1..],
            None => &self.full,
        }
    }

    /// Origin of this identifier.
    pub fn origin(&self) -> Origin {
        classify(&self.full)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Where an item comes from, judged from its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Published content; the package name is a numeric workshop id.
    Workshop(u64),
    /// Locally authored content (`Name.Name`).
    Private,
    /// No package prefix: an early naming scheme or built-in/DLC content.
    Legacy,
}

impl Origin {
    /// Check if this is workshop content.
    pub fn is_workshop(&self) -> bool {
        matches!(self, Origin::Workshop(_))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Workshop(id) => write!(f, "workshop {}", id),
            Origin::Private => write!(f, "private"),
            Origin::Legacy => write!(f, "legacy"),
        }
    }
}

/// Position of the dot separating package from item.
///
/// Returns `None` when there is no dot, or when the first dot is the last
/// character.
pub fn package_split(name: &str) -> Option<usize> {
    match name.find('.') {
        Some(j) if j + 1 < name.len() => Some(j),
        _ => None,
    }
}

/// Package part of a full name, if any.
///
/// A leading dot yields an empty package name; such names still count as
/// custom content.
pub fn package_of(name: &str) -> Option<&str> {
    package_split(name).map(|j| &name[..j])
}

/// Parse a package name as a workshop id.
///
/// # Examples
///
/// ```
/// use assetloader::ident::workshop_package_id;
///
/// assert_eq!(workshop_package_id("1234567"), Some(1234567));
/// assert_eq!(workshop_package_id("999999"), None);
/// assert_eq!(workshop_package_id("MyCity"), None);
/// ```
pub fn workshop_package_id(package_name: &str) -> Option<u64> {
    package_name
        .parse::<u64>()
        .ok()
        .filter(|id| *id > WORKSHOP_ID_THRESHOLD)
}

/// Workshop id of a full item name, if the package part is one.
///
/// A leading dot never counts as a package here.
pub fn workshop_id(full_name: &str) -> Option<u64> {
    match package_split(full_name) {
        Some(j) if j > 0 => workshop_package_id(&full_name[..j]),
        _ => None,
    }
}

/// Classify an identifier by origin.
///
/// # Examples
///
/// ```
/// use assetloader::ident::{classify, Origin};
///
/// assert_eq!(classify("1234567.Foo"), Origin::Workshop(1234567));
/// assert_eq!(classify("MyCity.House"), Origin::Private);
/// assert_eq!(classify("House"), Origin::Legacy);
/// ```
pub fn classify(full_name: &str) -> Origin {
    if let Some(id) = workshop_id(full_name) {
        Origin::Workshop(id)
    } else if full_name.contains('.') {
        Origin::Private
    } else {
        Origin::Legacy
    }
}

/// Strip the `_Data` suffix from a prefab object name for display.
///
/// # Examples
///
/// ```
/// use assetloader::ident::display_name;
///
/// assert_eq!(display_name("Oak_Data"), "Oak");
/// assert_eq!(display_name("_Data"), "_Data");
/// assert_eq!(display_name("Oak"), "Oak");
/// ```
pub fn display_name(name: &str) -> &str {
    if name.len() > DATA_SUFFIX.len() {
        name.strip_suffix(DATA_SUFFIX).unwrap_or(name)
    } else {
        name
    }
}

/// Short name shown on the progress channel for a full name.
///
/// The package prefix is removed and then the `_Data` suffix.
pub fn short_name(full_name: &str) -> &str {
    let item = match package_split(full_name) {
        Some(j) => &full_name[j + 1..],
        None => full_name,
    };
    display_name(item)
}
