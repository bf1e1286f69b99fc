//! Usage index.
//!
//! Determines which custom items a saved world actually references, so the
//! loader can skip the rest of the pool.
//!
//! # Overview
//!
//! - **WorldSnapshot**: read access to the decoded world (placed buildings
//!   and prop/tree/vehicle prefab names)
//! - **SnapshotGate**: one-shot handoff of the snapshot from the decode thread
//! - **UsageSets**: fine sets of full names plus coarse package sets
//! - **UsageIndex**: builds the sets and reports used items that never loaded
//! - **CrossRefResolver**: loads items referenced from inside other items
//!
//! # Package filter
//!
//! The package sets let the loader reject most candidates before decoding
//! their metadata. The split on the first dot is ambiguous when names
//! contain dots, so the filter accepts every dotted package name. It may
//! return false positives, never false negatives.
//!
//! ```text
//! "77777777.Tree1"  ──►  trees {"77777777.Tree1"}   tree packages {"77777777"}
//! "pac.kage.asset"  ──►  props {"pac.kage.asset"}   prop packages {"pac"}
//! "Lamp"            ──►  (ignored: built-in or legacy)
//! ```

mod index;
mod resolver;
mod sets;
mod snapshot;

pub use index::UsageIndex;
pub use resolver::CrossRefResolver;
pub use sets::UsageSets;
pub use snapshot::{PlacedBuilding, SimulationSnapshot, SnapshotGate, WorldSnapshot};
