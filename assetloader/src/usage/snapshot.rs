//! World snapshot and the one-shot publish gate.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A building instance in the saved world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBuilding {
    pub name: String,
    /// Instance flags; zero marks a free slot.
    #[serde(default)]
    pub flags: u32,
}

impl PlacedBuilding {
    pub fn new(name: impl Into<String>, flags: u32) -> Self {
        Self {
            name: name.into(),
            flags,
        }
    }

    /// Check if this slot holds a live building.
    pub fn is_live(&self) -> bool {
        self.flags != 0
    }
}

/// Read access to the decoded saved world.
pub trait WorldSnapshot: Send + Sync {
    /// Building instances, including free slots.
    fn buildings(&self) -> &[PlacedBuilding];

    /// Prop prefab names referenced by the world.
    fn props(&self) -> &[String];

    /// Tree prefab names referenced by the world.
    fn trees(&self) -> &[String];

    /// Vehicle prefab names referenced by the world.
    fn vehicles(&self) -> &[String];
}

/// Plain snapshot, as produced by the simulation's metadata decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    #[serde(default)]
    pub buildings: Vec<PlacedBuilding>,
    #[serde(default)]
    pub props: Vec<String>,
    #[serde(default)]
    pub trees: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
}

impl WorldSnapshot for SimulationSnapshot {
    fn buildings(&self) -> &[PlacedBuilding] {
        &self.buildings
    }

    fn props(&self) -> &[String] {
        &self.props
    }

    fn trees(&self) -> &[String] {
        &self.trees
    }

    fn vehicles(&self) -> &[String] {
        &self.vehicles
    }
}

/// One-shot handoff of the world snapshot from the decode thread.
///
/// The host's background decoder calls [`SnapshotGate::publish`] once the
/// world metadata is decoded. The load task polls [`SnapshotGate::try_take`]
/// and yields until the snapshot is there.
#[derive(Default)]
pub struct SnapshotGate {
    slot: Mutex<Option<Arc<dyn WorldSnapshot>>>,
    published: Mutex<bool>,
}

impl std::fmt::Debug for SnapshotGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotGate")
            .field("published", &self.is_published())
            .finish()
    }
}

impl SnapshotGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the snapshot.
    ///
    /// Returns `false` if a snapshot was already published; the first one
    /// wins.
    pub fn publish(&self, snapshot: Arc<dyn WorldSnapshot>) -> bool {
        let mut published = self.published.lock();
        if *published {
            return false;
        }
        *published = true;
        *self.slot.lock() = Some(snapshot);
        true
    }

    /// Take the snapshot if it has been published and not yet taken.
    pub fn try_take(&self) -> Option<Arc<dyn WorldSnapshot>> {
        self.slot.lock().take()
    }

    /// Check if a snapshot has been published.
    pub fn is_published(&self) -> bool {
        *self.published.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_is_one_shot() {
        let gate = SnapshotGate::new();
        assert!(gate.try_take().is_none());
        assert!(!gate.is_published());

        assert!(gate.publish(Arc::new(SimulationSnapshot::default())));
        assert!(!gate.publish(Arc::new(SimulationSnapshot::default())));
        assert!(gate.is_published());

        assert!(gate.try_take().is_some());
        assert!(gate.try_take().is_none());
    }

    #[test]
    fn test_gate_across_threads() {
        let gate = Arc::new(SnapshotGate::new());
        let publisher = Arc::clone(&gate);

        std::thread::spawn(move || {
            let snapshot = SimulationSnapshot {
                trees: vec!["77777777.Tree1".to_string()],
                ..Default::default()
            };
            publisher.publish(Arc::new(snapshot));
        })
        .join()
        .unwrap();

        let snapshot = gate.try_take().unwrap();
        assert_eq!(snapshot.trees(), ["77777777.Tree1".to_string()]);
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let json = r#"{ "buildings": [ { "name": "B.house", "flags": 1 }, { "name": "B.ruin" } ] }"#;
        let snapshot: SimulationSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.buildings.len(), 2);
        assert!(snapshot.buildings[0].is_live());
        assert!(!snapshot.buildings[1].is_live());
        assert!(snapshot.props.is_empty());
    }
}
