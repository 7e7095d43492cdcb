//! # Trajectories: storage and ingestion interface
//!
//! The [`TrajectoryStore`] is the explicit, per-run cache of every loaded trajectory. It is
//! constructed once (from memory or from a Geolife dataset directory), then passed by
//! reference to the tile index and to the contact detector. Nothing in the crate keeps a
//! module-level copy of the data.
//!
//! Modules
//! -----------------
//! * [`geolife_reader`](crate::trajectories::geolife_reader) – PLT file reader and dataset walker.
//!
//! Data Model
//! -----------------
//! * **Key:** [`EntityId`] (e.g. `"000"`).
//! * **Value:** [`Trajectory`] = ordered [`Segment`](crate::samples::Segment)s of
//!   [`TrajectorySample`](crate::samples::TrajectorySample)s.
//! * **Set:** `HashMap<EntityId, Trajectory, ahash::RandomState>`. Iteration order of the map is
//!   unspecified; [`SampleSource::entities`] always returns ids **sorted** so that every
//!   downstream pass is deterministic.
//!
//! Ingestion interface
//! -----------------
//! Components only depend on the [`SampleSource`] trait, so any other ingestion collaborator can
//! feed the engine by implementing it.
//!
//! See also
//! ------------
//! * [`TileIndex::build`](crate::tiles::TileIndex::build) – consumes a [`SampleSource`].
//! * [`PairwiseContacts`](crate::contacts::PairwiseContacts) – exhaustive scan over two trajectories.
use std::collections::HashMap;

use ahash::RandomState;

use crate::{
    constants::EntityId,
    samples::{Segment, Trajectory},
};

pub mod geolife_reader;

/// Read access to per-entity trajectories.
pub trait SampleSource {
    /// Every entity id, sorted ascending.
    fn entities(&self) -> Vec<&str>;

    /// The trajectory of `entity`, if known.
    fn trajectory(&self, entity: &str) -> Option<&Trajectory>;
}

/// Per-run cache of loaded trajectories, keyed by entity id.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryStore {
    trajectories: HashMap<EntityId, Trajectory, RandomState>,
}

impl TrajectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-assembled trajectories.
    ///
    /// Trajectories sharing an entity id are concatenated, segments kept in input order.
    pub fn from_trajectories(trajectories: impl IntoIterator<Item = Trajectory>) -> Self {
        let mut store = TrajectoryStore::new();
        for traj in trajectories {
            let entity = traj.entity().to_string();
            for seg in traj.segments() {
                store.insert_segment(&entity, seg.clone());
            }
            store
                .trajectories
                .entry(entity.clone())
                .or_insert_with(|| Trajectory::new(entity));
        }
        store
    }

    /// Append a segment to the trajectory of `entity`, creating the trajectory if needed.
    pub fn insert_segment(&mut self, entity: &str, segment: Segment) {
        self.trajectories
            .entry(entity.to_string())
            .or_insert_with(|| Trajectory::new(entity))
            .push_segment(segment);
    }

    pub fn number_of_entities(&self) -> usize {
        self.trajectories.len()
    }

    pub fn total_samples(&self) -> usize {
        self.trajectories.values().map(Trajectory::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }
}

impl SampleSource for TrajectoryStore {
    fn entities(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.trajectories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    fn trajectory(&self, entity: &str) -> Option<&Trajectory> {
        self.trajectories.get(entity)
    }
}

#[cfg(test)]
mod trajectories_test {
    use super::*;
    use crate::samples::TrajectorySample;

    fn segment(label: &str, n: usize) -> Segment {
        Segment::new(
            label,
            (0..n)
                .map(|i| TrajectorySample::new(39.9, 116.4, 0.0, i as f64))
                .collect(),
        )
    }

    #[test]
    fn test_entities_sorted() {
        let mut store = TrajectoryStore::new();
        store.insert_segment("010", segment("a", 1));
        store.insert_segment("000", segment("a", 2));
        store.insert_segment("005", segment("a", 3));
        assert_eq!(store.entities(), vec!["000", "005", "010"]);
        assert_eq!(store.number_of_entities(), 3);
        assert_eq!(store.total_samples(), 6);
    }

    #[test]
    fn test_insert_appends_segments() {
        let mut store = TrajectoryStore::new();
        store.insert_segment("000", segment("a", 2));
        store.insert_segment("000", segment("b", 3));
        let traj = store.trajectory("000").unwrap();
        assert_eq!(traj.segments().len(), 2);
        assert_eq!(traj.segments()[1].label(), "b");
        assert_eq!(traj.len(), 5);
        assert!(store.trajectory("999").is_none());
    }

    #[test]
    fn test_from_trajectories_keeps_empty() {
        let store = TrajectoryStore::from_trajectories(vec![
            Trajectory::new("001"),
            Trajectory::with_segments("000", vec![segment("x", 4)]),
        ]);
        assert_eq!(store.entities(), vec!["000", "001"]);
        assert!(store.trajectory("001").unwrap().is_empty());
    }
}
