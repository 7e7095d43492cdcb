use std::fmt;

use once_cell::sync::OnceCell;

use crate::{
    constants::{Degree, EntityId, Meter, Second},
    geodesy::haversine_distance,
    samples::TrajectorySample,
};

/// A confirmed co-location between one sample of each of two entities.
///
/// The midpoint attributes (`lat`, `lon`, `alt`, `t`) are arithmetic means of the two samples.
/// The haversine distance is computed at most once per event and cached; events built by the
/// exhaustive scan already carry the distance computed for the inclusion test.
#[derive(Debug, Clone)]
pub struct ContactEvent {
    entity_a: EntityId,
    entity_b: EntityId,
    a: TrajectorySample,
    b: TrajectorySample,
    segments: (usize, usize),
    distance: OnceCell<Meter>,
}

impl ContactEvent {
    /// Build an event; the distance is computed on first access.
    pub fn new(
        entity_a: impl Into<EntityId>,
        a: TrajectorySample,
        entity_b: impl Into<EntityId>,
        b: TrajectorySample,
    ) -> Self {
        ContactEvent {
            entity_a: entity_a.into(),
            entity_b: entity_b.into(),
            a,
            b,
            segments: (0, 0),
            distance: OnceCell::new(),
        }
    }

    pub(crate) fn with_distance(mut self, distance: Meter) -> Self {
        self.distance = OnceCell::with_value(distance);
        self
    }

    pub(crate) fn with_segments(mut self, segment_a: usize, segment_b: usize) -> Self {
        self.segments = (segment_a, segment_b);
        self
    }

    pub fn entity_a(&self) -> &str {
        &self.entity_a
    }

    pub fn entity_b(&self) -> &str {
        &self.entity_b
    }

    pub fn sample_a(&self) -> &TrajectorySample {
        &self.a
    }

    pub fn sample_b(&self) -> &TrajectorySample {
        &self.b
    }

    /// Indices of the source segments of `sample_a` and `sample_b` in their trajectories.
    pub fn segments(&self) -> (usize, usize) {
        self.segments
    }

    pub fn lat(&self) -> Degree {
        (self.a.lat + self.b.lat) / 2.0
    }

    pub fn lon(&self) -> Degree {
        (self.a.lon + self.b.lon) / 2.0
    }

    pub fn alt(&self) -> f64 {
        (self.a.alt + self.b.alt) / 2.0
    }

    pub fn t(&self) -> Second {
        (self.a.t + self.b.t) / 2.0
    }

    /// Haversine distance between the two samples, in meters (cached).
    pub fn distance(&self) -> Meter {
        *self
            .distance
            .get_or_init(|| haversine_distance(self.a.lat, self.a.lon, self.b.lat, self.b.lon))
    }

    /// Absolute time difference between the two samples, in seconds.
    pub fn time_delta(&self) -> Second {
        (self.a.t - self.b.t).abs()
    }
}

impl PartialEq for ContactEvent {
    fn eq(&self, other: &Self) -> bool {
        self.entity_a == other.entity_a
            && self.entity_b == other.entity_b
            && self.a == other.a
            && self.b == other.b
            && self.segments == other.segments
    }
}

impl fmt::Display for ContactEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[entity_a: {}  entity_b: {}  dist: {:.3}  tdelta: {}  avg_time: {}  avg_lat: {}  avg_lon: {}  avg_alt: {}]",
            self.entity_a,
            self.entity_b,
            self.distance(),
            self.time_delta(),
            self.t(),
            self.lat(),
            self.lon(),
            self.alt()
        )
    }
}
