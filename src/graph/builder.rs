//! # Contact graph builder
//!
//! [`ContactGraphBuilder`] folds contacts into a [`ContactGraph`] according to a
//! [`WeightingPolicy`]. It holds nothing but the policy: all history lives in the edge
//! attributes of the graph it is given.
//!
//! ## Update rules
//! -----------------
//! For a contact between entities `a` and `b`, at `distance` meters and `time_delta` seconds:
//!
//! **count_weight**
//! * no edge: create it with `weight = 1`, `distance`, `time_delta`;
//! * edge present: `weight += 1`, and `distance` / `time_delta` are **overwritten** with this
//!   contact's values (they describe the last contact seen, not the closest).
//!
//! **distance_weight**, with `w = dt − distance` (`dt` is the temporal threshold of the run):
//! * no edge: create it with `weight = w`;
//! * edge present: replace the whole edge only if `stored.weight > w`, i.e. the edge keeps the
//!   **smallest** weight seen. `w` may be negative; it is stored as is.
//!
//! Applying the same contact twice therefore leaves a distance-weighted edge unchanged, but
//! increments a count-weighted one.
use crate::{
    colocate_errors::ColocateError,
    constants::{Meter, Second},
    contacts::ContactEvent,
    graph::{ContactGraph, EdgeAttrs, WeightingPolicy},
    tiles::TileMember,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactGraphBuilder {
    policy: WeightingPolicy,
}

impl ContactGraphBuilder {
    /// Builder for the policy named `policy`.
    ///
    /// Return
    /// ----------
    /// * [`ColocateError::InvalidConfiguration`] for anything but `"count_weight"`,
    ///   `"distance_weight"` or `"dist_weight"`.
    pub fn new(policy: &str) -> Result<Self, ColocateError> {
        Ok(Self::with_policy(policy.parse()?))
    }

    pub fn with_policy(policy: WeightingPolicy) -> Self {
        ContactGraphBuilder { policy }
    }

    pub fn policy(&self) -> WeightingPolicy {
        self.policy
    }

    /// Switch to another policy.
    pub fn apply_weighting_policy(mut self, policy: WeightingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fold the contact between two tile members into `graph`.
    ///
    /// The distance is the haversine distance between the members; under distance weighting,
    /// `dt` is taken from `a`.
    pub fn update<'g>(
        &self,
        graph: &'g mut ContactGraph,
        a: &TileMember,
        b: &TileMember,
    ) -> &'g mut ContactGraph {
        self.apply(
            graph,
            &a.entity,
            &b.entity,
            a.distance_to(b),
            a.time_delta_to(b),
            a.dt,
        );
        graph
    }

    /// Fold an exhaustive-scan event into `graph`, `dt` being the run's temporal threshold.
    pub fn update_event<'g>(
        &self,
        graph: &'g mut ContactGraph,
        event: &ContactEvent,
        dt: Second,
    ) -> &'g mut ContactGraph {
        self.apply(
            graph,
            event.entity_a(),
            event.entity_b(),
            event.distance(),
            event.time_delta(),
            dt,
        );
        graph
    }

    fn apply(
        &self,
        graph: &mut ContactGraph,
        a: &str,
        b: &str,
        distance: Meter,
        time_delta: Second,
        dt: Second,
    ) {
        match self.policy {
            WeightingPolicy::CountWeight => match graph.edge_mut(a, b) {
                Some(edge) => {
                    edge.weight += 1.0;
                    edge.distance = distance;
                    edge.time_delta = time_delta;
                }
                None => graph.set_edge(
                    a,
                    b,
                    EdgeAttrs {
                        weight: 1.0,
                        distance,
                        time_delta,
                    },
                ),
            },
            WeightingPolicy::DistanceWeight => {
                let candidate = EdgeAttrs {
                    weight: dt - distance,
                    distance,
                    time_delta,
                };
                match graph.edge_mut(a, b) {
                    Some(edge) => {
                        if edge.weight > candidate.weight {
                            *edge = candidate;
                        }
                    }
                    None => graph.set_edge(a, b, candidate),
                }
            }
        }
    }
}

#[cfg(test)]
mod builder_test {
    use super::*;
    use crate::samples::TrajectorySample;

    fn member(entity: &str, lat: f64, t: f64) -> TileMember {
        TileMember::from_sample(
            entity,
            &TrajectorySample::new(lat, 116.4, 0.0, t),
            100.0,
            300.0,
        )
    }

    #[test]
    fn test_unknown_policy_fails_at_construction() {
        assert!(matches!(
            ContactGraphBuilder::new("weight_by_vibes"),
            Err(ColocateError::InvalidConfiguration(_))
        ));
        assert_eq!(
            ContactGraphBuilder::new("dist_weight").unwrap().policy(),
            WeightingPolicy::DistanceWeight
        );
    }

    #[test]
    fn test_count_weight_overwrites_side_attributes() {
        let builder = ContactGraphBuilder::new("count_weight").unwrap();
        let mut g = ContactGraph::new();

        builder.update(&mut g, &member("000", 39.9, 1000.0), &member("001", 39.9, 1000.0));
        let first = *g.edge("000", "001").unwrap();
        assert_eq!(first.weight, 1.0);
        assert_eq!(first.distance, 0.0);

        builder.update(&mut g, &member("001", 39.9003, 2000.0), &member("000", 39.9, 2100.0));
        let second = *g.edge("000", "001").unwrap();
        assert_eq!(second.weight, 2.0);
        assert_eq!(second.time_delta, 100.0);
        assert!(second.distance > 30.0);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_count_weight_repeats_increment() {
        let builder = ContactGraphBuilder::with_policy(WeightingPolicy::CountWeight);
        let mut g = ContactGraph::new();
        let (a, b) = (member("000", 39.9, 0.0), member("001", 39.9, 0.0));
        builder.update(&mut g, &a, &b);
        builder.update(&mut g, &a, &b);
        assert_eq!(g.edge("000", "001").unwrap().weight, 2.0);
    }

    #[test]
    fn test_distance_weight_keeps_smaller() {
        let builder = ContactGraphBuilder::new("distance_weight").unwrap();
        let close = (member("000", 39.9, 0.0), member("001", 39.9, 0.0));
        let far = (member("000", 39.9, 0.0), member("001", 39.9005, 0.0));

        for order in [[&close, &far], [&far, &close]] {
            let mut g = ContactGraph::new();
            for (a, b) in order {
                builder.update(&mut g, a, b);
            }
            let edge = g.edge("000", "001").unwrap();
            // far contact: 300 − ~55.6 m, smaller than 300 − 0
            assert!(edge.weight < 300.0);
            assert_eq!(edge.weight, 300.0 - edge.distance);
        }
    }

    #[test]
    fn test_distance_weight_idempotent() {
        let builder = ContactGraphBuilder::new("distance_weight").unwrap();
        let mut g = ContactGraph::new();
        let (a, b) = (member("000", 39.9, 0.0), member("001", 39.9004, 30.0));
        builder.update(&mut g, &a, &b);
        let once = *g.edge("000", "001").unwrap();
        builder.update(&mut g, &a, &b);
        assert_eq!(*g.edge("000", "001").unwrap(), once);
    }

    #[test]
    fn test_distance_weight_may_be_negative() {
        let builder = ContactGraphBuilder::with_policy(WeightingPolicy::DistanceWeight);
        let mut g = ContactGraph::new();
        // ~1.1 km apart with dt = 300
        builder.update(&mut g, &member("000", 39.9, 0.0), &member("001", 39.91, 0.0));
        assert!(g.edge("000", "001").unwrap().weight < 0.0);
    }

    #[test]
    fn test_update_event() {
        let builder = ContactGraphBuilder::default().apply_weighting_policy(WeightingPolicy::DistanceWeight);
        let s = TrajectorySample::new(39.9, 116.4, 0.0, 0.0);
        let ev = ContactEvent::new("000", s, "001", s);
        let mut g = ContactGraph::new();
        builder.update_event(&mut g, &ev, 600.0);
        assert_eq!(g.edge("001", "000").unwrap().weight, 600.0);
    }
}
