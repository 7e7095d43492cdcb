//! # Exhaustive all-pairs search
//!
//! Runs [`PairwiseContacts`] over every unordered pair of entities of a [`SampleSource`].
//!
//! ## Ordering
//! -----------------
//! Pairs are `(entities[i], entities[j])` with `i < j` over the sorted entity list
//! (`itertools::combinations`). [`all_pair_contacts`] walks them lazily, one scan at a time.
//! With `params.parallel`, [`all_pair_events`] and [`contact_combos`] scan pairs on the rayon
//! pool; results are always concatenated in pair order, so the output does not depend on
//! scheduling.
//!
//! ## Error Handling
//! -----------------
//! Any pair failing the early-exit precondition aborts the whole search with
//! [`ColocateError::UnsortedSegment`].
use std::collections::BTreeSet;

use itertools::{Either, Itertools};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::info;

use crate::{
    colocate_errors::ColocateError,
    constants::{Degree, EntityId, Second, PAIR_BATCH},
    contacts::{ContactEvent, PairwiseContacts},
    params::ContactParams,
    trajectories::SampleSource,
};

/// Deduplicated contact summary: the entity pair and the event midpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactCombo {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    pub lat: OrderedFloat<Degree>,
    pub lon: OrderedFloat<Degree>,
    pub t: OrderedFloat<Second>,
}

impl From<&ContactEvent> for ContactCombo {
    fn from(ev: &ContactEvent) -> Self {
        ContactCombo {
            entity_a: ev.entity_a().to_string(),
            entity_b: ev.entity_b().to_string(),
            lat: OrderedFloat(ev.lat()),
            lon: OrderedFloat(ev.lon()),
            t: OrderedFloat(ev.t()),
        }
    }
}

fn entity_pairs<S: SampleSource + ?Sized>(source: &S) -> Vec<(&str, &str)> {
    source.entities().into_iter().tuple_combinations().collect()
}

fn scan_pair<S: SampleSource + ?Sized>(
    source: &S,
    pair: (&str, &str),
    params: &ContactParams,
) -> Result<Vec<ContactEvent>, ColocateError> {
    Ok(PairwiseContacts::between(source, pair.0, pair.1, params)?.collect())
}

fn combos_of_pair<S: SampleSource + ?Sized>(
    source: &S,
    pair: (&str, &str),
    params: &ContactParams,
) -> Result<BTreeSet<ContactCombo>, ColocateError> {
    Ok(PairwiseContacts::between(source, pair.0, pair.1, params)?
        .map(|ev| ContactCombo::from(&ev))
        .collect())
}

/// Lazy contact events between every pair of entities, in pair order.
///
/// Nothing is collected: each entity pair is scanned by a [`PairwiseContacts`] only when the
/// previous pair is exhausted, so memory stays at one scan whatever the number of contacts.
/// A pair that cannot be scanned yields its error in place of its events; the caller decides
/// whether to stop there.
///
/// See also
/// ------------
/// * [`all_pair_events`] – the same search, collected, parallel across pairs.
pub fn all_pair_contacts<'a, S: SampleSource + ?Sized + 'a>(
    source: &'a S,
    params: &ContactParams,
) -> impl Iterator<Item = Result<ContactEvent, ColocateError>> + 'a {
    let params = *params;
    source
        .entities()
        .into_iter()
        .tuple_combinations()
        .flat_map(move |(a, b)| match PairwiseContacts::between(source, a, b, &params) {
            Ok(scan) => Either::Left(scan.map(Ok)),
            Err(err) => Either::Right(std::iter::once(Err(err))),
        })
}

/// Every contact event between every pair of entities.
///
/// Arguments
/// -----------------
/// * `source`: the trajectories.
/// * `params`: thresholds, pruning mode and the `parallel` flag.
///
/// Return
/// ----------
/// * Events grouped by entity pair (pair order as described in the module docs), and in scan
///   order within a pair. Every event is held in memory; fold [`all_pair_contacts`] instead
///   when only an aggregate is needed.
pub fn all_pair_events<S: SampleSource + Sync + ?Sized>(
    source: &S,
    params: &ContactParams,
) -> Result<Vec<ContactEvent>, ColocateError> {
    let pairs = entity_pairs(source);

    let events: Vec<ContactEvent> = if params.parallel {
        let per_pair: Vec<Vec<ContactEvent>> = pairs
            .par_iter()
            .map(|&pair| scan_pair(source, pair, params))
            .collect::<Result<_, _>>()?;
        per_pair.into_iter().flatten().collect()
    } else {
        all_pair_contacts(source, params).collect::<Result<_, _>>()?
    };

    info!(
        pairs = pairs.len(),
        events = events.len(),
        ds = params.ds,
        dt = params.dt,
        "exhaustive scan done"
    );
    Ok(events)
}

/// Deduplicated set of `(entity_a, entity_b, mid_lat, mid_lon, mid_t)` over all entity pairs.
///
/// Each pair is reduced to its own set as it is scanned; with `params.parallel`, pairs are
/// scanned [`PAIR_BATCH`] at a time on the rayon pool and merged in pair order.
///
/// See also
/// ------------
/// * [`all_pair_events`] – the same search, keeping every event.
pub fn contact_combos<S: SampleSource + Sync + ?Sized>(
    source: &S,
    params: &ContactParams,
) -> Result<BTreeSet<ContactCombo>, ColocateError> {
    let pairs = entity_pairs(source);
    let mut combos = BTreeSet::new();
    if params.parallel {
        for batch in pairs.chunks(PAIR_BATCH) {
            let sets: Vec<BTreeSet<ContactCombo>> = batch
                .par_iter()
                .map(|&pair| combos_of_pair(source, pair, params))
                .collect::<Result<_, _>>()?;
            sets.into_iter().for_each(|set| combos.extend(set));
        }
    } else {
        for &pair in &pairs {
            combos.extend(combos_of_pair(source, pair, params)?);
        }
    }
    Ok(combos)
}

#[cfg(test)]
mod exhaustive_test {
    use super::*;
    use crate::{
        contacts::Pruning,
        samples::{Segment, TrajectorySample},
        trajectories::TrajectoryStore,
    };

    fn store(points: &[(&str, f64, f64, f64)]) -> TrajectoryStore {
        let mut store = TrajectoryStore::new();
        for &(entity, lat, lon, t) in points {
            store.insert_segment(
                entity,
                Segment::new("s", vec![TrajectorySample::new(lat, lon, 0.0, t)]),
            );
        }
        store
    }

    #[test]
    fn test_identical_point_scenario() {
        let store = store(&[("000", 39.9, 116.4, 1000.0), ("001", 39.9, 116.4, 1000.0)]);
        let events = all_pair_events(&store, &ContactParams::default()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].distance(), 0.0);
        assert_eq!(events[0].time_delta(), 0.0);

        let combos = contact_combos(&store, &ContactParams::default()).unwrap();
        assert_eq!(combos.len(), 1);
        let c = combos.iter().next().unwrap();
        assert_eq!((c.entity_a.as_str(), c.entity_b.as_str()), ("000", "001"));
        assert_eq!(c.t.0, 1000.0);
    }

    #[test]
    fn test_far_apart_scenario() {
        let store = store(&[("000", 39.9, 116.4, 1000.0), ("001", 39.945, 116.4, 1000.0)]);
        assert!(contact_combos(&store, &ContactParams::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_pair_order_and_parallel_equivalence() {
        let store = store(&[
            ("002", 39.9, 116.4, 1000.0),
            ("000", 39.9, 116.4, 1000.0),
            ("001", 39.9, 116.4, 1100.0),
            ("003", 40.5, 116.4, 1000.0),
        ]);
        let seq = all_pair_events(
            &store,
            &ContactParams {
                parallel: false,
                ..Default::default()
            },
        )
        .unwrap();
        let par = all_pair_events(&store, &ContactParams::default()).unwrap();
        assert_eq!(seq, par);

        let pairs: Vec<(&str, &str)> = seq.iter().map(|e| (e.entity_a(), e.entity_b())).collect();
        assert_eq!(pairs, vec![("000", "001"), ("000", "002"), ("001", "002")]);
    }

    #[test]
    fn test_lazy_contacts_match_collected_events() {
        let store = store(&[
            ("002", 39.9, 116.4, 1000.0),
            ("000", 39.9, 116.4, 1000.0),
            ("001", 39.9, 116.4, 1100.0),
        ]);
        let params = ContactParams::default();
        let mut lazy = all_pair_contacts(&store, &params);
        let first = lazy.next().unwrap().unwrap();
        assert_eq!((first.entity_a(), first.entity_b()), ("000", "001"));

        let lazy: Vec<ContactEvent> = all_pair_contacts(&store, &params)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lazy, all_pair_events(&store, &params).unwrap());
    }

    #[test]
    fn test_unsorted_aborts_search() {
        let mut s = store(&[("000", 39.9, 116.4, 1000.0)]);
        s.insert_segment(
            "001",
            Segment::new(
                "s",
                vec![
                    TrajectorySample::new(39.9, 116.4, 0.0, 1000.0),
                    TrajectorySample::new(39.9, 116.4, 0.0, 900.0),
                ],
            ),
        );
        assert!(matches!(
            all_pair_events(&s, &ContactParams::default()),
            Err(ColocateError::UnsortedSegment { .. })
        ));
        let params = ContactParams {
            pruning: Pruning::Disabled,
            ..Default::default()
        };
        assert_eq!(all_pair_events(&s, &params).unwrap().len(), 2);

        let lazy: Vec<_> = all_pair_contacts(&s, &ContactParams::default()).collect();
        assert_eq!(lazy.len(), 1);
        assert!(matches!(lazy[0], Err(ColocateError::UnsortedSegment { .. })));
        assert!(matches!(
            contact_combos(&s, &ContactParams::default()),
            Err(ColocateError::UnsortedSegment { .. })
        ));
    }
}
