//! # Exhaustive pairwise scan
//!
//! [`PairwiseContacts`] walks every (sample of A, sample of B) pair of two trajectories and
//! yields a [`ContactEvent`] for each pair with
//!
//! ```text
//! |t_a − t_b| ≤ dt   and   haversine(a, b) ≤ ds
//! ```
//!
//! Order: A samples in trajectory order (outer), B samples in trajectory order (inner).
//!
//! ## Laziness
//! -----------------
//! The scan is an iterator holding four cursors (segment/sample of A, segment/sample of B).
//! Nothing is materialized: peak memory is one event, whatever the size of the cross-product.
//!
//! ## Early-exit pruning
//! -----------------
//! With [`Pruning::EarlyExit`], for the current A sample at time `t_a`:
//!
//! * a B segment whose **first** sample is later than `t_a + dt`, or whose last sample is
//!   earlier than `t_a − dt`, is skipped without being scanned;
//! * inside a B segment, the scan starts at the first sample not earlier than `t_a − dt`
//!   (binary search) and stops at the first sample later than `t_a + dt`.
//!
//! This is only correct when every segment is non-decreasing in time and every time is finite.
//! The precondition is checked by [`PairwiseContacts::new`], which fails with
//! [`ColocateError::UnsortedSegment`] instead of silently missing contacts.
//! [`Pruning::Disabled`] scans every pair and accepts any ordering.
use crate::{
    colocate_errors::ColocateError,
    constants::{Meter, Second},
    contacts::{ContactEvent, Pruning},
    geodesy::haversine_distance,
    params::ContactParams,
    samples::{Segment, Trajectory, TrajectorySample},
    trajectories::SampleSource,
};

/// Lazy exhaustive contact scan between two trajectories.
#[derive(Debug, Clone)]
pub struct PairwiseContacts<'a> {
    a: &'a Trajectory,
    b: &'a Trajectory,
    ds: Meter,
    dt: Second,
    pruning: Pruning,
    seg_a: usize,
    idx_a: usize,
    seg_b: usize,
    idx_b: usize,
    // end of the current B window when pruning, exclusive
    end_b: usize,
}

impl<'a> PairwiseContacts<'a> {
    /// Prepare a scan of `a` against `b`.
    ///
    /// Arguments
    /// -----------------
    /// * `a`, `b`: the two trajectories.
    /// * `params`: `ds`, `dt` thresholds and the pruning mode.
    ///
    /// Return
    /// ----------
    /// * The iterator, or [`ColocateError::UnsortedSegment`] when early-exit pruning is
    ///   requested and a segment of `b` is not time-sorted or holds a non-finite time. (Only B segments are pruned, so
    ///   the order of A does not matter.)
    pub fn new(
        a: &'a Trajectory,
        b: &'a Trajectory,
        params: &ContactParams,
    ) -> Result<Self, ColocateError> {
        if params.pruning == Pruning::EarlyExit {
            if let Some((segment, index)) = b.first_unsorted() {
                return Err(ColocateError::UnsortedSegment {
                    entity: b.entity().to_string(),
                    segment,
                    index,
                });
            }
        }
        Ok(PairwiseContacts {
            a,
            b,
            ds: params.ds,
            dt: params.dt,
            pruning: params.pruning,
            seg_a: 0,
            idx_a: 0,
            seg_b: 0,
            idx_b: 0,
            end_b: usize::MAX,
        })
    }

    /// Look both entities up in `source` and prepare the scan.
    pub fn between<S: SampleSource + ?Sized>(
        source: &'a S,
        entity_a: &str,
        entity_b: &str,
        params: &ContactParams,
    ) -> Result<Self, ColocateError> {
        let a = source
            .trajectory(entity_a)
            .ok_or_else(|| ColocateError::UnknownEntity(entity_a.to_string()))?;
        let b = source
            .trajectory(entity_b)
            .ok_or_else(|| ColocateError::UnknownEntity(entity_b.to_string()))?;
        PairwiseContacts::new(a, b, params)
    }

    /// Window `[start, end)` of `seg` that can hold contacts with a sample at `t_a`,
    /// `None` when the whole segment can be skipped.
    fn window(&self, seg: &Segment, t_a: Second) -> Option<(usize, usize)> {
        let (first, last) = (seg.first()?, seg.last()?);
        if first.t - t_a > self.dt || t_a - last.t > self.dt {
            return None;
        }
        let samples = seg.samples();
        let start = samples.partition_point(|s| s.t < t_a - self.dt);
        let end = samples.partition_point(|s| s.t <= t_a + self.dt);
        Some((start, end))
    }

    fn advance_a(&mut self) {
        self.idx_a += 1;
        self.seg_b = 0;
        self.idx_b = 0;
        self.end_b = usize::MAX;
    }

    fn next_b_segment(&mut self) {
        self.seg_b += 1;
        self.idx_b = 0;
        self.end_b = usize::MAX;
    }

    fn test_pair(&self, pa: &TrajectorySample, pb: &TrajectorySample) -> Option<ContactEvent> {
        // NaN never compares, so it has to be rejected explicitly
        let gap = (pa.t - pb.t).abs();
        if gap.is_nan() || gap > self.dt {
            return None;
        }
        let distance = haversine_distance(pa.lat, pa.lon, pb.lat, pb.lon);
        if distance.is_nan() || distance > self.ds {
            return None;
        }
        Some(
            ContactEvent::new(self.a.entity(), *pa, self.b.entity(), *pb)
                .with_distance(distance)
                .with_segments(self.seg_a, self.seg_b),
        )
    }
}

impl Iterator for PairwiseContacts<'_> {
    type Item = ContactEvent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let seg_a = self.a.segments().get(self.seg_a)?;
            let Some(pa) = seg_a.samples().get(self.idx_a) else {
                self.seg_a += 1;
                self.idx_a = 0;
                self.seg_b = 0;
                self.idx_b = 0;
                self.end_b = usize::MAX;
                continue;
            };

            let Some(seg_b) = self.b.segments().get(self.seg_b) else {
                self.advance_a();
                continue;
            };

            if self.pruning == Pruning::EarlyExit && self.end_b == usize::MAX {
                match self.window(seg_b, pa.t) {
                    Some((start, end)) => {
                        self.idx_b = start;
                        self.end_b = end;
                    }
                    None => {
                        self.next_b_segment();
                        continue;
                    }
                }
            }

            if self.idx_b >= self.end_b.min(seg_b.len()) {
                self.next_b_segment();
                continue;
            }
            let pb = &seg_b.samples()[self.idx_b];
            self.idx_b += 1;

            if let Some(event) = self.test_pair(pa, pb) {
                return Some(event);
            }
        }
    }
}
