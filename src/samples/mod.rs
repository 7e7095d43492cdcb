//! # Trajectory samples, segments and trajectories
//!
//! The atomic input of the contact engine is a [`TrajectorySample`]: one timestamped GPS fix.
//! Samples are grouped into [`Segment`]s (one per source file, in file row order), and the
//! segments of one entity form a [`Trajectory`] (in file order).
//!
//! ## Units & conventions
//! -----------------
//! * Latitude / longitude in **degrees**, altitude as provided by the source (feet for Geolife).
//! * Time `t` in **Unix seconds (UTC)**, converted from the serial-day column with
//!   [`serial_days_to_unix_seconds`].
//! * The owning entity id is carried by the enclosing [`Trajectory`].
//!
//! ## Time ordering
//! -----------------
//! Nothing here sorts samples. The early-exit scan of the
//! [`contacts`](crate::contacts) module requires every segment to be non-decreasing in time,
//! with finite times only; [`Segment::first_unsorted_index`] is the check it runs before scanning.
use hifitime::Epoch;

use crate::{
    constants::{Degree, EntityId, Second, SerialDay},
    time::{serial_days_to_unix_seconds, unix_seconds_to_epoch},
};

/// One timestamped GPS fix. Immutable once read from the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub lat: Degree,
    pub lon: Degree,
    pub alt: f64,
    pub t: Second,
}

impl TrajectorySample {
    pub fn new(lat: Degree, lon: Degree, alt: f64, t: Second) -> Self {
        TrajectorySample { lat, lon, alt, t }
    }

    /// Build a sample from a raw source row.
    ///
    /// Arguments
    /// ---------
    /// * `raw`: `[lat, lon, unused, altitude, elapsed_days]` where `elapsed_days` counts days
    ///   since 1899-12-30 UTC
    ///
    /// Return
    /// ------
    /// * a sample whose `t` is the corresponding Unix timestamp in seconds
    pub fn from_raw(raw: [f64; 5]) -> Self {
        let [lat, lon, _, alt, days] = raw;
        TrajectorySample::from_serial_days(lat, lon, alt, days)
    }

    pub fn from_serial_days(lat: Degree, lon: Degree, alt: f64, days: SerialDay) -> Self {
        TrajectorySample {
            lat,
            lon,
            alt,
            t: serial_days_to_unix_seconds(days),
        }
    }

    /// `true` when latitude, longitude and time are all finite.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.t.is_finite()
    }
}

/// The ordered samples read from one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    label: String,
    samples: Vec<TrajectorySample>,
}

impl Segment {
    pub fn new(label: impl Into<String>, samples: Vec<TrajectorySample>) -> Self {
        Segment {
            label: label.into(),
            samples,
        }
    }

    /// Source label of the segment (the PLT file name for Geolife data).
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    /// Index of the first sample whose time is not finite or is earlier than its predecessor.
    pub fn first_unsorted_index(&self) -> Option<usize> {
        self.samples
            .iter()
            .enumerate()
            .position(|(i, s)| !s.t.is_finite() || (i > 0 && s.t < self.samples[i - 1].t))
    }

    pub fn is_time_sorted(&self) -> bool {
        self.first_unsorted_index().is_none()
    }

    /// UTC epochs of the first and last samples, `None` when empty or either time is not finite.
    pub fn epoch_span(&self) -> Option<(Epoch, Epoch)> {
        let (first, last) = (self.first()?.t, self.last()?.t);
        (first.is_finite() && last.is_finite())
            .then(|| (unix_seconds_to_epoch(first), unix_seconds_to_epoch(last)))
    }
}

/// Every segment of one entity, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    entity: EntityId,
    segments: Vec<Segment>,
}

impl Trajectory {
    pub fn new(entity: impl Into<EntityId>) -> Self {
        Trajectory {
            entity: entity.into(),
            segments: Vec::new(),
        }
    }

    pub fn with_segments(entity: impl Into<EntityId>, segments: Vec<Segment>) -> Self {
        Trajectory {
            entity: entity.into(),
            segments,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Total number of samples over all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(Segment::is_empty)
    }

    /// Iterate every sample, segment by segment, in source order.
    ///
    /// The iterator borrows the trajectory and allocates nothing. It is finite and
    /// restartable: call `samples()` again, or clone the iterator, to rescan.
    pub fn samples(&self) -> SampleIter<'_> {
        SampleIter {
            segments: &self.segments,
            segment: 0,
            index: 0,
        }
    }

    /// Locate the first out-of-order sample as `(segment, index)`.
    pub fn first_unsorted(&self) -> Option<(usize, usize)> {
        self.segments
            .iter()
            .enumerate()
            .find_map(|(s, seg)| seg.first_unsorted_index().map(|i| (s, i)))
    }
}

/// Borrowing iterator over the samples of a [`Trajectory`].
#[derive(Debug, Clone)]
pub struct SampleIter<'a> {
    segments: &'a [Segment],
    segment: usize,
    index: usize,
}

impl<'a> Iterator for SampleIter<'a> {
    type Item = &'a TrajectorySample;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(seg) = self.segments.get(self.segment) {
            if let Some(sample) = seg.samples.get(self.index) {
                self.index += 1;
                return Some(sample);
            }
            self.segment += 1;
            self.index = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .segments
            .iter()
            .skip(self.segment)
            .map(Segment::len)
            .sum::<usize>()
            .saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SampleIter<'_> {}

#[cfg(test)]
mod samples_test {
    use super::*;

    fn seg(label: &str, times: &[f64]) -> Segment {
        Segment::new(
            label,
            times
                .iter()
                .map(|&t| TrajectorySample::new(39.9, 116.4, 0.0, t))
                .collect(),
        )
    }

    #[test]
    fn test_from_raw() {
        let s = TrajectorySample::from_raw([39.984702, 116.318417, 0.0, 492.0, 25570.0]);
        assert_eq!(s.lat, 39.984702);
        assert_eq!(s.lon, 116.318417);
        assert_eq!(s.alt, 492.0);
        assert_eq!(s.t, 86_400.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(TrajectorySample::new(1.0, 2.0, 0.0, 3.0).is_finite());
        assert!(!TrajectorySample::new(f64::NAN, 2.0, 0.0, 3.0).is_finite());
        assert!(!TrajectorySample::new(1.0, 2.0, 0.0, f64::INFINITY).is_finite());
        // altitude is not used for placement
        assert!(TrajectorySample::new(1.0, 2.0, f64::NAN, 3.0).is_finite());
    }

    #[test]
    fn test_unsorted_detection() {
        assert_eq!(seg("a", &[1.0, 2.0, 2.0, 5.0]).first_unsorted_index(), None);
        assert_eq!(seg("b", &[1.0, 3.0, 2.0, 5.0]).first_unsorted_index(), Some(2));
        assert!(seg("c", &[]).is_time_sorted());
        assert_eq!(seg("d", &[1.0, f64::NAN, 3.0]).first_unsorted_index(), Some(1));
        assert_eq!(seg("e", &[f64::NAN]).first_unsorted_index(), Some(0));
        assert_eq!(seg("f", &[1.0, f64::INFINITY]).first_unsorted_index(), Some(1));

        let traj = Trajectory::with_segments("000", vec![seg("a", &[1.0, 2.0]), seg("b", &[9.0, 4.0])]);
        assert_eq!(traj.first_unsorted(), Some((1, 1)));
    }

    #[test]
    fn test_epoch_span() {
        assert_eq!(seg("empty", &[]).epoch_span(), None);
        assert_eq!(seg("nan", &[0.0, f64::NAN]).epoch_span(), None);

        let (first, last) = seg("a", &[0.0, 3600.0, 86_400.0]).epoch_span().unwrap();
        assert_eq!(first.to_gregorian_utc(), (1970, 1, 1, 0, 0, 0, 0));
        assert_eq!(last.to_gregorian_utc(), (1970, 1, 2, 0, 0, 0, 0));
    }

    #[test]
    fn test_sample_iter_restartable() {
        let traj = Trajectory::with_segments(
            "000",
            vec![seg("a", &[1.0, 2.0]), seg("empty", &[]), seg("b", &[3.0])],
        );
        assert_eq!(traj.len(), 3);

        let it = traj.samples();
        assert_eq!(it.len(), 3);
        let first: Vec<f64> = it.clone().map(|s| s.t).collect();
        let second: Vec<f64> = it.map(|s| s.t).collect();
        assert_eq!(first, vec![1.0, 2.0, 3.0]);
        assert_eq!(first, second);
        assert_eq!(traj.samples().count(), 3);
    }

    #[test]
    fn test_empty_trajectory() {
        let traj = Trajectory::new("001");
        assert!(traj.is_empty());
        assert_eq!(traj.samples().next(), None);
    }
}
