//! # Contact detection parameters
//!
//! This module defines [`ContactParams`], the configuration of one detection run, and its
//! validating builder [`ContactParamsBuilder`].
//!
//! ## Purpose
//!
//! A run is fully described by:
//!
//! - `ds` – spatial threshold **and** tile edge, in meters,
//! - `dt` – temporal threshold **and** tile duration, in seconds,
//! - `origin_lat` / `origin_lon` – the anchor of the local projection plane, fixed for the run,
//! - `weighting` – how contact evidence becomes edge weights
//!   ([`WeightingPolicy::CountWeight`] or [`WeightingPolicy::DistanceWeight`]),
//! - `pruning` – whether the exhaustive scan may skip trajectory segments
//!   ([`Pruning::EarlyExit`], requires time-sorted segments) or not ([`Pruning::Disabled`]),
//! - `parallel` – whether independent work (entities, tiles, entity pairs) is spread across
//!   the rayon pool. Merges are always sequential, so both settings give identical graphs.
//!
//! ## Example
//!
//! ```rust
//! use colocate::params::ContactParams;
//! use colocate::graph::WeightingPolicy;
//!
//! let params = ContactParams::builder()
//!     .ds(500.0)
//!     .dt(600.0)
//!     .weighting(WeightingPolicy::DistanceWeight)
//!     .build()
//!     .unwrap();
//! assert_eq!(params.ds, 500.0);
//! ```
//!
//! ## See also
//! ------------
//! * [`TileIndex::build`](crate::tiles::TileIndex::build) – uses `ds`, `dt` and the origin.
//! * [`PairwiseContacts`](crate::contacts::PairwiseContacts) – uses `ds`, `dt` and `pruning`.
//! * [`ContactGraphBuilder`](crate::graph::ContactGraphBuilder) – uses `weighting`.
use std::fmt;

use crate::{
    colocate_errors::ColocateError,
    constants::{
        Degree, Meter, Second, DEFAULT_DS, DEFAULT_DT, DEFAULT_ORIGIN_LAT, DEFAULT_ORIGIN_LON,
    },
    contacts::Pruning,
    graph::WeightingPolicy,
    projection::LocalOrigin,
};

/// Configuration of one contact-detection run.
///
/// Defaults
/// -----------------
/// * `ds`: 100 m
/// * `dt`: 300 s
/// * `origin_lat`, `origin_lon`: (39.75872, 116.04142)
/// * `weighting`: [`WeightingPolicy::CountWeight`]
/// * `pruning`: [`Pruning::EarlyExit`]
/// * `parallel`: `true`
///
/// Only [`ContactParamsBuilder::build`] validates. A struct literal with a zero or non-finite
/// `ds`/`dt` still runs: the tile index then places no sample at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactParams {
    pub ds: Meter,
    pub dt: Second,
    pub origin_lat: Degree,
    pub origin_lon: Degree,
    pub weighting: WeightingPolicy,
    pub pruning: Pruning,
    pub parallel: bool,
}

impl ContactParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ContactParamsBuilder {
        ContactParamsBuilder::new()
    }

    /// The projection origin as a [`LocalOrigin`].
    pub fn origin(&self) -> LocalOrigin {
        LocalOrigin::new(self.origin_lat, self.origin_lon)
    }
}

impl Default for ContactParams {
    fn default() -> Self {
        ContactParams {
            ds: DEFAULT_DS,
            dt: DEFAULT_DT,
            origin_lat: DEFAULT_ORIGIN_LAT,
            origin_lon: DEFAULT_ORIGIN_LON,
            weighting: WeightingPolicy::CountWeight,
            pruning: Pruning::EarlyExit,
            parallel: true,
        }
    }
}

/// Builder for [`ContactParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct ContactParamsBuilder {
    params: ContactParams,
}

impl ContactParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ContactParams::default(),
        }
    }

    pub fn ds(mut self, v: Meter) -> Self {
        self.params.ds = v;
        self
    }
    pub fn dt(mut self, v: Second) -> Self {
        self.params.dt = v;
        self
    }
    pub fn origin(mut self, lat: Degree, lon: Degree) -> Self {
        self.params.origin_lat = lat;
        self.params.origin_lon = lon;
        self
    }
    pub fn weighting(mut self, v: WeightingPolicy) -> Self {
        self.params.weighting = v;
        self
    }
    pub fn pruning(mut self, v: Pruning) -> Self {
        self.params.pruning = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.params.parallel = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation
    /// -----------------
    /// * `ds` and `dt` must be finite and strictly positive (they are also tile sizes).
    /// * `origin_lat` must lie in `[-90, 90]`; both origin coordinates must be finite.
    /// * `|origin_lat| = 90` is rejected: the longitude scale vanishes at the poles.
    ///
    /// Return
    /// ----------
    /// * `Ok(ContactParams)` or [`ColocateError::InvalidContactParameter`] naming the first
    ///   violated rule.
    pub fn build(self) -> Result<ContactParams, ColocateError> {
        let p = &self.params;

        if !Self::gt0(p.ds) {
            return Err(ColocateError::InvalidContactParameter(
                "ds must be finite and > 0".into(),
            ));
        }
        if !Self::gt0(p.dt) {
            return Err(ColocateError::InvalidContactParameter(
                "dt must be finite and > 0".into(),
            ));
        }
        if !p.origin_lat.is_finite() || !p.origin_lon.is_finite() {
            return Err(ColocateError::InvalidContactParameter(
                "origin coordinates must be finite".into(),
            ));
        }
        if p.origin_lat.abs() >= 90.0 {
            return Err(ColocateError::InvalidContactParameter(
                "origin_lat must lie strictly inside (-90, 90)".into(),
            ));
        }

        Ok(self.params)
    }

    #[inline]
    fn gt0(v: f64) -> bool {
        v.is_finite() && v > 0.0
    }
}

impl fmt::Display for ContactParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Contact Detection Parameters")?;
            writeln!(f, "----------------------------")?;
            writeln!(f, "  ds         = {:.3} m", self.ds)?;
            writeln!(f, "  dt         = {:.3} s", self.dt)?;
            writeln!(
                f,
                "  origin     = ({:.5}, {:.5}) deg",
                self.origin_lat, self.origin_lon
            )?;
            writeln!(f, "  weighting  = {}", self.weighting)?;
            writeln!(f, "  pruning    = {:?}", self.pruning)?;
            write!(f, "  parallel   = {}", self.parallel)
        } else {
            write!(
                f,
                "ds={} dt={} origin=({}, {}) weighting={}",
                self.ds, self.dt, self.origin_lat, self.origin_lon, self.weighting
            )
        }
    }
}
