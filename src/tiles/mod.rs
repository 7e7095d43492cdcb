//! # Spatiotemporal tile index
//!
//! Discretizes space-time into tiles of `ds` meters × `ds` meters × `dt` seconds so that contact
//! candidates are only looked for among entities sharing a tile, instead of across all pairs.
//!
//! ## Tile key
//! -----------------
//! For a sample `(lat, lon, t)` and a run origin:
//!
//! ```text
//! (x, y)   = origin.to_local_meters(lat, lon)
//! (qx, qy) = (floor(x/ds)·ds, floor(y/ds)·ds)
//! (qlat, qlon) = origin.to_lat_lon(qx, qy)      // south-west tile corner, human readable
//! qt       = floor(t/dt)·dt
//! key      = (qlat, qlon, qt)                   // rendered "lat{qlat}_lon{qlon}_t{qt}"
//! ```
//!
//! All samples of a cell go through the same floor + inverse projection, so they produce
//! bit-identical keys.
//!
//! ## Membership invariant
//! -----------------
//! A tile holds at most **one** [`TileMember`] per entity: the first sample of that entity that
//! fell into the tile. Later samples of the same entity in the same tile are ignored.
//!
//! ## Unplaceable samples
//! -----------------
//! A sample with a non-finite latitude, longitude or time has no tile, and neither has any
//! sample of an index whose `ds` or `dt` is zero, negative or not finite. [`TileIndex::assign`]
//! returns `None` for it and the index counts it in [`TileIndex::unplaced`]; it is never merged
//! into a real tile. Text keys coming from an external cache go through
//! [`TileKey::from_hash`], which yields `None` for an empty or malformed key.
//!
//! ## See also
//! ------------
//! * [`LocalOrigin`] – projection used for quantization.
//! * [`tile_contacts`](crate::contacts::tile_contacts) – candidate pairs inside each tile.
use std::{collections::HashMap, fmt, str::FromStr};

use ahash::RandomState;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::{info, warn};

use crate::{
    constants::{Degree, EntityId, Meter, Second},
    geodesy::haversine_distance,
    params::ContactParams,
    projection::LocalOrigin,
    samples::TrajectorySample,
    trajectories::SampleSource,
};

/// Quantized `(lat, lon, t)` of a tile's south-west, earliest corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    lat: OrderedFloat<Degree>,
    lon: OrderedFloat<Degree>,
    t: OrderedFloat<Second>,
}

impl TileKey {
    pub fn new(lat: Degree, lon: Degree, t: Second) -> Self {
        TileKey {
            lat: OrderedFloat(lat),
            lon: OrderedFloat(lon),
            t: OrderedFloat(t),
        }
    }

    /// Compute the key of the tile containing `(lat, lon, t)`.
    ///
    /// Arguments
    /// -----------------
    /// * `lat`, `lon`: sample position in degrees.
    /// * `t`: sample time in seconds.
    /// * `ds`, `dt`: tile edge (meters) and duration (seconds), both > 0.
    /// * `origin`: the run's projection origin.
    ///
    /// Return
    /// ----------
    /// * The key, or `None` if any input coordinate is not finite, if `ds` or `dt` is not a
    ///   finite positive number, or if the quantized corner itself is not finite.
    pub fn quantize(
        lat: Degree,
        lon: Degree,
        t: Second,
        ds: Meter,
        dt: Second,
        origin: &LocalOrigin,
    ) -> Option<TileKey> {
        if !valid_extent(ds, dt) || !(lat.is_finite() && lon.is_finite() && t.is_finite()) {
            return None;
        }
        let p = origin.to_local_meters(lat, lon);
        let q = p.map(|v| (v / ds).floor() * ds);
        let (qlat, qlon) = origin.to_lat_lon(&q);
        let qt = (t / dt).floor() * dt;
        if !(qlat.is_finite() && qlon.is_finite() && qt.is_finite()) {
            return None;
        }
        Some(TileKey::new(qlat, qlon, qt))
    }

    pub fn lat(&self) -> Degree {
        self.lat.0
    }

    pub fn lon(&self) -> Degree {
        self.lon.0
    }

    pub fn t(&self) -> Second {
        self.t.0
    }

    /// Parse a textual tile hash, `None` when it is empty or malformed.
    pub fn from_hash(hash: &str) -> Option<TileKey> {
        hash.parse().ok()
    }
}

/// Tile edge and duration must be finite and strictly positive.
fn valid_extent(ds: Meter, dt: Second) -> bool {
    ds.is_finite() && ds > 0.0 && dt.is_finite() && dt > 0.0
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat{}_lon{}_t{}", self.lat, self.lon, self.t)
    }
}

impl FromStr for TileKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '_');
        let mut field = |prefix: &str| -> Result<f64, String> {
            let part = parts
                .next()
                .ok_or_else(|| format!("missing {prefix} field in tile key {s:?}"))?;
            part.strip_prefix(prefix)
                .ok_or_else(|| format!("expected {prefix} prefix in {part:?}"))?
                .parse::<f64>()
                .map_err(|e| format!("invalid {prefix} value in {part:?}: {e}"))
        };
        let lat = field("lat")?;
        let lon = field("lon")?;
        let t = field("t")?;
        if !(lat.is_finite() && lon.is_finite() && t.is_finite()) {
            return Err(format!("non-finite tile key {s:?}"));
        }
        Ok(TileKey::new(lat, lon, t))
    }
}

/// One entity's entry in a tile: `[entity, lat, lon, t, ds, dt]`.
///
/// `lat`, `lon`, `t` are those of the first sample of the entity that fell into the tile;
/// `ds`, `dt` are the thresholds the tile was built with.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMember {
    pub entity: EntityId,
    pub lat: Degree,
    pub lon: Degree,
    pub t: Second,
    pub ds: Meter,
    pub dt: Second,
}

impl TileMember {
    pub fn from_sample(entity: &str, sample: &TrajectorySample, ds: Meter, dt: Second) -> Self {
        TileMember {
            entity: entity.to_string(),
            lat: sample.lat,
            lon: sample.lon,
            t: sample.t,
            ds,
            dt,
        }
    }

    /// Haversine distance to `other`, in meters.
    pub fn distance_to(&self, other: &TileMember) -> Meter {
        haversine_distance(self.lat, self.lon, other.lat, other.lon)
    }

    /// Absolute time gap to `other`, in seconds.
    pub fn time_delta_to(&self, other: &TileMember) -> Second {
        (self.t - other.t).abs()
    }
}

/// Members of one tile, in insertion order.
pub type TileMembers = SmallVec<[TileMember; 4]>;

/// All tiles of one run, keyed by [`TileKey`].
#[derive(Debug, Clone)]
pub struct TileIndex {
    ds: Meter,
    dt: Second,
    origin: LocalOrigin,
    tiles: HashMap<TileKey, TileMembers, RandomState>,
    unplaced: usize,
}

impl TileIndex {
    /// An empty index for the given thresholds and origin.
    pub fn new(ds: Meter, dt: Second, origin: LocalOrigin) -> Self {
        TileIndex {
            ds,
            dt,
            origin,
            tiles: HashMap::default(),
            unplaced: 0,
        }
    }

    pub fn from_params(params: &ContactParams) -> Self {
        TileIndex::new(params.ds, params.dt, params.origin())
    }

    /// Tile every sample of every entity of `source`.
    ///
    /// Entities are visited in sorted order. With `params.parallel`, the per-entity tiling runs
    /// on the rayon pool and the per-entity results are merged sequentially in entity order, so
    /// the resulting index (member order included) is the same as the sequential one.
    pub fn build<S: SampleSource + Sync + ?Sized>(source: &S, params: &ContactParams) -> Self {
        let mut index = TileIndex::from_params(params);
        let entities = source.entities();
        if !valid_extent(index.ds, index.dt) {
            warn!(
                ds = index.ds,
                dt = index.dt,
                "tile extent must be finite and positive, no sample can be placed"
            );
        }

        if params.parallel {
            let per_entity: Vec<(Vec<(TileKey, TileMember)>, usize)> = entities
                .par_iter()
                .map(|entity| index.tile_entity(source, entity))
                .collect();
            for (placed, unplaced) in per_entity {
                index.unplaced += unplaced;
                for (key, member) in placed {
                    index.tiles.entry(key).or_default().push(member);
                }
            }
        } else {
            for entity in &entities {
                if let Some(traj) = source.trajectory(entity) {
                    for sample in traj.samples() {
                        index.assign(entity, sample);
                    }
                }
            }
        }

        if index.unplaced > 0 {
            warn!(unplaced = index.unplaced, "samples without a tile were skipped");
        }
        info!(
            entities = entities.len(),
            tiles = index.len(),
            occupied = index.occupied_tiles().len(),
            "tile index built"
        );
        index
    }

    /// First-occurrence tiling of one entity, without touching the index.
    fn tile_entity<S: SampleSource + ?Sized>(
        &self,
        source: &S,
        entity: &str,
    ) -> (Vec<(TileKey, TileMember)>, usize) {
        let Some(traj) = source.trajectory(entity) else {
            return (Vec::new(), 0);
        };
        let mut seen = std::collections::HashSet::with_hasher(RandomState::new());
        let mut placed = Vec::new();
        let mut unplaced = 0;
        for sample in traj.samples() {
            match self.key_for(sample) {
                Some(key) => {
                    if seen.insert(key) {
                        placed.push((key, TileMember::from_sample(entity, sample, self.ds, self.dt)));
                    }
                }
                None => unplaced += 1,
            }
        }
        (placed, unplaced)
    }

    /// Key of the tile that would hold `sample`, `None` if it cannot be placed.
    pub fn key_for(&self, sample: &TrajectorySample) -> Option<TileKey> {
        TileKey::quantize(sample.lat, sample.lon, sample.t, self.ds, self.dt, &self.origin)
    }

    /// Place one sample of `entity`.
    ///
    /// Return
    /// ----------
    /// * `Some(key)` – the tile the sample belongs to. The entity is added to that tile only if
    ///   it is not already a member.
    /// * `None` – the sample has no tile (non-finite coordinates, or an invalid tile extent);
    ///   it is counted in [`TileIndex::unplaced`].
    pub fn assign(&mut self, entity: &str, sample: &TrajectorySample) -> Option<TileKey> {
        let Some(key) = self.key_for(sample) else {
            self.unplaced += 1;
            return None;
        };
        let members = self.tiles.entry(key).or_default();
        if !members.iter().any(|m| m.entity == entity) {
            members.push(TileMember::from_sample(entity, sample, self.ds, self.dt));
        }
        Some(key)
    }

    pub fn ds(&self) -> Meter {
        self.ds
    }

    pub fn dt(&self) -> Second {
        self.dt
    }

    pub fn origin(&self) -> &LocalOrigin {
        &self.origin
    }

    /// Raw view of the tile map (unspecified iteration order).
    pub fn tiles_view(&self) -> &HashMap<TileKey, TileMembers, RandomState> {
        &self.tiles
    }

    /// Members of the tile `key`.
    pub fn get(&self, key: &TileKey) -> Option<&[TileMember]> {
        self.tiles.get(key).map(|m| m.as_slice())
    }

    /// Every tile, sorted by key.
    pub fn sorted_tiles(&self) -> Vec<(&TileKey, &[TileMember])> {
        let mut tiles: Vec<_> = self.tiles.iter().map(|(k, m)| (k, m.as_slice())).collect();
        tiles.sort_unstable_by(|a, b| a.0.cmp(b.0));
        tiles
    }

    /// Tiles with at least two members, sorted by key.
    pub fn occupied_tiles(&self) -> Vec<(&TileKey, &[TileMember])> {
        let mut tiles = self.sorted_tiles();
        tiles.retain(|(_, m)| m.len() > 1);
        tiles
    }

    /// Largest number of distinct members in any tile, `0` on an empty index.
    pub fn hot_zone_count(&self) -> usize {
        self.tiles.values().map(|m| m.len()).max().unwrap_or(0)
    }

    /// Tiles whose member count equals [`TileIndex::hot_zone_count`], sorted by key.
    pub fn hot_zones(&self) -> Vec<(&TileKey, &[TileMember])> {
        let hot = self.hot_zone_count();
        let mut tiles = self.sorted_tiles();
        tiles.retain(|(_, m)| m.len() == hot);
        tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of samples that could not be placed in a tile.
    pub fn unplaced(&self) -> usize {
        self.unplaced
    }
}
