use itertools::Itertools;

use crate::{
    constants::{Meter, Second},
    tiles::{TileIndex, TileKey, TileMember},
};

/// A candidate contact: two members of the same tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileContact<'a> {
    pub key: &'a TileKey,
    pub a: &'a TileMember,
    pub b: &'a TileMember,
}

impl TileContact<'_> {
    /// Haversine distance between the two members, in meters.
    pub fn distance(&self) -> Meter {
        self.a.distance_to(self.b)
    }

    /// Absolute time gap between the two members, in seconds.
    pub fn time_delta(&self) -> Second {
        self.a.time_delta_to(self.b)
    }
}

/// Every candidate pair of `index`, lazily.
///
/// Tiles are visited by ascending key; inside a tile, pairs follow member insertion order
/// (`(m0, m1), (m0, m2), …, (m1, m2), …`). Tiles with fewer than two members yield nothing.
pub fn tile_contacts(index: &TileIndex) -> impl Iterator<Item = TileContact<'_>> {
    index.occupied_tiles().into_iter().flat_map(|(key, members)| {
        members
            .iter()
            .tuple_combinations()
            .map(move |(a, b)| TileContact { key, a, b })
    })
}
