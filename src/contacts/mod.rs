//! # Contact detection
//!
//! Two detection modes produce contacts between entities:
//!
//! * **Tile-driven** ([`tile_contacts`]): inside a tile holding two or more entities, every
//!   unordered pair of members is a candidate contact. Co-membership already implies proximity
//!   within `ds`/`dt`, so the exact distance and time gap are computed for annotation only.
//! * **Exhaustive pairwise** ([`PairwiseContacts`], [`all_pair_contacts`], [`contact_combos`],
//!   [`all_pair_events`]):
//!   every sample of one entity against every sample of another, accepted iff
//!   `|Δt| ≤ dt` and `haversine ≤ ds`. Used to validate the tiled results and when no tiling is
//!   applied.
//!
//! Modules
//! -----------------
//! * [`contact_event`](crate::contacts::contact_event) – [`ContactEvent`], one confirmed co-location.
//! * [`pairwise`](crate::contacts::pairwise) – lazy exhaustive scan of two trajectories.
//! * [`tile_contacts`](crate::contacts::tile_contacts) – candidate pairs inside tiles.
//! * [`exhaustive`](crate::contacts::exhaustive) – exhaustive scan over every entity pair.
//!
//! See also
//! ------------
//! * [`TileIndex`](crate::tiles::TileIndex) – the tiles consumed by the tile-driven mode.
//! * [`ContactGraphBuilder`](crate::graph::ContactGraphBuilder) – turns contacts into edges.
pub mod contact_event;
pub mod exhaustive;
pub mod pairwise;
pub mod tile_contacts;

pub use contact_event::ContactEvent;
pub use exhaustive::{all_pair_contacts, all_pair_events, contact_combos, ContactCombo};
pub use pairwise::PairwiseContacts;
pub use tile_contacts::{tile_contacts, TileContact};

/// Segment skipping strategy of the exhaustive scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pruning {
    /// Skip B segments (and B samples) that are out of the `dt` window of the current A sample.
    /// Requires every segment to be sorted by time; checked when the scan is built.
    #[default]
    EarlyExit,
    /// Test every pair of samples. No ordering precondition.
    Disabled,
}
