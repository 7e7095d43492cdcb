//! # Graph passes
//!
//! End-to-end steps turning a [`TileIndex`] (or exhaustive-scan events) into a
//! [`ContactGraph`], optionally written to disk.
//!
//! * [`GraphContactPoints`] – every tile with two or more members contributes its member pairs.
//! * [`GraphHottestPoints`] – only the hot-zone tiles (those with the maximum member count).
//! * [`graph_from_events`] – same fold over [`ContactEvent`]s from the exhaustive scan.
//! * [`graph_from_scan`] – runs the exhaustive scan lazily and folds it as it goes.
//!
//! ## Determinism
//! -----------------
//! Candidate pairs are extracted tile by tile, on the rayon pool when `params.parallel` is set.
//! They are then folded into the graph **sequentially**, tiles by ascending [`TileKey`] and pairs
//! in member order, so increment and keep-smaller rules always see the same sequence.
//!
//! ## Memory
//! -----------------
//! Extraction works on [`TILE_BATCH`] tiles at a time and each batch is folded before the next
//! one is extracted. Contact log rows go straight to the CSV file, so only the graph grows with
//! the input.
//!
//! ## No contacts
//! -----------------
//! An empty index, an index of singleton tiles, or any input yielding a graph with no edge is not
//! an error: the pass returns a [`GraphOutcome`] with `graph_generated == false` and
//! `output_path` pointing at the sentinel `no_tiles_from_data.png` of the layout. Nothing is
//! written in that case.
//!
//! ## Example
//!
//! ```rust
//! use colocate::{
//!     graph::GraphContactPoints,
//!     params::ContactParams,
//!     samples::{Segment, TrajectorySample},
//!     tiles::TileIndex,
//!     trajectories::TrajectoryStore,
//! };
//!
//! let mut store = TrajectoryStore::new();
//! for entity in ["000", "001"] {
//!     let sample = TrajectorySample::new(39.9, 116.4, 0.0, 1000.0);
//!     store.insert_segment(entity, Segment::new("a", vec![sample]));
//! }
//! let params = ContactParams::default();
//! let index = TileIndex::build(&store, &params);
//! let outcome = GraphContactPoints::new(&index, &params).run().unwrap();
//! assert!(outcome.graph_generated);
//! assert_eq!(outcome.graph.edge("000", "001").unwrap().weight, 1.0);
//! ```
use std::borrow::Borrow;

use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use rayon::prelude::*;
use tracing::info;

use crate::{
    colocate_errors::ColocateError,
    constants::TILE_BATCH,
    contacts::{all_pair_contacts, ContactEvent, TileContact},
    graph::{progress::TileProgress, ContactGraph, ContactGraphBuilder},
    output::{write_gml_file, ContactLogSink, ContactRecord, OutputLayout},
    params::ContactParams,
    tiles::{TileIndex, TileKey, TileMember},
    trajectories::SampleSource,
};

/// Result of a graph pass.
///
/// A pass only sees tiles that were built. A tile key read back from text that turns out to
/// be malformed ([`TileKey::from_hash`] returning `None`) never reaches a pass: the caller
/// holding such keys should treat them as "no tiles" and report [`GraphOutcome::sentinel`].
#[derive(Debug, Clone)]
pub struct GraphOutcome {
    pub graph: ContactGraph,
    /// `false` when the graph has no edge.
    pub graph_generated: bool,
    /// The graph file (written only when a layout was given), or the sentinel path.
    pub output_path: Utf8PathBuf,
    /// Number of contacts folded into the graph.
    pub contact_count: usize,
    /// The contact log, when one was written.
    pub contact_log: Option<Utf8PathBuf>,
}

impl GraphOutcome {
    /// The "no contacts" result.
    pub fn sentinel(layout: &OutputLayout, contact_count: usize) -> Self {
        GraphOutcome {
            graph: ContactGraph::new(),
            graph_generated: false,
            output_path: layout.sentinel_path(),
            contact_count,
            contact_log: None,
        }
    }
}

/// Graph over every occupied tile of an index.
#[derive(Debug, Clone)]
pub struct GraphContactPoints<'a> {
    index: &'a TileIndex,
    params: ContactParams,
    builder: ContactGraphBuilder,
    layout: Option<OutputLayout>,
}

impl<'a> GraphContactPoints<'a> {
    /// Pass over `index`, weighting edges with `params.weighting`.
    pub fn new(index: &'a TileIndex, params: &ContactParams) -> Self {
        GraphContactPoints {
            index,
            params: *params,
            builder: ContactGraphBuilder::with_policy(params.weighting),
            layout: None,
        }
    }

    /// Write the graph and the contact log under `layout` when the pass produces edges.
    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Run the pass.
    ///
    /// Return
    /// ----------
    /// * The outcome; `Err` only when writing an output file fails.
    pub fn run(&self) -> Result<GraphOutcome, ColocateError> {
        let path = self.layout.clone().unwrap_or_default().graph_path(
            self.index.ds(),
            self.index.dt(),
            self.builder.policy(),
        );
        fold_tiles(
            self.index.occupied_tiles(),
            &self.builder,
            self.params.parallel,
            self.layout.as_ref(),
            path,
        )
    }
}

/// Graph over the hot-zone tiles of an index only.
#[derive(Debug, Clone)]
pub struct GraphHottestPoints<'a> {
    index: &'a TileIndex,
    params: ContactParams,
    builder: ContactGraphBuilder,
    layout: Option<OutputLayout>,
}

impl<'a> GraphHottestPoints<'a> {
    pub fn new(index: &'a TileIndex, params: &ContactParams) -> Self {
        GraphHottestPoints {
            index,
            params: *params,
            builder: ContactGraphBuilder::with_policy(params.weighting),
            layout: None,
        }
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Run the pass. A hot zone of a single member yields no pair, hence the sentinel.
    pub fn run(&self) -> Result<GraphOutcome, ColocateError> {
        let path = self
            .layout
            .clone()
            .unwrap_or_default()
            .hot_zones_path(self.index.ds(), self.index.dt());
        info!(
            hot_zone_count = self.index.hot_zone_count(),
            "graphing hot zones"
        );
        fold_tiles(
            self.index.hot_zones(),
            &self.builder,
            self.params.parallel,
            self.layout.as_ref(),
            path,
        )
    }
}

fn tile_pairs<'t>(key: &'t TileKey, members: &'t [TileMember]) -> Vec<TileContact<'t>> {
    members
        .iter()
        .tuple_combinations()
        .map(|(a, b)| TileContact { key, a, b })
        .collect()
}

fn log_sink(layout: Option<&OutputLayout>, path: &Utf8Path) -> ContactLogSink {
    match layout {
        Some(_) => ContactLogSink::to_file(OutputLayout::contact_log_path(path)),
        None => ContactLogSink::counting(),
    }
}

/// Extract pairs [`TILE_BATCH`] tiles at a time (in parallel when asked), then fold each batch
/// in tile order before extracting the next one.
fn fold_tiles(
    tiles: Vec<(&TileKey, &[TileMember])>,
    builder: &ContactGraphBuilder,
    parallel: bool,
    layout: Option<&OutputLayout>,
    path: Utf8PathBuf,
) -> Result<GraphOutcome, ColocateError> {
    let mut graph = ContactGraph::new();
    let mut sink = log_sink(layout, &path);
    let mut progress = TileProgress::new(tiles.len());

    for batch in tiles.chunks(TILE_BATCH) {
        let per_tile: Vec<Vec<TileContact<'_>>> = if parallel {
            batch.par_iter().map(|&(k, m)| tile_pairs(k, m)).collect()
        } else {
            batch.iter().map(|&(k, m)| tile_pairs(k, m)).collect()
        };
        for pairs in per_tile {
            for contact in pairs {
                builder.update(&mut graph, contact.a, contact.b);
                sink.push(&ContactRecord::from_tile_contact(&contact))?;
            }
            progress.tick();
        }
    }
    progress.finish();

    info!(
        tiles = tiles.len(),
        contacts = sink.count(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        policy = %builder.policy(),
        "contact graph built"
    );
    finish(graph, sink, layout, path)
}

/// Fold exhaustive-scan events into a graph.
///
/// Arguments
/// -----------------
/// * `events`: contacts (owned or borrowed), folded in iteration order.
/// * `builder`: the weighting policy.
/// * `params`: `ds` and `dt` of the run (`dt` feeds distance weighting).
/// * `layout`: when given, the graph is written to `layout.graph_path(..)` with its contact log.
///
/// See also
/// ------------
/// * [`graph_from_scan`] – the same fold, fed straight from the lazy all-pairs scan.
pub fn graph_from_events<I>(
    events: I,
    builder: &ContactGraphBuilder,
    params: &ContactParams,
    layout: Option<&OutputLayout>,
) -> Result<GraphOutcome, ColocateError>
where
    I: IntoIterator,
    I::Item: Borrow<ContactEvent>,
{
    fold_events(
        events.into_iter().map(Ok::<_, ColocateError>),
        builder,
        params,
        layout,
    )
}

/// Run the exhaustive scan over every entity pair of `source` and fold it into a graph.
///
/// Events are consumed as the scan produces them; neither the events nor the contact log rows
/// are collected. The first pair failing the early-exit precondition aborts the pass.
pub fn graph_from_scan<S: SampleSource + ?Sized>(
    source: &S,
    builder: &ContactGraphBuilder,
    params: &ContactParams,
    layout: Option<&OutputLayout>,
) -> Result<GraphOutcome, ColocateError> {
    fold_events(all_pair_contacts(source, params), builder, params, layout)
}

fn fold_events<E, I>(
    events: I,
    builder: &ContactGraphBuilder,
    params: &ContactParams,
    layout: Option<&OutputLayout>,
) -> Result<GraphOutcome, ColocateError>
where
    E: Borrow<ContactEvent>,
    I: Iterator<Item = Result<E, ColocateError>>,
{
    let path = layout
        .cloned()
        .unwrap_or_default()
        .graph_path(params.ds, params.dt, builder.policy());
    let mut graph = ContactGraph::new();
    let mut sink = log_sink(layout, &path);
    for event in events {
        let event = event?;
        let event: &ContactEvent = event.borrow();
        builder.update_event(&mut graph, event, params.dt);
        sink.push(&ContactRecord::from_event(event, params.ds, params.dt))?;
    }
    info!(
        contacts = sink.count(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        policy = %builder.policy(),
        "contact graph built from events"
    );
    finish(graph, sink, layout, path)
}

fn finish(
    graph: ContactGraph,
    sink: ContactLogSink,
    layout: Option<&OutputLayout>,
    path: Utf8PathBuf,
) -> Result<GraphOutcome, ColocateError> {
    let contact_count = sink.count();
    if graph.edge_count() == 0 {
        sink.discard()?;
        let layout = layout.cloned().unwrap_or_default();
        info!(path = %layout.sentinel_path(), "no contacts, no graph generated");
        return Ok(GraphOutcome::sentinel(&layout, contact_count));
    }
    let contact_log = sink.finish()?;
    if layout.is_some() {
        write_gml_file(&path, &graph)?;
        info!(graph = %path, log = ?contact_log, "outputs written");
    }
    Ok(GraphOutcome {
        graph,
        graph_generated: true,
        output_path: path,
        contact_count,
        contact_log,
    })
}
