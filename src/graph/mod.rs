//! # Contact graphs
//!
//! Turns contacts into an undirected weighted graph of entities.
//!
//! Modules
//! -----------------
//! * [`weighting`](crate::graph::weighting) – [`WeightingPolicy`], the closed set of weighting rules.
//! * [`builder`](crate::graph::builder) – [`ContactGraphBuilder`], the per-contact update rules.
//! * [`contact_graph`](crate::graph::contact_graph) – [`ContactGraph`] and its statistics.
//! * [`passes`](crate::graph::passes) – whole-index passes and the [`GraphOutcome`] contract.
pub mod builder;
pub mod contact_graph;
pub mod passes;
mod progress;
pub mod weighting;

pub use builder::ContactGraphBuilder;
pub use contact_graph::{ContactGraph, EdgeAttrs, GraphSummary};
pub use passes::{
    graph_from_events, graph_from_scan, GraphContactPoints, GraphHottestPoints, GraphOutcome,
};
pub use weighting::WeightingPolicy;
