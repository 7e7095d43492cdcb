//! # Contact graph
//!
//! Undirected, weighted graph whose nodes are entity ids and whose edges carry the outcome of the
//! weighting policy between two entities. Backed by a [`petgraph`] `UnGraph` plus an
//! entity → node index map so that lookups by id stay `O(1)`.
//!
//! Node and edge iteration follow insertion order, which the graph passes keep deterministic.
use std::{collections::HashMap, fmt};

use ahash::RandomState;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};
use petgraph::{
    graph::{NodeIndex, UnGraph},
    unionfind::UnionFind,
    visit::EdgeRef,
};

use crate::constants::{EntityId, Meter, Second};

/// Attributes stored on every edge.
///
/// `distance` and `time_delta` describe the contact the current `weight` came from (under
/// count weighting, the most recent contact).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAttrs {
    pub weight: f64,
    pub distance: Meter,
    pub time_delta: Second,
}

#[derive(Debug, Clone, Default)]
pub struct ContactGraph {
    graph: UnGraph<EntityId, EdgeAttrs>,
    nodes: HashMap<EntityId, NodeIndex, RandomState>,
}

impl ContactGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node of `entity`, added if missing.
    pub fn ensure_node(&mut self, entity: &str) -> NodeIndex {
        if let Some(&ix) = self.nodes.get(entity) {
            return ix;
        }
        let ix = self.graph.add_node(entity.to_string());
        self.nodes.insert(entity.to_string(), ix);
        ix
    }

    pub fn contains_node(&self, entity: &str) -> bool {
        self.nodes.contains_key(entity)
    }

    /// Attributes of the edge between `a` and `b` (either order).
    pub fn edge(&self, a: &str, b: &str) -> Option<&EdgeAttrs> {
        let e = self.graph.find_edge(*self.nodes.get(a)?, *self.nodes.get(b)?)?;
        self.graph.edge_weight(e)
    }

    pub(crate) fn edge_mut(&mut self, a: &str, b: &str) -> Option<&mut EdgeAttrs> {
        let e = self.graph.find_edge(*self.nodes.get(a)?, *self.nodes.get(b)?)?;
        self.graph.edge_weight_mut(e)
    }

    /// Insert the edge `a – b`, adding missing nodes, or overwrite its attributes.
    pub fn set_edge(&mut self, a: &str, b: &str, attrs: EdgeAttrs) {
        let (ia, ib) = (self.ensure_node(a), self.ensure_node(b));
        self.graph.update_edge(ia, ib, attrs);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Entity ids, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// `(a, b, attrs)` for every edge, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &EdgeAttrs)> + '_ {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
                e.weight(),
            )
        })
    }

    /// Position of every node in [`ContactGraph::nodes`] order, by index.
    pub(crate) fn edge_endpoints(&self) -> impl Iterator<Item = (usize, usize, &EdgeAttrs)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight()))
    }

    /// Mean node degree `2·E / N`.
    ///
    /// Return
    /// ----------
    /// * `f64::NAN` when the graph has no node: the average is undefined there.
    pub fn average_degree(&self) -> f64 {
        let n = self.node_count();
        if n == 0 {
            return f64::NAN;
        }
        2.0 * self.edge_count() as f64 / n as f64
    }

    /// Number of nodes of the largest connected component, `0` on an empty graph.
    pub fn largest_component_size(&self) -> usize {
        let n = self.node_count();
        if n == 0 {
            return 0;
        }
        let mut uf = UnionFind::<usize>::new(n);
        for e in self.graph.edge_references() {
            uf.union(e.source().index(), e.target().index());
        }
        let mut sizes: HashMap<usize, usize, RandomState> = HashMap::default();
        for label in uf.into_labeling() {
            *sizes.entry(label).or_default() += 1;
        }
        sizes.into_values().max().unwrap_or(0)
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> f64 {
        self.graph.edge_weights().map(|e| e.weight).sum()
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            average_degree: self.average_degree(),
            largest_component: self.largest_component_size(),
            total_weight: self.total_weight(),
        }
    }

    /// Underlying petgraph graph.
    pub fn inner(&self) -> &UnGraph<EntityId, EdgeAttrs> {
        &self.graph
    }
}

/// Size and connectivity figures of a [`ContactGraph`].
///
/// Display
/// -----------------
/// * `format!("{}", s)` – one line: `nodes=3 edges=2 avg_degree=1.333 largest_component=3`
/// * `format!("{:#}", s)` – a `comfy-table` table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub average_degree: f64,
    pub largest_component: usize,
    pub total_weight: f64,
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return write!(
                f,
                "nodes={} edges={} avg_degree={:.3} largest_component={}",
                self.nodes, self.edges, self.average_degree, self.largest_component
            );
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![Cell::new("Metric"), Cell::new("Value")]);

        let avg = if self.average_degree.is_nan() {
            "undefined".to_string()
        } else {
            format!("{:.3}", self.average_degree)
        };
        for (name, value) in [
            ("nodes", self.nodes.to_string()),
            ("edges", self.edges.to_string()),
            ("average degree", avg),
            ("largest component", self.largest_component.to_string()),
            ("total weight", format!("{:.3}", self.total_weight)),
        ] {
            table.add_row(Row::from(vec![
                Cell::new(name),
                Cell::new(value).set_alignment(CellAlignment::Right),
            ]));
        }
        write!(f, "{table}")
    }
}

#[cfg(test)]
mod contact_graph_test {
    use super::*;

    fn attrs(weight: f64) -> EdgeAttrs {
        EdgeAttrs {
            weight,
            distance: 0.0,
            time_delta: 0.0,
        }
    }

    #[test]
    fn test_empty_graph() {
        let g = ContactGraph::new();
        assert_eq!(g.node_count(), 0);
        assert!(g.average_degree().is_nan());
        assert_eq!(g.largest_component_size(), 0);
        let s = g.summary();
        assert!(format!("{s:#}").contains("undefined"));
    }

    #[test]
    fn test_edges_are_undirected() {
        let mut g = ContactGraph::new();
        g.set_edge("000", "001", attrs(1.0));
        assert_eq!(g.edge("001", "000"), Some(&attrs(1.0)));
        g.set_edge("001", "000", attrs(2.0));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge("000", "001").unwrap().weight, 2.0);
        assert_eq!(g.edge("000", "002"), None);
    }

    #[test]
    fn test_degree_and_components() {
        let mut g = ContactGraph::new();
        g.set_edge("000", "001", attrs(1.0));
        g.set_edge("001", "002", attrs(1.0));
        g.set_edge("010", "011", attrs(1.0));
        g.ensure_node("020");

        assert_eq!(g.node_count(), 6);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.average_degree(), 1.0);
        assert_eq!(g.largest_component_size(), 3);
        assert_eq!(
            g.nodes().collect::<Vec<_>>(),
            vec!["000", "001", "002", "010", "011", "020"]
        );

        let s = g.summary();
        assert_eq!(
            s.to_string(),
            "nodes=6 edges=3 avg_degree=1.000 largest_component=3"
        );
        assert_eq!(s.total_weight, 3.0);
    }
}
