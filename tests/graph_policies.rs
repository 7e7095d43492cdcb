mod common;

use approx::assert_relative_eq;
use colocate::{
    colocate_errors::ColocateError,
    contacts::all_pair_events,
    graph::{
        graph_from_events, ContactGraph, ContactGraphBuilder, GraphContactPoints,
        GraphHottestPoints, WeightingPolicy,
    },
    params::ContactParams,
    samples::TrajectorySample,
    tiles::{TileIndex, TileMember},
};
use common::{store_from_points, walking_crowd};

fn member(entity: &str, lat: f64, lon: f64, t: f64) -> TileMember {
    TileMember::from_sample(entity, &TrajectorySample::new(lat, lon, 0.0, t), 100.0, 300.0)
}

#[test]
fn test_builder_rejects_unknown_policy() {
    let err = ContactGraphBuilder::new("closest_weight").unwrap_err();
    assert!(matches!(err, ColocateError::InvalidConfiguration(_)));
}

#[test]
fn test_count_weight_side_attributes_are_last_seen() {
    let builder = ContactGraphBuilder::new("count_weight").unwrap();
    let mut graph = ContactGraph::new();

    let far = (member("000", 39.9, 116.4, 0.0), member("001", 39.9005, 116.4, 10.0));
    let near = (member("000", 39.9, 116.4, 0.0), member("001", 39.9, 116.4, 250.0));

    builder.update(&mut graph, &far.0, &far.1);
    builder.update(&mut graph, &near.0, &near.1);

    let edge = graph.edge("000", "001").unwrap();
    assert_eq!(edge.weight, 2.0);
    // last contact wins, not the closest one
    assert_eq!(edge.distance, 0.0);
    assert_eq!(edge.time_delta, 250.0);
}

#[test]
fn test_distance_weight_keeps_smaller_weight_in_either_order() {
    let builder = ContactGraphBuilder::new("distance_weight").unwrap();
    let close = (member("000", 39.9, 116.4, 0.0), member("001", 39.9001, 116.4, 0.0));
    let far = (member("000", 39.9, 116.4, 0.0), member("001", 39.9008, 116.4, 0.0));
    let w_far = 300.0 - far.0.distance_to(&far.1);

    for order in [[&close, &far], [&far, &close]] {
        let mut graph = ContactGraph::new();
        for (a, b) in order {
            builder.update(&mut graph, a, b);
        }
        assert_relative_eq!(graph.edge("000", "001").unwrap().weight, w_far, epsilon = 1e-9);
    }
}

#[test]
fn test_policy_switch() {
    let builder = ContactGraphBuilder::new("count_weight")
        .unwrap()
        .apply_weighting_policy(WeightingPolicy::DistanceWeight);
    assert_eq!(builder.policy(), WeightingPolicy::DistanceWeight);
}

#[test]
fn test_empty_tile_set_gives_sentinel() {
    let store = store_from_points(&[]);
    let params = ContactParams::default();
    let index = TileIndex::build(&store, &params);
    assert!(index.is_empty());

    for outcome in [
        GraphContactPoints::new(&index, &params).run().unwrap(),
        GraphHottestPoints::new(&index, &params).run().unwrap(),
    ] {
        assert!(!outcome.graph_generated);
        assert_eq!(outcome.output_path, "app/data/graphs/no_tiles_from_data.png");
    }
}

#[test]
fn test_graph_statistics() {
    let store = store_from_points(&[
        ("000", 39.9, 116.4, 1000.0),
        ("001", 39.9, 116.4, 1000.0),
        ("002", 39.9, 116.4, 1000.0),
        ("010", 40.2, 116.4, 1000.0),
        ("011", 40.2, 116.4, 1000.0),
    ]);
    let params = ContactParams::default();
    let index = TileIndex::build(&store, &params);
    let outcome = GraphContactPoints::new(&index, &params).run().unwrap();

    let summary = outcome.graph.summary();
    assert_eq!(summary.nodes, 5);
    assert_eq!(summary.edges, 4);
    assert_relative_eq!(summary.average_degree, 1.6);
    assert_eq!(summary.largest_component, 3);
    assert!(format!("{summary:#}").contains("largest component"));
}

#[test]
fn test_tiled_and_exhaustive_graphs_share_edges_on_colocated_walk() {
    // entities walking together: every tile shared, every sample within thresholds
    let store = walking_crowd(3, 30, 10, 0.0, 60.0);
    let params = ContactParams::default();

    let tiled = GraphContactPoints::new(&TileIndex::build(&store, &params), &params)
        .run()
        .unwrap();

    let events = all_pair_events(&store, &params).unwrap();
    let exhaustive = graph_from_events(
        &events,
        &ContactGraphBuilder::with_policy(params.weighting),
        &params,
        None,
    )
    .unwrap();

    let edges = |g: &ContactGraph| {
        let mut e: Vec<(String, String)> = g
            .edges()
            .map(|(a, b, _)| (a.to_string(), b.to_string()))
            .collect();
        e.sort();
        e
    };
    assert_eq!(edges(&tiled.graph), edges(&exhaustive.graph));
    assert_eq!(tiled.graph.edge_count(), 3);
}
