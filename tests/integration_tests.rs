//! Workspace integration tests: snapshot loading through query execution.

use skypath_engine::{preference_path_query, Outcome, QueryParams, SearchConfig, SelectionPolicy};
use skypath_graph::{GraphSnapshot, GraphStore, ReachabilityIndex};

/// Small transport network: two cities connected by rail (via a junction),
/// road (direct), and ferry (via an island).
const TRANSPORT: &str = r#"{
    "nodes": [
        {"id": 0, "label": "City"},
        {"id": 1, "label": "Junction"},
        {"id": 2, "label": "Harbor"},
        {"id": 3, "label": "Island"},
        {"id": 4, "label": "City"}
    ],
    "edges": [
        {"source": 0, "target": 1, "type": "RAIL"},
        {"source": 1, "target": 4, "type": "RAIL"},
        {"source": 0, "target": 4, "type": "ROAD"},
        {"source": 0, "target": 2, "type": "ROAD"},
        {"source": 2, "target": 3, "type": "FERRY"},
        {"source": 3, "target": 4, "type": "FERRY"}
    ]
}"#;

fn transport_store() -> GraphStore {
    let snapshot: GraphSnapshot = serde_json::from_str(TRANSPORT).unwrap();
    GraphStore::from_snapshot(&snapshot).unwrap()
}

fn city_to_city(prefer: Vec<String>, exclude: Vec<String>) -> QueryParams {
    QueryParams {
        start_selector: "nodes(id in (0))".to_string(),
        end_selector: "nodes(id in (4))".to_string(),
        preference_selectors: prefer,
        exclude_selectors: exclude,
    }
}

#[test]
fn unpreferred_query_finds_the_short_road() {
    let store = transport_store();
    let params = city_to_city(vec![], vec![]);
    let report =
        preference_path_query(&store, &params, &SearchConfig::default(), None).unwrap();

    assert_eq!(report.outcome, Outcome::Converged);
    assert_eq!(report.paths.len(), 1);
    assert_eq!(report.paths[0].hops, 1);
    assert!(report.paths[0].rendered.contains("ROAD"));
}

#[test]
fn rail_preference_adds_an_incomparable_member() {
    let store = transport_store();
    let params = city_to_city(vec!["type(RAIL)".to_string()], vec![]);
    let report =
        preference_path_query(&store, &params, &SearchConfig::default(), None).unwrap();

    // Direct road (1 hop, reward 0) and rail via the junction (2 hops,
    // reward 2) are mutually non-dominated.
    assert_eq!(report.outcome, Outcome::Converged);
    assert_eq!(report.paths.len(), 2);
    let rail = report
        .paths
        .iter()
        .find(|p| p.rendered.contains("RAIL"))
        .unwrap();
    assert_eq!(rail.reward, 2);
    assert_eq!(rail.hops, 2);
}

#[test]
fn excluding_road_reroutes_over_rail() {
    let store = transport_store();
    let params = city_to_city(vec![], vec!["type(ROAD)".to_string()]);
    let report =
        preference_path_query(&store, &params, &SearchConfig::default(), None).unwrap();

    assert!(!report.paths.is_empty());
    for path in &report.paths {
        assert!(!path.rendered.contains("ROAD"), "{}", path.rendered);
    }
}

#[test]
fn consecutive_queries_leave_the_store_untouched() {
    let store = transport_store();
    let nodes = store.node_count();
    let edges = store.edge_count();

    let queries = [
        city_to_city(vec!["type(RAIL)".to_string()], vec![]),
        city_to_city(vec![], vec!["type(ROAD)".to_string()]),
        city_to_city(vec!["type(FERRY)".to_string()], vec!["type(RAIL)".to_string()]),
    ];
    for params in &queries {
        preference_path_query(&store, params, &SearchConfig::default(), None).unwrap();
        assert_eq!(store.node_count(), nodes);
        assert_eq!(store.edge_count(), edges);
    }
}

#[test]
fn policies_agree_end_to_end() {
    let store = transport_store();
    let params = city_to_city(vec!["type(FERRY)".to_string()], vec![]);

    let pq = preference_path_query(&store, &params, &SearchConfig::default(), None).unwrap();
    let scan_config = SearchConfig {
        selection_policy: SelectionPolicy::LinearScan,
        ..SearchConfig::default()
    };
    let scan = preference_path_query(&store, &params, &scan_config, None).unwrap();

    let mut a: Vec<_> = pq.paths.iter().map(|p| (p.rendered.clone(), p.reward)).collect();
    let mut b: Vec<_> = scan.paths.iter().map(|p| (p.rendered.clone(), p.reward)).collect();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn snapshot_round_trips_through_a_file() {
    let snapshot: GraphSnapshot = serde_json::from_str(TRANSPORT).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transport.json");
    std::fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let reloaded: GraphSnapshot = serde_json::from_str(&text).unwrap();
    let store = GraphStore::from_snapshot(&reloaded).unwrap();

    assert_eq!(store.node_count(), 5);
    assert_eq!(store.edge_count(), 6);

    let params = city_to_city(vec![], vec![]);
    let report =
        preference_path_query(&store, &params, &SearchConfig::default(), None).unwrap();
    assert_eq!(report.paths.len(), 1);
}

#[test]
fn label_selectors_and_prefilter_work_from_snapshot() {
    let store = transport_store();
    let reach = ReachabilityIndex::build(&store);
    let params = QueryParams {
        start_selector: "nodes(label = City)".to_string(),
        end_selector: "nodes(label = Island)".to_string(),
        preference_selectors: vec![],
        exclude_selectors: vec![],
    };
    let config = SearchConfig {
        use_reachability_prefilter: true,
        ..SearchConfig::default()
    };
    let report = preference_path_query(&store, &params, &config, Some(&reach)).unwrap();

    assert_eq!(report.outcome, Outcome::Converged);
    assert!(!report.paths.is_empty());
    for path in &report.paths {
        assert!(path.rendered.contains("Island"), "{}", path.rendered);
    }
}
