//! Backward best-first bound propagation.
//!
//! One query augments the graph with a virtual source `s` (connected to every
//! start node) and a virtual sink `t` (fed by every end node), then relaxes
//! backward from `t` along incoming edges so each node's bounds estimate the
//! cost/reward of reaching `t`. Whenever a relaxation improves `s`, the
//! corresponding successor chain is reconstructed into a complete path and
//! submitted to the skyline. The loop is anytime: on timeout the skyline
//! built so far is the result.

use std::time::{Duration, Instant};

use skypath_graph::{EdgeId, GraphError, GraphStore, NodeId, Reachability, SelectorError};

use crate::bounds::{BoundTable, Objective, SuccessorTable};
use crate::config::SearchConfig;
use crate::frontier::Frontier;
use crate::report::{render_path, ReportedPath};
use crate::rewards::RewardTable;
use crate::skyline::{PathKey, Skyline};

/// Label given to the virtual source/sink for the duration of one query.
pub const VIRTUAL_LABEL: &str = "Virtual";
/// Relationship type of the temporary boundary edges.
pub const TEMP_EDGE_TYPE: &str = "Temp";

/// Parameters of one preference-path query.
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub start_selector: String,
    pub end_selector: String,
    /// Ordered: earlier selectors earn higher rewards.
    pub preference_selectors: Vec<String>,
    pub exclude_selectors: Vec<String>,
}

/// How the relaxation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Frontier exhausted; the skyline is complete for this graph.
    Converged,
    /// Wall-clock budget hit; the skyline is a best-effort partial frontier.
    TimedOut,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub expanded_nodes: usize,
    pub submitted_paths: usize,
    pub elapsed_millis: u128,
}

/// Result of one query: outcome, rendered skyline, counters.
#[derive(Debug, Clone)]
pub struct QueryReport {
    pub outcome: Outcome,
    pub paths: Vec<ReportedPath>,
    pub stats: SearchStats,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Run one preference-path query against the store.
///
/// `reach` is consulted only when `config.use_reachability_prefilter` is set;
/// it drops start/end nodes that cannot possibly pair up before the search.
pub fn preference_path_query(
    store: &GraphStore,
    params: &QueryParams,
    config: &SearchConfig,
    reach: Option<&dyn Reachability>,
) -> Result<QueryReport, QueryError> {
    let mut start_nodes = store.resolve_node_ids(&params.start_selector)?;
    let mut end_nodes = store.resolve_node_ids(&params.end_selector)?;

    let preferences = params
        .preference_selectors
        .iter()
        .map(|sel| store.resolve_tokens(sel))
        .collect::<Result<Vec<_>, _>>()?;
    let excludes = params
        .exclude_selectors
        .iter()
        .map(|sel| store.resolve_tokens(sel))
        .collect::<Result<Vec<_>, _>>()?;
    let rewards = RewardTable::build(&preferences, &excludes, config.exclusion_penalty);

    if config.use_reachability_prefilter {
        match reach {
            Some(oracle) => prefilter(&mut start_nodes, &mut end_nodes, oracle),
            None => tracing::warn!("reachability prefilter enabled but no oracle supplied"),
        }
    }

    let mut scope = store.temp_scope();
    let source = scope.create_node(VIRTUAL_LABEL);
    for &n in &start_nodes {
        scope.create_edge(source, n, TEMP_EDGE_TYPE)?;
    }
    let sink = scope.create_node(VIRTUAL_LABEL);
    for &n in &end_nodes {
        scope.create_edge(n, sink, TEMP_EDGE_TYPE)?;
    }

    let search = run_relaxation(store, &rewards, config, source, sink);

    let mut paths = Vec::with_capacity(search.skyline_paths.len());
    for path in &search.skyline_paths {
        let stripped = strip_boundary_edges(path);
        paths.push(render_path(store, &rewards, &stripped));
    }

    scope.retract();

    tracing::info!(
        outcome = ?search.outcome,
        skyline = paths.len(),
        expanded = search.stats.expanded_nodes,
        elapsed_ms = search.stats.elapsed_millis,
        "preference path query finished"
    );

    Ok(QueryReport {
        outcome: search.outcome,
        paths,
        stats: search.stats,
    })
}

/// Drop start nodes that reach no end node, then end nodes no surviving start
/// node reaches.
fn prefilter(starts: &mut Vec<NodeId>, ends: &mut Vec<NodeId>, oracle: &dyn Reachability) {
    let end_snapshot = ends.clone();
    starts.retain(|&s| end_snapshot.iter().any(|&e| oracle.can_reach(s, e)));
    let start_snapshot = starts.clone();
    ends.retain(|&e| start_snapshot.iter().any(|&s| oracle.can_reach(s, e)));
}

struct SearchOutput {
    outcome: Outcome,
    skyline_paths: Vec<PathKey>,
    stats: SearchStats,
}

fn run_relaxation(
    store: &GraphStore,
    rewards: &RewardTable,
    config: &SearchConfig,
    source: NodeId,
    sink: NodeId,
) -> SearchOutput {
    let mut bounds = BoundTable::new(sink, config);
    let mut successors = SuccessorTable::new();
    let mut skyline = Skyline::new();
    let mut frontier = Frontier::new(config.selection_policy);
    frontier.push(sink, 0);

    let deadline = Duration::from_millis(config.timeout_millis);
    let started = Instant::now();
    let mut stats = SearchStats::default();
    let mut outcome = Outcome::Converged;

    while !frontier.is_empty() {
        if started.elapsed() >= deadline {
            outcome = Outcome::TimedOut;
            break;
        }
        let Some(n) = frontier.pop(&mut bounds) else {
            break;
        };

        // Subpaths that cannot extend into a non-dominated complete path are
        // not worth expanding.
        if node_dominated(n, store, &skyline, &mut bounds) {
            continue;
        }
        stats.expanded_nodes += 1;

        for (edge, m) in store.incoming_edges(n) {
            let costs = rewards.edge_cost(store, edge, m);
            let mut source_reward_improved = false;
            let mut source_cost_improved = false;

            let candidate_reward = bounds.upper_reward(n) + costs.reward;
            if candidate_reward > bounds.upper_reward(m)
                && reward_chain_within_hops(store, &successors, n, config.max_hops)
            {
                bounds.set_upper_reward(m, candidate_reward);
                successors.set(m, Objective::Reward, edge);
                if m == source {
                    source_reward_improved = true;
                } else {
                    frontier.push(m, bounds.lower_cost(m));
                }
            }

            let candidate_cost = bounds.lower_cost(n) + costs.length;
            if candidate_cost < bounds.lower_cost(m) {
                bounds.set_lower_cost(m, candidate_cost);
                successors.set(m, Objective::Cost, edge);
                if m == source {
                    source_cost_improved = true;
                } else {
                    frontier.push(m, candidate_cost);
                }
            }

            if source_cost_improved {
                let path = reconstruct_path(store, &successors, source, sink, Objective::Cost);
                stats.submitted_paths += 1;
                skyline.submit(store, rewards, path);
            }
            if source_reward_improved {
                let path = reconstruct_path(store, &successors, source, sink, Objective::Reward);
                stats.submitted_paths += 1;
                skyline.submit(store, rewards, path);
            }
        }
    }

    stats.elapsed_millis = started.elapsed().as_millis();
    SearchOutput {
        outcome,
        skyline_paths: skyline.into_paths(),
        stats,
    }
}

/// Node dominance prune against the endpoint-adjacent bounds of skyline
/// members: the member's first real node (target of its first edge) carries
/// the bounds the subpath would have to beat.
fn node_dominated(
    n: NodeId,
    store: &GraphStore,
    skyline: &Skyline,
    bounds: &mut BoundTable,
) -> bool {
    if skyline.is_empty() {
        return false;
    }
    let n_lower = bounds.lower_cost(n);
    let n_upper = bounds.upper_reward(n);

    let anchors: Vec<NodeId> = skyline
        .members()
        .filter_map(|path| path.first().and_then(|&edge| store.edge_target(edge)))
        .collect();

    for anchor in anchors {
        let a_lower = bounds.lower_cost(anchor);
        let a_upper = bounds.upper_reward(anchor);
        if n_lower > a_lower && n_upper <= a_upper {
            return true;
        }
        if n_upper < a_upper && n_lower >= a_lower {
            return true;
        }
    }
    false
}

/// Walk the best-reward successor chain from `n`, counting hops; a chain
/// already at the cap must not grow further.
fn reward_chain_within_hops(
    store: &GraphStore,
    successors: &SuccessorTable,
    n: NodeId,
    max_hops: usize,
) -> bool {
    let mut count = 1;
    let mut current = n;
    while let Some(edge) = successors.get(current)[Objective::Reward.index()] {
        let Some(next) = store.edge_target(edge) else {
            break;
        };
        current = next;
        count += 1;
        if count > max_hops {
            break;
        }
    }
    count <= max_hops
}

/// Follow the successor chain for one objective from the virtual source.
///
/// A cycle or a missing edge aborts reconstruction; the partial path is
/// returned as-is and left to the skyline's dominance tests. Never panics.
fn reconstruct_path(
    store: &GraphStore,
    successors: &SuccessorTable,
    source: NodeId,
    sink: NodeId,
    objective: Objective,
) -> PathKey {
    let mut path = Vec::new();
    let mut visited = ahash::AHashSet::new();
    let mut current = source;
    while current != sink {
        let Some(edge) = successors.get(current)[objective.index()] else {
            break;
        };
        if !visited.insert(edge) {
            tracing::warn!(
                node = current.raw(),
                edge = edge.raw(),
                "successor chain cycle during path reconstruction"
            );
            break;
        }
        path.push(edge);
        let Some(next) = store.edge_target(edge) else {
            tracing::warn!(edge = edge.raw(), "successor chain hit a missing edge");
            break;
        };
        current = next;
    }
    path
}

/// Remove the two synthetic boundary edges. Malformed (too short) paths
/// collapse to empty rather than panicking.
fn strip_boundary_edges(path: &[EdgeId]) -> PathKey {
    if path.len() >= 2 {
        path[1..path.len() - 1].to_vec()
    } else {
        Vec::new()
    }
}
