//! Skyline path rendering.

use skypath_graph::{EdgeId, GraphStore, NodeId};

use crate::rewards::RewardTable;

/// One skyline path prepared for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedPath {
    /// `(id Label)--[TYPE]-->(id Label)` chain, or `"empty path"`.
    pub rendered: String,
    pub reward: i64,
    pub total_nodes: usize,
    pub pref1: usize,
    pub pref2: usize,
    pub hops: usize,
}

/// Render one stripped skyline path and tally its reward statistics.
///
/// Node and edge lookups that fail render as `?` and are logged; a deleted
/// element must degrade one path's text, never abort the report.
pub fn render_path(store: &GraphStore, rewards: &RewardTable, path: &[EdgeId]) -> ReportedPath {
    if path.is_empty() {
        return ReportedPath {
            rendered: "empty path".to_string(),
            reward: 0,
            total_nodes: 0,
            pref1: 0,
            pref2: 0,
            hops: 0,
        };
    }

    let mut rendered = String::new();
    let mut reward = 0i64;
    let mut pref1 = 0usize;
    let mut pref2 = 0usize;
    let mut total_nodes = 0usize;
    let pref_threshold = 2 * rewards.num_prefs() as i64;

    for (i, &edge) in path.iter().enumerate() {
        if i == 0 {
            if let Some(source) = store.edge_source(edge) {
                rendered.push_str(&node_text(store, source));
                total_nodes += 1;
            } else {
                rendered.push('?');
            }
        }
        rendered.push_str("--[");
        rendered.push_str(&type_text(store, edge));
        rendered.push_str("]-->");

        match store.edge_target(edge) {
            Some(target) => {
                rendered.push_str(&node_text(store, target));
                total_nodes += 1;
                let cost = rewards.edge_cost(store, edge, target);
                reward += cost.reward;
                // Only nodes carrying their own reward entry are tallied;
                // the running reward classifies the step by whether the
                // full preference quota is collected so far.
                if rewards.reward_for(&target.raw().to_string()).is_some() {
                    if reward == pref_threshold {
                        pref1 += 1;
                    } else {
                        pref2 += 1;
                    }
                }
            }
            None => {
                tracing::warn!(edge = edge.raw(), "skyline edge vanished before rendering");
                rendered.push('?');
            }
        }
    }

    ReportedPath {
        rendered,
        reward,
        total_nodes,
        pref1,
        pref2,
        hops: path.len(),
    }
}

fn node_text(store: &GraphStore, node: NodeId) -> String {
    match store.node_label(node) {
        Some(label) => format!("({} {})", node.raw(), label),
        None => {
            tracing::warn!(node = node.raw(), "skyline node vanished before rendering");
            format!("({} ?)", node.raw())
        }
    }
}

fn type_text(store: &GraphStore, edge: EdgeId) -> String {
    match store.edge_type_name(edge) {
        Some(name) => name,
        None => "?".to_string(),
    }
}
