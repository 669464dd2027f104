//! Pareto-optimal preference path search.
//!
//! Given start and end selectors plus ordered preference and exclude
//! selectors, the engine finds the skyline of paths between them: every
//! returned path is Pareto-optimal in (length, collected reward), and no
//! returned path is dominated by another. The search is a backward
//! label-correcting relaxation from a virtual sink with anytime timeout
//! semantics.
//!
//! ```no_run
//! use skypath_engine::{preference_path_query, QueryParams, SearchConfig};
//! use skypath_graph::GraphStore;
//!
//! let store = GraphStore::new();
//! let params = QueryParams {
//!     start_selector: "nodes(label = City)".to_string(),
//!     end_selector: "nodes(label = Port)".to_string(),
//!     preference_selectors: vec!["type(RAIL)".to_string()],
//!     exclude_selectors: vec![],
//! };
//! let report =
//!     preference_path_query(&store, &params, &SearchConfig::default(), None)?;
//! for path in &report.paths {
//!     println!("{} (reward {})", path.rendered, path.reward);
//! }
//! # Ok::<(), skypath_engine::QueryError>(())
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod bounds;
pub mod config;
pub mod frontier;
pub mod report;
pub mod rewards;
pub mod search;
pub mod skyline;


// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ParsePolicyError, SearchConfig, SelectionPolicy};
pub use report::ReportedPath;
pub use rewards::{CostVector, RewardTable};
pub use search::{
    preference_path_query, Outcome, QueryError, QueryParams, QueryReport, SearchStats,
};
pub use skyline::{PathBounds, Skyline};
