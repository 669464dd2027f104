//! Skypath CLI
//!
//! Command-line interface for preference-path queries:
//! - Loading graph snapshots from JSON
//! - Running skyline queries with preference/exclude selectors
//! - Inspecting loaded graphs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use skypath_engine::{preference_path_query, Outcome, QueryParams, SearchConfig, SelectionPolicy};
use skypath_graph::{GraphSnapshot, GraphStore, ReachabilityIndex};

#[derive(Parser)]
#[command(name = "skypath")]
#[command(author, version, about = "Pareto-optimal preference path search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a preference-path query against a graph snapshot.
    Query {
        /// Graph snapshot (JSON)
        #[arg(long)]
        graph: PathBuf,
        /// Start selector, e.g. `nodes(label = City)` or `nodes(id in (1,2))`
        #[arg(long)]
        start: String,
        /// End selector
        #[arg(long)]
        end: String,
        /// Preference selector, repeatable; earlier flags earn higher rewards
        #[arg(long = "prefer")]
        prefer: Vec<String>,
        /// Exclude selector, repeatable
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        /// Frontier selection policy
        #[arg(long, default_value = "priority-queue")]
        policy: SelectionPolicy,
        /// Maximum hops for reward chains
        #[arg(long)]
        max_hops: Option<usize>,
        /// Wall-clock budget in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Drop unreachable start/end pairs before searching
        #[arg(long)]
        reachability_prefilter: bool,
    },

    /// Print node/edge counts and labels of a graph snapshot.
    Info {
        /// Graph snapshot (JSON)
        #[arg(long)]
        graph: PathBuf,
    },
}

fn load_store(path: &PathBuf) -> Result<GraphStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading graph snapshot {}", path.display()))?;
    let snapshot: GraphSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("parsing graph snapshot {}", path.display()))?;
    let store = GraphStore::from_snapshot(&snapshot)
        .with_context(|| format!("loading graph snapshot {}", path.display()))?;
    Ok(store)
}

#[allow(clippy::too_many_arguments)]
fn cmd_query(
    graph: &PathBuf,
    start: String,
    end: String,
    prefer: Vec<String>,
    exclude: Vec<String>,
    policy: SelectionPolicy,
    max_hops: Option<usize>,
    timeout_ms: Option<u64>,
    reachability_prefilter: bool,
) -> Result<()> {
    let store = load_store(graph)?;
    eprintln!(
        "{} {} ({} nodes, {} edges)",
        "loaded".green().bold(),
        graph.display().to_string().bold(),
        store.node_count(),
        store.edge_count()
    );

    let mut config = SearchConfig {
        selection_policy: policy,
        use_reachability_prefilter: reachability_prefilter,
        ..SearchConfig::default()
    };
    if let Some(hops) = max_hops {
        config.max_hops = hops;
    }
    if let Some(ms) = timeout_ms {
        config.timeout_millis = ms;
    }

    let reach = if reachability_prefilter {
        Some(ReachabilityIndex::build(&store))
    } else {
        None
    };

    let params = QueryParams {
        start_selector: start,
        end_selector: end,
        preference_selectors: prefer,
        exclude_selectors: exclude,
    };

    let report = preference_path_query(
        &store,
        &params,
        &config,
        reach.as_ref().map(|r| r as &dyn skypath_graph::Reachability),
    )?;

    match report.outcome {
        Outcome::Converged => eprintln!("{}", "converged".green().bold()),
        Outcome::TimedOut => eprintln!(
            "{} partial skyline after {} ms",
            "timed out:".yellow().bold(),
            report.stats.elapsed_millis
        ),
    }

    if report.paths.is_empty() {
        println!("no paths found");
        return Ok(());
    }
    for (i, path) in report.paths.iter().enumerate() {
        println!(
            "{} {}",
            format!("[{}]", i + 1).cyan().bold(),
            path.rendered
        );
        println!(
            "    reward {}  hops {}  nodes {}  pref1 {}  pref2 {}",
            path.reward, path.hops, path.total_nodes, path.pref1, path.pref2
        );
    }
    eprintln!(
        "{} {} expanded, {} submitted, {} ms",
        "stats:".cyan(),
        report.stats.expanded_nodes,
        report.stats.submitted_paths,
        report.stats.elapsed_millis
    );
    Ok(())
}

fn cmd_info(graph: &PathBuf) -> Result<()> {
    let store = load_store(graph)?;
    println!("nodes: {}", store.node_count());
    println!("edges: {}", store.edge_count());

    let mut labels: Vec<(String, usize)> = Vec::new();
    for node in store.node_ids() {
        if let Some(label) = store.node_label(node) {
            match labels.iter_mut().find(|(l, _)| *l == label) {
                Some((_, count)) => *count += 1,
                None => labels.push((label, 1)),
            }
        }
    }
    labels.sort();
    for (label, count) in labels {
        println!("  {label}: {count}");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Query {
            graph,
            start,
            end,
            prefer,
            exclude,
            policy,
            max_hops,
            timeout_ms,
            reachability_prefilter,
        } => cmd_query(
            &graph,
            start,
            end,
            prefer,
            exclude,
            policy,
            max_hops,
            timeout_ms,
            reachability_prefilter,
        ),
        Commands::Info { graph } => cmd_info(&graph),
    }
}
