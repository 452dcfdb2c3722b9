//! CLI module for roadreach.
//!
//! Commands:
//! - reach: reach of one edge
//! - scan: reach of every edge, listing the rejected ones
//! - stats: graph statistics
//! - convert: write a snapshot of a network description

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ReachConfig;
use crate::costing::ModeCosting;
use crate::graph::{GraphId, GraphReader, RoadGraph};
use crate::reach::{CandidateFilter, DirectionMask, Reach};

#[derive(Parser, Debug)]
#[command(name = "roadreach")]
#[command(about = "Bounded edge reachability for road networks", long_about = None)]
pub struct Cli {
    /// Config file (missing file means defaults)
    #[arg(short, long, default_value = "roadreach.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the reach of one edge
    Reach {
        /// Graph file (.json network description or snapshot)
        #[arg(short, long)]
        graph: PathBuf,

        /// Edge id
        #[arg(short, long)]
        edge: u64,

        /// Threshold (default from config)
        #[arg(short, long)]
        max_reach: Option<u32>,

        /// in, out or both (default from config)
        #[arg(short, long)]
        direction: Option<DirectionMask>,
    },

    /// Compute reach for every edge and list those below the minimum
    Scan {
        #[arg(short, long)]
        graph: PathBuf,

        /// Minimum reach a candidate needs (default from config)
        #[arg(long)]
        min_reach: Option<u32>,

        #[arg(short, long)]
        direction: Option<DirectionMask>,
    },

    /// Show graph statistics
    Stats {
        #[arg(short, long)]
        graph: PathBuf,
    },

    /// Write a snapshot of a graph file
    Convert {
        #[arg(short, long)]
        graph: PathBuf,

        /// Snapshot destination
        #[arg(short, long)]
        out: PathBuf,
    },
}

/// Load config, execute the command and print its JSON output to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let config = ReachConfig::load(&cli.config);
    let output = execute(&cli.command, &config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Execute a command and return its JSON output.
pub fn execute(command: &Commands, config: &ReachConfig) -> Result<Value> {
    match command {
        Commands::Reach {
            graph,
            edge,
            max_reach,
            direction,
        } => {
            let graph = open_graph(graph)?;
            let costing = ModeCosting::from_config(&config.costing);
            let edge_id = GraphId(*edge);
            let max_reach = max_reach.unwrap_or(config.reach.max_reach);
            let direction = direction.unwrap_or(config.reach.direction);

            let record = graph.edge(edge_id)?;
            let mut reach = Reach::with_config(config.expansion.clone());
            let result = reach.reach(&record, edge_id, max_reach, &graph, &costing, direction)?;
            Ok(json!({
                "edge": edge_id,
                "max_reach": max_reach,
                "direction": direction,
                "reach": result,
                "escalations": reach.stats().escalations,
            }))
        }

        Commands::Scan {
            graph,
            min_reach,
            direction,
        } => {
            let graph = open_graph(graph)?;
            let costing = ModeCosting::from_config(&config.costing);
            let mut filter = CandidateFilter::from_config(&config.reach);
            if let Some(min_reach) = min_reach {
                filter.min_reach = *min_reach;
            }
            if let Some(direction) = direction {
                filter.direction = *direction;
            }

            let candidates: Vec<GraphId> = graph.edge_ids().collect();
            let (kept, rejected) = filter.apply(&candidates, &graph, &costing, &config.expansion)?;
            info!(kept = kept.len(), rejected = rejected.len(), "scan finished");
            Ok(json!({
                "min_reach": filter.min_reach,
                "direction": filter.direction,
                "edges": candidates.len(),
                "rejected": rejected,
            }))
        }

        Commands::Stats { graph } => {
            let graph = open_graph(graph)?;
            Ok(serde_json::to_value(graph.stats())?)
        }

        Commands::Convert { graph, out } => {
            let source = open_graph(graph)?;
            source
                .save(out)
                .with_context(|| format!("writing snapshot to {}", out.display()))?;
            Ok(json!({
                "snapshot": out,
                "stats": source.stats(),
            }))
        }
    }
}

fn open_graph(path: &Path) -> Result<RoadGraph> {
    RoadGraph::open(path).with_context(|| format!("loading graph from {}", path.display()))
}
