use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Configuration format versions this compiler accepts.
pub const SUPPORTED_FORMAT_VERSION: u32 = 4;

/// Reserved for the next document format; parsing it is not implemented.
pub const RESERVED_FORMAT_VERSION: u32 = 5;

#[derive(Parser, Debug)]
#[command(name = "monforge")]
#[command(about = "Compile monitoring-cluster specs into KV trees and daemon directive scripts")]
#[command(version)]
pub struct Args {
    /// Path to the cluster configuration document (YAML)
    #[arg(required = true)]
    pub config_file: PathBuf,

    /// Path to the store-cluster document selecting the KV endpoints
    #[arg(long, value_name = "FILE")]
    pub cluster: Option<PathBuf>,

    /// Key prefix for the published tree (defaults to the store-cluster name)
    #[arg(long, value_name = "NAME")]
    pub prefix: Option<String>,

    /// Write directive scripts to this directory instead of publishing
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Configuration format version (4 supported; 5 reserved)
    #[arg(long, default_value_t = SUPPORTED_FORMAT_VERSION)]
    pub format_version: u32,

    /// Dry-run mode: validate the document and print a summary
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

// ============================================================================
// Pure display logic (no I/O - returns formatted strings)
// ============================================================================

use crate::config::ClusterModel;

/// Format a dry-run summary of the validated model.
/// Pure function - returns a formatted string.
pub fn format_dry_run(model: &ClusterModel, args: &Args) -> String {
    let mut output = String::new();

    output.push_str("monforge - Dry Run Mode\n\n");
    output.push_str(&format!("Config: {}\n\n", args.config_file.display()));

    output.push_str(&format!("Endpoints ({}):\n", model.endpoints.len()));
    for ep in model.endpoints.values() {
        output.push_str(&format!(
            "  - {} {}:{} [{}]\n",
            ep.name, ep.host, ep.port, ep.xprt
        ));
    }
    output.push('\n');

    output.push_str(&format!("Groups ({}):\n", model.groups.len()));
    for group in model.groups.values() {
        let aggregators = model.aggregators_for(&group.name);
        let producers = model.producers_for(&group.name);
        output.push_str(&format!(
            "  [{}] {} aggregators, {} producers, {} updaters, {} stores\n",
            group.name,
            aggregators.len(),
            producers.len(),
            model.updaters_for(&group.name).len(),
            model.stores_for(&group.name).len(),
        ));
        if !aggregators.is_empty() {
            let share =
                (producers.len() as f64 / aggregators.len() as f64).round() as usize;
            output.push_str(&format!(
                "      balancing: ~{} producers per aggregator\n",
                share
            ));
        }
    }

    output.push_str("\nValidation: PASSED\n");
    if args.out_dir.is_some() {
        output.push_str("Remove --dry-run to write directive scripts.\n");
    } else {
        output.push_str("Remove --dry-run to publish to the store.\n");
    }

    output
}
