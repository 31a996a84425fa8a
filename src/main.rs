use std::path::Path;
use std::process;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use monforge::cli::{
    format_dry_run, Args, RESERVED_FORMAT_VERSION, SUPPORTED_FORMAT_VERSION,
};
use monforge::config::{build_model, load_cluster_file, load_store_cluster_file, Member};
use monforge::flatten;
use monforge::kv::EtcdSink;
use monforge::script::{self, GroupScripts};

fn main() {
    let args = Args::parse();

    // Initialize logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    if let Err(e) = run(&args) {
        error!("{e:#}");
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    match args.format_version {
        SUPPORTED_FORMAT_VERSION => {}
        RESERVED_FORMAT_VERSION => {
            bail!("format version {RESERVED_FORMAT_VERSION} is reserved and not yet supported")
        }
        other => bail!("unsupported format version {other}"),
    }

    let doc = load_cluster_file(&args.config_file).with_context(|| {
        format!("loading cluster config {}", args.config_file.display())
    })?;
    let model = build_model(&doc)?;
    info!(
        endpoints = model.endpoints.len(),
        groups = model.groups.len(),
        "validated cluster config"
    );

    if args.dry_run {
        println!("{}", format_dry_run(&model, args));
        return Ok(());
    }

    if let Some(dir) = &args.out_dir {
        let scripts = script::generate(&model)?;
        write_scripts(&scripts, dir)?;
        return Ok(());
    }

    // KV-publish mode
    let cluster_path = args
        .cluster
        .as_ref()
        .context("--cluster is required when publishing to the store")?;
    let store = load_store_cluster_file(cluster_path)
        .with_context(|| format!("loading store-cluster doc {}", cluster_path.display()))?;
    let prefix = args.prefix.clone().unwrap_or_else(|| store.cluster.clone());
    let root = format!("/{}", prefix.trim_start_matches('/'));

    let members: Vec<String> = store.members.iter().map(Member::address).collect();
    info!(cluster = %store.cluster, members = members.len(), "connecting to store");
    let mut sink = EtcdSink::connect(&members)?;

    let count = flatten::publish(&mut sink, &root, &model.to_value())?;
    info!("published {count} leaves under {root}");
    Ok(())
}

/// Write the generated scripts into the output directory, one file per
/// aggregator plus one sampler file per group.
fn write_scripts(scripts: &[GroupScripts], dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    for group in scripts {
        if let Some(sampler) = &group.sampler {
            let path = dir.join(format!("{}-samplers.conf", group.group));
            std::fs::write(&path, sampler)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        for node in &group.aggregators {
            let path = dir.join(format!("{}.conf", node.node));
            std::fs::write(&path, &node.text)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
    }
    Ok(())
}
