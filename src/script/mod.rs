//! Directive script generation
//!
//! For each group this module renders the text directive scripts consumed by
//! the monitoring daemons: one sampler script per group and one script per
//! aggregator. Producers are balanced across a group's aggregators by a
//! round-robin pass with a cursor carrying the last assigned producer name
//! between aggregators. The split is static; there is no wraparound, so when
//! the shares do not divide evenly the trailing aggregators receive short or
//! empty allotments and any remainder of the producer list stays unassigned.

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::model::{ClusterModel, Producer};
use crate::interval::{clamp_offset, parse_interval, parse_interval_pair, IntervalError};

/// Default sampling interval when a plugin config carries none.
pub const DEFAULT_SAMPLE_INTERVAL_US: u64 = 1_000_000;

/// Config keys consumed by start/add directives rather than `config` lines.
const INTERVAL_KEYS: [&str; 3] = ["interval", "offset", "reconnect"];

/// Errors raised during script generation
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Producer '{producer}' references unknown endpoint '{endpoint}'")]
    UnknownEndpoint { producer: String, endpoint: String },

    #[error(transparent)]
    Interval(#[from] IntervalError),
}

/// One generated per-node script.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeScript {
    pub node: String,
    pub text: String,
}

/// All scripts generated for one group.
#[derive(Debug, Clone)]
pub struct GroupScripts {
    pub group: String,
    /// Sampler directives, when the group has plugins or sampler entries
    pub sampler: Option<String>,
    /// One script per aggregator of the group
    pub aggregators: Vec<NodeScript>,
}

/// Generate every script for the model, group by group in declaration order.
pub fn generate(model: &ClusterModel) -> Result<Vec<GroupScripts>, ScriptError> {
    let mut scripts = Vec::new();
    for group in model.groups.keys() {
        let sampler = sampler_script(model, group)?;
        let aggregators = aggregator_scripts(model, group)?;
        debug!(group, aggregators = aggregators.len(), "group compiled");
        scripts.push(GroupScripts {
            group: group.clone(),
            sampler,
            aggregators,
        });
    }
    Ok(scripts)
}

/// Render the sampler script of a group: load/config/start for each plugin
/// registered to the group, then for each sampler entry of the group.
fn sampler_script(model: &ClusterModel, group: &str) -> Result<Option<String>, ScriptError> {
    let plugins = model.plugins_for(group);
    let entries = model.sampler_entries_for(group);
    if plugins.is_empty() && entries.is_empty() {
        return Ok(None);
    }

    let mut lines = Vec::new();
    for plugin in plugins {
        lines.push(format!("load name={}", plugin.name));
        lines.push(config_line(&plugin.name, None, &plugin.config));
        let (interval, offset) = config_interval(&plugin.config)?;
        lines.push(format!(
            "start name={} interval={} offset={}",
            plugin.name, interval, offset
        ));
    }
    for entry in entries {
        lines.push(format!("load name={}", entry.plugin));
        lines.push(config_line(&entry.plugin, entry.perm.as_deref(), &entry.config));
        let (interval, offset) = match &entry.interval {
            None => (DEFAULT_SAMPLE_INTERVAL_US, 0),
            Some(spec) => {
                let (interval, offset) = parse_interval_pair(spec)?;
                (interval, clamp_offset(interval, offset))
            }
        };
        lines.push(format!(
            "start name={} interval={} offset={}",
            entry.plugin, interval, offset
        ));
    }
    Ok(Some(render(lines)))
}

/// Render one script per aggregator of the group, assigning producers.
fn aggregator_scripts(
    model: &ClusterModel,
    group: &str,
) -> Result<Vec<NodeScript>, ScriptError> {
    let aggregators = model.aggregators_for(group);
    if aggregators.is_empty() {
        return Ok(Vec::new());
    }

    let producers = model.producers_for(group);
    let total = producers.len();
    let share = (total as f64 / aggregators.len() as f64).round() as usize;

    // The cursor carries the *name* of the last producer assigned to the
    // previous aggregator in this pass.
    let mut cursor: Option<&str> = None;
    let mut scripts = Vec::new();

    for aggregator in aggregators {
        let resume = match cursor {
            None => 0,
            Some(name) => producers
                .iter()
                .position(|p| p.name == name)
                .map(|i| i + 1)
                .unwrap_or(total),
        };
        // No wraparound: past the end of the list, later aggregators get
        // short or empty allotments.
        let assigned = &producers[resume..total.min(resume + share)];

        let mut lines = Vec::new();
        lines.extend(producer_directives(model, assigned)?);
        lines.extend(plugin_directives(model, group));
        lines.extend(updater_directives(model, group)?);
        lines.extend(store_directives(model, group)?);

        if let Some(last) = assigned.last() {
            cursor = Some(&last.name);
        }
        scripts.push(NodeScript {
            node: aggregator.name.clone(),
            text: render(lines),
        });
    }
    Ok(scripts)
}

/// `prdcr_add` lines for the assigned producers plus their start directives.
///
/// Normally a single wildcard `prdcr_start_regex` starts everything added;
/// when any assigned producer carries a custom start regex, each assigned
/// producer instead gets its own start directive (its custom pattern, or its
/// anchored name) and the wildcard is suppressed. The suppression is scoped
/// to this one aggregator's assignment.
fn producer_directives(
    model: &ClusterModel,
    assigned: &[Producer],
) -> Result<Vec<String>, ScriptError> {
    let mut lines = Vec::new();
    let mut custom_regex = false;

    for producer in assigned {
        let endpoint =
            model
                .endpoint(&producer.endpoint)
                .ok_or_else(|| ScriptError::UnknownEndpoint {
                    producer: producer.name.clone(),
                    endpoint: producer.endpoint.clone(),
                })?;
        let reconnect = parse_interval(&producer.reconnect)?;
        lines.push(format!(
            "prdcr_add name={} host={} port={} xprt={} type={} reconnect={}",
            producer.name,
            endpoint.host,
            endpoint.port,
            endpoint.xprt,
            producer.kind,
            reconnect
        ));
        if producer.start_regex.is_some() {
            custom_regex = true;
        }
    }

    if assigned.is_empty() {
        return Ok(lines);
    }
    if custom_regex {
        for producer in assigned {
            let pattern = producer
                .start_regex
                .clone()
                .unwrap_or_else(|| format!("^{}$", producer.name));
            lines.push(format!("prdcr_start_regex regex={pattern}"));
        }
    } else {
        lines.push("prdcr_start_regex regex=.*".to_string());
    }
    Ok(lines)
}

/// Plugin load/config lines, preceded by a stream subscription when the
/// plugin config carries a `stream` key.
fn plugin_directives(model: &ClusterModel, group: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for plugin in model.plugins_for(group) {
        if let Some(stream) = plugin.config.get("stream").and_then(scalar_text) {
            lines.push(format!("prdcr_subscribe regex=.* stream={stream}"));
        }
        lines.push(format!("load name={}", plugin.name));
        lines.push(config_line(&plugin.name, None, &plugin.config));
    }
    lines
}

fn updater_directives(model: &ClusterModel, group: &str) -> Result<Vec<String>, ScriptError> {
    let mut lines = Vec::new();
    for updater in model.updaters_for(group) {
        let (interval, offset) = parse_interval_pair(&updater.interval)?;
        let offset = clamp_offset(interval, offset);
        let mut add = format!(
            "updtr_add name={} interval={} offset={} auto_interval=true",
            updater.name, interval, offset
        );
        if let Some(push) = &updater.push {
            add.push_str(&format!(" push={push}"));
        }
        lines.push(add);
        for matcher in &updater.producers {
            lines.push(format!(
                "updtr_prdcr_add name={} regex={}",
                updater.name, matcher.regex
            ));
        }
        lines.push(format!("updtr_start name={}", updater.name));
    }
    Ok(lines)
}

fn store_directives(model: &ClusterModel, group: &str) -> Result<Vec<String>, ScriptError> {
    let stores = model.stores_for(group);
    let mut lines = Vec::new();

    // One load/config pair per distinct backing plugin, first occurrence
    // order.
    let mut loaded: Vec<&str> = Vec::new();
    for store in stores {
        if !loaded.contains(&store.plugin.name.as_str()) {
            loaded.push(&store.plugin.name);
            lines.push(format!("load name={}", store.plugin.name));
            lines.push(config_line(&store.plugin.name, None, &store.plugin.config));
        }
    }

    for store in stores {
        let mut add = format!(
            "strgp_add name={} plugin={} container={} schema={}",
            store.name, store.plugin.name, store.container, store.schema
        );
        if let Some(flush) = &store.flush {
            add.push_str(&format!(" flush={}", parse_interval(flush)?));
        }
        lines.push(add);
        lines.push(format!("strgp_start name={}", store.name));
    }
    Ok(lines)
}

/// Render a `config name=<x> key=value ...` line from a free-form config
/// map, skipping interval-typed keys (those feed start/add directives) and
/// non-scalar values.
fn config_line(name: &str, perm: Option<&str>, config: &Mapping) -> String {
    let mut line = format!("config name={name}");
    if let Some(perm) = perm {
        line.push_str(&format!(" perm={perm}"));
    }
    for (key, value) in config {
        let Some(key) = key.as_str() else { continue };
        if INTERVAL_KEYS.contains(&key) {
            continue;
        }
        if let Some(text) = scalar_text(value) {
            line.push_str(&format!(" {key}={text}"));
        }
    }
    line
}

/// Interval/offset for a plugin start line, from its own config map.
fn config_interval(config: &Mapping) -> Result<(u64, u64), ScriptError> {
    let interval = match config.get("interval").and_then(scalar_text) {
        None => DEFAULT_SAMPLE_INTERVAL_US,
        Some(spec) => parse_interval(&spec)?,
    };
    let offset = match config.get("offset").and_then(scalar_text) {
        None => None,
        Some(spec) => Some(parse_interval(&spec)?),
    };
    Ok((interval, clamp_offset(interval, offset)))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn render(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
