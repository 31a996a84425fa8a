//! Cluster model builder
//!
//! Validates and normalizes a raw [`ClusterDoc`] into a [`ClusterModel`]:
//! range expressions expand, positional list correspondences are enforced,
//! per-group names are checked for uniqueness and defaults are applied. Any
//! failure aborts construction; no partial model ever reaches the flattener
//! or the script generator.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

use crate::expand::{self, ExpandError};
use crate::interval::{self, IntervalError};

use super::model::{
    Aggregator, AggregatorState, Auth, ClusterModel, Endpoint, Group, Plugin, PluginRef,
    Producer, ProducerMatcher, ProducerType, SamplerEntry, SetField, SetMatcher, Store, Updater,
};
use super::raw::ClusterDoc;

/// Default endpoint transport when a spec omits `xprt`.
pub const DEFAULT_XPRT: &str = "sock";

/// Default authentication domain when a spec omits `auth`.
pub const DEFAULT_AUTH: &str = "none";

/// Errors raised while building the cluster model
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("The '{field}' attribute is required in a {construct}")]
    MissingField {
        field: &'static str,
        construct: &'static str,
    },

    #[error("Duplicate {construct} name '{name}' in {scope}")]
    DuplicateName {
        construct: &'static str,
        name: String,
        scope: String,
    },

    #[error("Cardinality mismatch in a {construct}: {detail}")]
    CardinalityMismatch {
        construct: &'static str,
        detail: String,
    },

    #[error("Updater '{0}' specifies both push and auto modes")]
    ConflictingMode(String),

    #[error("The '{field}' attribute of a {construct} must be {expected}")]
    BadField {
        field: &'static str,
        construct: &'static str,
        expected: &'static str,
    },

    #[error("Invalid regex '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error(transparent)]
    Expand(#[from] ExpandError),

    #[error(transparent)]
    Interval(#[from] IntervalError),
}

/// Build the full model from a raw document. Fail-fast: the first
/// validation error aborts the whole build.
pub fn build_model(doc: &ClusterDoc) -> Result<ClusterModel, BuildError> {
    let mut model = ClusterModel::default();
    build_endpoints(doc, &mut model)?;
    build_groups(doc, &mut model)?;
    build_aggregators(doc, &mut model)?;
    build_producers(doc, &mut model)?;
    build_updaters(doc, &mut model)?;
    build_stores(doc, &mut model)?;
    build_samplers(doc, &mut model)?;
    build_plugins(doc, &mut model)?;
    debug!(
        endpoints = model.endpoints.len(),
        groups = model.groups.len(),
        "model built"
    );
    Ok(model)
}

/// Verify that each key is present in the mapping.
pub fn check_required(
    keys: &[&'static str],
    map: &Mapping,
    construct: &'static str,
) -> Result<(), BuildError> {
    for &key in keys {
        if !map.contains_key(key) {
            return Err(BuildError::MissingField {
                field: key,
                construct,
            });
        }
    }
    Ok(())
}

/// Expand parallel `names`/`hosts`/`ports` specs into `(name, host, port)`
/// triples: hosts vary slower than ports, names are consumed in order.
///
/// The expansion counts must satisfy `names == hosts * ports` exactly; any
/// disagreement is a hard failure.
pub fn expand_cross_product(
    names: &Value,
    hosts: &Value,
    ports: &Value,
) -> Result<Vec<(String, String, u16)>, BuildError> {
    let names = expand::expand_spec(names)?;
    let hosts = expand::expand_spec(hosts)?;
    let ports = expand_ports(ports)?;

    if names.len() != hosts.len() * ports.len() {
        return Err(BuildError::CardinalityMismatch {
            construct: "endpoint",
            detail: format!(
                "{} names for {} hosts x {} ports (need {})",
                names.len(),
                hosts.len(),
                ports.len(),
                hosts.len() * ports.len()
            ),
        });
    }

    let pairs = hosts
        .iter()
        .flat_map(|host| ports.iter().map(move |port| (host, port)));
    Ok(names
        .into_iter()
        .zip(pairs)
        .map(|(name, (host, port))| (name, host.clone(), *port))
        .collect())
}

fn expand_ports(spec: &Value) -> Result<Vec<u16>, BuildError> {
    expand::expand_spec(spec)?
        .iter()
        .map(|p| {
            p.parse::<u16>().map_err(|_| BuildError::BadField {
                field: "ports",
                construct: "endpoint",
                expected: "a list of 16-bit port numbers",
            })
        })
        .collect()
}

fn build_endpoints(doc: &ClusterDoc, model: &mut ClusterModel) -> Result<(), BuildError> {
    for spec in &doc.endpoints {
        check_required(&["names", "hosts", "ports"], spec, "endpoint")?;
        let xprt = opt_string(spec, "xprt").unwrap_or_else(|| DEFAULT_XPRT.to_string());
        let auth = build_auth(spec);

        let triples = expand_cross_product(
            req_value(spec, "names", "endpoint")?,
            req_value(spec, "hosts", "endpoint")?,
            req_value(spec, "ports", "endpoint")?,
        )?;
        for (name, host, port) in triples {
            if model.endpoints.contains_key(&name) {
                return Err(BuildError::DuplicateName {
                    construct: "endpoint",
                    name,
                    scope: "the cluster".to_string(),
                });
            }
            model.endpoints.insert(
                name.clone(),
                Endpoint {
                    name,
                    host,
                    port,
                    xprt: xprt.clone(),
                    auth: auth.clone(),
                },
            );
        }
    }
    Ok(())
}

fn build_auth(spec: &Mapping) -> Auth {
    let auth = spec.get("auth").and_then(Value::as_mapping);
    Auth {
        name: auth
            .and_then(|m| m.get("name"))
            .and_then(scalar_string)
            .unwrap_or_else(|| DEFAULT_AUTH.to_string()),
        config: auth
            .and_then(|m| m.get("config"))
            .and_then(Value::as_mapping)
            .cloned()
            .unwrap_or_default(),
    }
}

fn build_groups(doc: &ClusterDoc, model: &mut ClusterModel) -> Result<(), BuildError> {
    for spec in &doc.groups {
        check_required(&["name", "endpoints", "interfaces"], spec, "group")?;
        let name = req_string(spec, "name", "group")?;
        let endpoints = expand::expand_spec(req_value(spec, "endpoints", "group")?)?;
        let interfaces = string_list(spec, "interfaces", "group")?;
        model.groups.insert(
            name.clone(),
            Group {
                name,
                endpoints,
                interfaces,
            },
        );
    }
    Ok(())
}

fn build_aggregators(doc: &ClusterDoc, model: &mut ClusterModel) -> Result<(), BuildError> {
    for spec in &doc.aggregators {
        check_required(&["names", "group", "endpoints"], spec, "aggregator")?;
        let group = req_string(spec, "group", "aggregator")?;
        let names = expand::expand_spec(req_value(spec, "names", "aggregator")?)?;
        let endpoints = expand::expand_spec(req_value(spec, "endpoints", "aggregator")?)?;
        if names.len() != endpoints.len() {
            return Err(BuildError::CardinalityMismatch {
                construct: "aggregator",
                detail: format!("{} names for {} endpoints", names.len(), endpoints.len()),
            });
        }
        let slot = model.aggregators.entry(group).or_default();
        for (name, endpoint) in names.into_iter().zip(endpoints) {
            slot.push(Aggregator {
                name,
                endpoint,
                state: AggregatorState::Stopped,
            });
        }
    }
    Ok(())
}

fn build_producers(doc: &ClusterDoc, model: &mut ClusterModel) -> Result<(), BuildError> {
    for spec in &doc.producers {
        check_required(
            &["names", "endpoints", "updaters", "reconnect", "type", "group"],
            spec,
            "producer",
        )?;
        let group = req_string(spec, "group", "producer")?;
        let names = expand::expand_spec(req_value(spec, "names", "producer")?)?;
        let endpoints = expand::expand_spec(req_value(spec, "endpoints", "producer")?)?;
        if names.len() != endpoints.len() {
            return Err(BuildError::CardinalityMismatch {
                construct: "producer",
                detail: format!("{} names for {} endpoints", names.len(), endpoints.len()),
            });
        }

        let kind = req_string(spec, "type", "producer")?;
        let kind = ProducerType::parse(&kind).ok_or(BuildError::BadField {
            field: "type",
            construct: "producer",
            expected: "'active' or 'passive'",
        })?;
        let reconnect = req_string(spec, "reconnect", "producer")?;
        // Syntax-check now so a bad spec aborts the build; the generator
        // resolves the value later.
        interval::parse_interval(&reconnect)?;
        let updaters = string_list(spec, "updaters", "producer")?;
        let start_regex = opt_string(spec, "regex");
        if let Some(pattern) = &start_regex {
            compile_regex(pattern)?;
        }

        let slot = model.producers.entry(group.clone()).or_default();
        for (name, endpoint) in names.into_iter().zip(endpoints) {
            slot.push(Producer {
                name,
                endpoint,
                kind,
                group: group.clone(),
                reconnect: reconnect.clone(),
                updaters: updaters.clone(),
                start_regex: start_regex.clone(),
            });
        }
    }
    Ok(())
}

fn build_updaters(doc: &ClusterDoc, model: &mut ClusterModel) -> Result<(), BuildError> {
    for spec in &doc.updaters {
        check_required(&["name", "group", "interval"], spec, "updater")?;
        let name = req_string(spec, "name", "updater")?;
        let group = req_string(spec, "group", "updater")?;
        let interval = req_string(spec, "interval", "updater")?;
        interval::parse_interval_pair(&interval)?;

        let push = opt_string(spec, "push");
        let auto = spec.get("auto").map(yaml_bool);
        if push.is_some() && auto.is_some() {
            return Err(BuildError::ConflictingMode(name));
        }

        let mut sets = Vec::new();
        for item in mapping_list(spec, "sets", "updater set matcher")? {
            check_required(&["regex"], &item, "updater set matcher")?;
            let regex = req_string(&item, "regex", "updater set matcher")?;
            compile_regex(&regex)?;
            let field = match opt_string(&item, "field") {
                None => SetField::Inst,
                Some(text) => SetField::parse(&text).ok_or(BuildError::BadField {
                    field: "field",
                    construct: "updater set matcher",
                    expected: "'inst' or 'schema'",
                })?,
            };
            sets.push(SetMatcher { regex, field });
        }

        let mut producers = Vec::new();
        for item in mapping_list(spec, "producers", "updater producer matcher")? {
            check_required(&["regex"], &item, "updater producer matcher")?;
            let regex = req_string(&item, "regex", "updater producer matcher")?;
            compile_regex(&regex)?;
            producers.push(ProducerMatcher { regex });
        }

        let slot = model.updaters.entry(group.clone()).or_default();
        if slot.iter().any(|u| u.name == name) {
            return Err(BuildError::DuplicateName {
                construct: "updater",
                name,
                scope: format!("group '{group}'"),
            });
        }
        slot.push(Updater {
            name,
            group,
            interval,
            sets,
            producers,
            push,
            auto,
        });
    }
    Ok(())
}

fn build_stores(doc: &ClusterDoc, model: &mut ClusterModel) -> Result<(), BuildError> {
    for spec in &doc.stores {
        check_required(
            &["name", "group", "container", "schema", "plugin"],
            spec,
            "store",
        )?;
        let name = req_string(spec, "name", "store")?;
        let group = req_string(spec, "group", "store")?;

        let plugin = spec
            .get("plugin")
            .and_then(Value::as_mapping)
            .ok_or(BuildError::BadField {
                field: "plugin",
                construct: "store",
                expected: "a mapping with 'name' and 'config'",
            })?;
        check_required(&["name", "config"], plugin, "store plugin")?;
        let plugin = PluginRef {
            name: req_string(plugin, "name", "store plugin")?,
            config: plugin
                .get("config")
                .and_then(Value::as_mapping)
                .cloned()
                .unwrap_or_default(),
        };

        let slot = model.stores.entry(group.clone()).or_default();
        if slot.iter().any(|s| s.name == name) {
            return Err(BuildError::DuplicateName {
                construct: "store",
                name,
                scope: format!("group '{group}'"),
            });
        }
        let flush = opt_string(spec, "flush");
        if let Some(flush) = &flush {
            interval::parse_interval(flush)?;
        }
        slot.push(Store {
            name,
            group,
            container: req_string(spec, "container", "store")?,
            schema: req_string(spec, "schema", "store")?,
            plugin,
            flush,
        });
    }
    Ok(())
}

fn build_samplers(doc: &ClusterDoc, model: &mut ClusterModel) -> Result<(), BuildError> {
    for spec in &doc.samplers {
        check_required(&["group", "plugins"], spec, "sampler config")?;
        let group = req_string(spec, "group", "sampler config")?;
        let mut entries = Vec::new();
        for item in mapping_list(spec, "plugins", "sampler plugin")? {
            check_required(&["name"], &item, "sampler plugin")?;
            let interval = opt_string(&item, "interval");
            if let Some(interval) = &interval {
                interval::parse_interval_pair(interval)?;
            }
            entries.push(SamplerEntry {
                plugin: req_string(&item, "name", "sampler plugin")?,
                interval,
                perm: opt_string(&item, "perm"),
                config: item
                    .get("config")
                    .and_then(Value::as_mapping)
                    .cloned()
                    .unwrap_or_default(),
            });
        }
        // Keyed by group: a later entry replaces an earlier one.
        model.samplers.insert(group, entries);
    }
    Ok(())
}

fn build_plugins(doc: &ClusterDoc, model: &mut ClusterModel) -> Result<(), BuildError> {
    for spec in &doc.plugins {
        check_required(&["name", "group"], spec, "plugin")?;
        let name = req_string(spec, "name", "plugin")?;
        let group = req_string(spec, "group", "plugin")?;
        let config = spec
            .get("config")
            .and_then(Value::as_mapping)
            .cloned()
            .unwrap_or_default();

        let slot = model.plugins.entry(group.clone()).or_default();
        if slot.iter().any(|p| p.name == name) {
            return Err(BuildError::DuplicateName {
                construct: "plugin",
                name,
                scope: format!("group '{group}'"),
            });
        }
        slot.push(Plugin {
            name,
            group,
            config,
        });
    }
    Ok(())
}

// ============================================================================
// Field extraction helpers
// ============================================================================

/// Render a scalar value as a string; mappings and sequences yield None.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Truthy YAML booleans per the document contract: `true`, `"true"`,
/// `"True"`; everything else is false.
pub fn yaml_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true" || s == "True",
        _ => false,
    }
}

fn req_value<'a>(
    map: &'a Mapping,
    field: &'static str,
    construct: &'static str,
) -> Result<&'a Value, BuildError> {
    map.get(field)
        .ok_or(BuildError::MissingField { field, construct })
}

fn req_string(
    map: &Mapping,
    field: &'static str,
    construct: &'static str,
) -> Result<String, BuildError> {
    map.get(field)
        .and_then(scalar_string)
        .ok_or(BuildError::MissingField { field, construct })
}

fn opt_string(map: &Mapping, field: &str) -> Option<String> {
    map.get(field).and_then(scalar_string)
}

/// A list field accepting either a single scalar or a sequence of scalars.
fn string_list(
    map: &Mapping,
    field: &'static str,
    construct: &'static str,
) -> Result<Vec<String>, BuildError> {
    match map.get(field) {
        None => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|v| {
                scalar_string(v).ok_or(BuildError::BadField {
                    field,
                    construct,
                    expected: "a list of names",
                })
            })
            .collect(),
        Some(other) => scalar_string(other).map(|s| vec![s]).ok_or(BuildError::BadField {
            field,
            construct,
            expected: "a name or list of names",
        }),
    }
}

/// A list field whose items must be mappings.
fn mapping_list(
    map: &Mapping,
    field: &'static str,
    construct: &'static str,
) -> Result<Vec<Mapping>, BuildError> {
    match map.get(field) {
        None => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|v| {
                v.as_mapping().cloned().ok_or(BuildError::BadField {
                    field,
                    construct,
                    expected: "a list of mappings",
                })
            })
            .collect(),
        Some(_) => Err(BuildError::BadField {
            field,
            construct,
            expected: "a list of mappings",
        }),
    }
}

fn compile_regex(pattern: &str) -> Result<Regex, BuildError> {
    Regex::new(pattern).map_err(|e| BuildError::InvalidRegex {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> ClusterDoc {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn value(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_cross_product_exact_counts() {
        let triples = expand_cross_product(
            &value("\"ep[1-4]\""),
            &value("\"host[1-2]\""),
            &value("\"[10001-10002]\""),
        )
        .unwrap();

        assert_eq!(triples.len(), 4);
        // Hosts vary slower than ports; names consumed in order.
        assert_eq!(triples[0], ("ep1".into(), "host1".into(), 10001));
        assert_eq!(triples[1], ("ep2".into(), "host1".into(), 10002));
        assert_eq!(triples[2], ("ep3".into(), "host2".into(), 10001));
        assert_eq!(triples[3], ("ep4".into(), "host2".into(), 10002));
    }

    #[test]
    fn test_cross_product_under_supply_fails() {
        let result = expand_cross_product(
            &value("\"ep[1-3]\""),
            &value("\"host[1-2]\""),
            &value("\"[10001-10002]\""),
        );
        assert!(matches!(
            result,
            Err(BuildError::CardinalityMismatch { .. })
        ));
    }

    #[test]
    fn test_cross_product_over_supply_fails() {
        let result = expand_cross_product(
            &value("\"ep[1-5]\""),
            &value("\"host[1-2]\""),
            &value("\"[10001-10002]\""),
        );
        assert!(matches!(
            result,
            Err(BuildError::CardinalityMismatch { .. })
        ));
    }

    #[test]
    fn test_check_required_names_field_and_construct() {
        let map = value("{name: x}").as_mapping().unwrap().clone();
        let err = check_required(&["name", "group"], &map, "updater").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'group'"));
        assert!(message.contains("updater"));
    }

    #[test]
    fn test_build_endpoints_defaults() {
        let doc = doc(r#"
endpoints:
  - names: "ep[1-2]"
    hosts: "node[1-2]"
    ports: "[411]"
"#);
        let model = build_model(&doc).unwrap();
        let ep = model.endpoint("ep1").unwrap();
        assert_eq!(ep.host, "node1");
        assert_eq!(ep.port, 411);
        assert_eq!(ep.xprt, "sock");
        assert_eq!(ep.auth.name, "none");
    }

    #[test]
    fn test_build_endpoints_duplicate_name_fails() {
        let doc = doc(r#"
endpoints:
  - names: "ep1"
    hosts: "node1"
    ports: "[411]"
  - names: "ep1"
    hosts: "node2"
    ports: "[411]"
"#);
        assert!(matches!(
            build_model(&doc),
            Err(BuildError::DuplicateName { construct: "endpoint", .. })
        ));
    }

    #[test]
    fn test_build_aggregators_positional_zip() {
        let doc = doc(r#"
aggregators:
  - names: "agg[1-2]"
    group: l1
    endpoints: "ep[1-2]"
"#);
        let model = build_model(&doc).unwrap();
        let aggs = model.aggregators_for("l1");
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].name, "agg1");
        assert_eq!(aggs[0].endpoint, "ep1");
        assert_eq!(aggs[0].state, AggregatorState::Stopped);
        assert_eq!(aggs[1].endpoint, "ep2");
    }

    #[test]
    fn test_build_aggregators_length_mismatch() {
        let doc = doc(r#"
aggregators:
  - names: "agg[1-3]"
    group: l1
    endpoints: "ep[1-2]"
"#);
        assert!(matches!(
            build_model(&doc),
            Err(BuildError::CardinalityMismatch { construct: "aggregator", .. })
        ));
    }

    #[test]
    fn test_build_producers_missing_field() {
        let doc = doc(r#"
producers:
  - names: "p[1-2]"
    endpoints: "ep[1-2]"
    group: l1
    type: active
    updaters: [all]
"#);
        let err = build_model(&doc).unwrap_err();
        assert!(err.to_string().contains("'reconnect'"));
    }

    #[test]
    fn test_build_producers_bad_type() {
        let doc = doc(r#"
producers:
  - names: "p1"
    endpoints: "ep1"
    group: l1
    type: sometimes
    reconnect: 20s
    updaters: [all]
"#);
        assert!(matches!(build_model(&doc), Err(BuildError::BadField { .. })));
    }

    #[test]
    fn test_build_producers_bad_reconnect_aborts_build() {
        let doc = doc(r#"
producers:
  - names: "p1"
    endpoints: "ep1"
    group: l1
    type: active
    reconnect: soonish
    updaters: [all]
"#);
        assert!(matches!(build_model(&doc), Err(BuildError::Interval(_))));
    }

    #[test]
    fn test_build_updaters_duplicate_in_group_fails() {
        let doc = doc(r#"
updaters:
  - name: all
    group: l1
    interval: "1.0s:0ms"
  - name: all
    group: l1
    interval: "2.0s"
"#);
        assert!(matches!(
            build_model(&doc),
            Err(BuildError::DuplicateName { construct: "updater", .. })
        ));
    }

    #[test]
    fn test_build_updaters_same_name_different_groups_ok() {
        let doc = doc(r#"
updaters:
  - name: all
    group: l1
    interval: "1.0s"
  - name: all
    group: l2
    interval: "1.0s"
"#);
        let model = build_model(&doc).unwrap();
        assert_eq!(model.updaters_for("l1").len(), 1);
        assert_eq!(model.updaters_for("l2").len(), 1);
    }

    #[test]
    fn test_build_updaters_push_auto_conflict() {
        let doc = doc(r#"
updaters:
  - name: all
    group: l1
    interval: "1.0s"
    push: onchange
    auto: true
"#);
        assert!(matches!(
            build_model(&doc),
            Err(BuildError::ConflictingMode(name)) if name == "all"
        ));
    }

    #[test]
    fn test_build_updaters_set_matcher_defaults_to_inst() {
        let doc = doc(r#"
updaters:
  - name: all
    group: l1
    interval: "1.0s"
    sets:
      - regex: "meminfo.*"
      - regex: ".*"
        field: schema
"#);
        let model = build_model(&doc).unwrap();
        let updater = &model.updaters_for("l1")[0];
        assert_eq!(updater.sets[0].field, SetField::Inst);
        assert_eq!(updater.sets[1].field, SetField::Schema);
    }

    #[test]
    fn test_build_updaters_invalid_regex() {
        let doc = doc(r#"
updaters:
  - name: all
    group: l1
    interval: "1.0s"
    producers:
      - regex: "("
"#);
        assert!(matches!(
            build_model(&doc),
            Err(BuildError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_build_stores_requires_plugin_fields() {
        let doc = doc(r#"
stores:
  - name: sos-meminfo
    group: l2
    container: metric_sets
    schema: meminfo
    plugin:
      name: store_sos
"#);
        let err = build_model(&doc).unwrap_err();
        assert!(err.to_string().contains("'config'"));
        assert!(err.to_string().contains("store plugin"));
    }

    #[test]
    fn test_build_stores_duplicate_in_group_fails() {
        let doc = doc(r#"
stores:
  - name: sos
    group: l2
    container: c
    schema: s
    plugin: {name: store_sos, config: {path: /x}}
  - name: sos
    group: l2
    container: c2
    schema: s2
    plugin: {name: store_sos, config: {path: /y}}
"#);
        assert!(matches!(
            build_model(&doc),
            Err(BuildError::DuplicateName { construct: "store", .. })
        ));
    }

    #[test]
    fn test_build_samplers_overwrite_by_group() {
        let doc = doc(r#"
samplers:
  - group: compute
    plugins:
      - name: meminfo
  - group: compute
    plugins:
      - name: vmstat
      - name: loadavg
"#);
        let model = build_model(&doc).unwrap();
        let entries = model.sampler_entries_for("compute");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].plugin, "vmstat");
    }

    #[test]
    fn test_build_plugins_duplicate_in_group_fails() {
        let doc = doc(r#"
plugins:
  - name: meminfo
    group: l1
  - name: meminfo
    group: l1
"#);
        assert!(matches!(
            build_model(&doc),
            Err(BuildError::DuplicateName { construct: "plugin", .. })
        ));
    }

    #[test]
    fn test_group_declaration_order_preserved() {
        let doc = doc(r#"
groups:
  - name: zeta
    endpoints: "ep1"
    interfaces: [eth0]
  - name: alpha
    endpoints: "ep2"
    interfaces: [eth0]
"#);
        let model = build_model(&doc).unwrap();
        let names: Vec<_> = model.groups.keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
