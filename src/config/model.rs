//! Typed cluster model
//!
//! The validated, normalized form of a cluster configuration document. All
//! collections are built once and treated as immutable afterwards; the one
//! exception is [`Aggregator::state`], which exists for an external
//! monitoring collaborator to mutate. Group-keyed collections use ordered
//! maps because script generation order is observable downstream.

use std::fmt;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

/// Lifecycle state of an aggregator node.
///
/// Initialized to `Stopped` by the builder; transitions are driven by an
/// external monitor, never by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Stopped,
    Running,
    Error,
}

impl AggregatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregatorState::Stopped => "stopped",
            AggregatorState::Running => "running",
            AggregatorState::Error => "error",
        }
    }
}

impl fmt::Display for AggregatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an aggregator connects to a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerType {
    Active,
    Passive,
}

impl ProducerType {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "active" => Some(ProducerType::Active),
            "passive" => Some(ProducerType::Passive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProducerType::Active => "active",
            ProducerType::Passive => "passive",
        }
    }
}

impl fmt::Display for ProducerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which set attribute an updater set-matcher applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Inst,
    Schema,
}

impl SetField {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "inst" => Some(SetField::Inst),
            "schema" => Some(SetField::Schema),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SetField::Inst => "inst",
            SetField::Schema => "schema",
        }
    }
}

/// Authentication domain of an endpoint.
#[derive(Debug, Clone)]
pub struct Auth {
    pub name: String,
    pub config: Mapping,
}

/// A named network address reachable for monitoring traffic.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub xprt: String,
    pub auth: Auth,
}

/// A named collection of aggregators at one hierarchy level.
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub endpoints: Vec<String>,
    pub interfaces: Vec<String>,
}

/// A monitoring node collecting from producers beneath it.
#[derive(Debug, Clone)]
pub struct Aggregator {
    pub name: String,
    pub endpoint: String,
    pub state: AggregatorState,
}

/// A monitored source registered to a group.
#[derive(Debug, Clone)]
pub struct Producer {
    pub name: String,
    pub endpoint: String,
    pub kind: ProducerType,
    pub group: String,
    /// Reconnect interval spec, resolved to microseconds at generation time
    pub reconnect: String,
    /// Updater references by name, unresolved
    pub updaters: Vec<String>,
    /// Optional start-regex override for this producer
    pub start_regex: Option<String>,
}

/// A set-matcher of an updater.
#[derive(Debug, Clone)]
pub struct SetMatcher {
    pub regex: String,
    pub field: SetField,
}

/// A producer-matcher of an updater.
#[derive(Debug, Clone)]
pub struct ProducerMatcher {
    pub regex: String,
}

/// A polling policy: which producers/sets to poll and at what interval.
#[derive(Debug, Clone)]
pub struct Updater {
    pub name: String,
    pub group: String,
    /// `"<interval>[:<offset>]"` spec, resolved at generation time
    pub interval: String,
    pub sets: Vec<SetMatcher>,
    pub producers: Vec<ProducerMatcher>,
    pub push: Option<String>,
    pub auto: Option<bool>,
}

/// A named plugin reference with its config map.
#[derive(Debug, Clone)]
pub struct PluginRef {
    pub name: String,
    pub config: Mapping,
}

/// A persistence policy backed by a storage plugin.
#[derive(Debug, Clone)]
pub struct Store {
    pub name: String,
    pub group: String,
    pub container: String,
    pub schema: String,
    pub plugin: PluginRef,
    /// Optional flush interval spec
    pub flush: Option<String>,
}

/// One sampler plugin entry of a group's sampler configuration.
#[derive(Debug, Clone)]
pub struct SamplerEntry {
    pub plugin: String,
    pub interval: Option<String>,
    pub perm: Option<String>,
    pub config: Mapping,
}

/// A plugin registered to a group.
#[derive(Debug, Clone)]
pub struct Plugin {
    pub name: String,
    pub group: String,
    pub config: Mapping,
}

/// The complete validated cluster model.
#[derive(Debug, Clone, Default)]
pub struct ClusterModel {
    pub endpoints: IndexMap<String, Endpoint>,
    pub groups: IndexMap<String, Group>,
    /// Aggregators by group, in declaration order
    pub aggregators: IndexMap<String, Vec<Aggregator>>,
    /// Producers by group, in declaration order
    pub producers: IndexMap<String, Vec<Producer>>,
    /// Updaters by group, in declaration order
    pub updaters: IndexMap<String, Vec<Updater>>,
    /// Stores by group, in declaration order
    pub stores: IndexMap<String, Vec<Store>>,
    /// Sampler entries keyed by group; a later document entry for the same
    /// group replaces the earlier one
    pub samplers: IndexMap<String, Vec<SamplerEntry>>,
    /// Plugins by group, in declaration order
    pub plugins: IndexMap<String, Vec<Plugin>>,
}

impl ClusterModel {
    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.get(name)
    }

    pub fn aggregators_for(&self, group: &str) -> &[Aggregator] {
        self.aggregators.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn producers_for(&self, group: &str) -> &[Producer] {
        self.producers.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn updaters_for(&self, group: &str) -> &[Updater] {
        self.updaters.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stores_for(&self, group: &str) -> &[Store] {
        self.stores.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sampler_entries_for(&self, group: &str) -> &[SamplerEntry] {
        self.samplers.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn plugins_for(&self, group: &str) -> &[Plugin] {
        self.plugins.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Serialize the model into a YAML value tree for the flattener.
    ///
    /// Section and entry order mirror the model's insertion order; optional
    /// fields are emitted as-is and rely on the flattener's truthiness
    /// contract to drop empty leaves.
    pub fn to_value(&self) -> Value {
        let mut root = Mapping::new();

        let mut endpoints = Mapping::new();
        for ep in self.endpoints.values() {
            let mut auth = Mapping::new();
            auth.insert(key("name"), str_value(&ep.auth.name));
            auth.insert(key("config"), Value::Mapping(ep.auth.config.clone()));

            let mut entry = Mapping::new();
            entry.insert(key("host"), str_value(&ep.host));
            entry.insert(key("port"), Value::from(u64::from(ep.port)));
            entry.insert(key("xprt"), str_value(&ep.xprt));
            entry.insert(key("auth"), Value::Mapping(auth));
            endpoints.insert(str_value(&ep.name), Value::Mapping(entry));
        }
        root.insert(key("endpoints"), Value::Mapping(endpoints));

        let mut groups = Mapping::new();
        for group in self.groups.values() {
            let mut entry = Mapping::new();
            entry.insert(key("endpoints"), str_seq(&group.endpoints));
            entry.insert(key("interfaces"), str_seq(&group.interfaces));
            groups.insert(str_value(&group.name), Value::Mapping(entry));
        }
        root.insert(key("groups"), Value::Mapping(groups));

        let mut aggregators = Mapping::new();
        for (group, aggs) in &self.aggregators {
            let items = aggs
                .iter()
                .map(|agg| {
                    let mut entry = Mapping::new();
                    entry.insert(key("name"), str_value(&agg.name));
                    entry.insert(key("endpoint"), str_value(&agg.endpoint));
                    entry.insert(key("state"), str_value(agg.state.as_str()));
                    Value::Mapping(entry)
                })
                .collect();
            aggregators.insert(str_value(group), Value::Sequence(items));
        }
        root.insert(key("aggregators"), Value::Mapping(aggregators));

        let mut producers = Mapping::new();
        for (group, prods) in &self.producers {
            let items = prods
                .iter()
                .map(|p| {
                    let mut entry = Mapping::new();
                    entry.insert(key("name"), str_value(&p.name));
                    entry.insert(key("endpoint"), str_value(&p.endpoint));
                    entry.insert(key("type"), str_value(p.kind.as_str()));
                    entry.insert(key("reconnect"), str_value(&p.reconnect));
                    entry.insert(key("updaters"), str_seq(&p.updaters));
                    if let Some(regex) = &p.start_regex {
                        entry.insert(key("regex"), str_value(regex));
                    }
                    Value::Mapping(entry)
                })
                .collect();
            producers.insert(str_value(group), Value::Sequence(items));
        }
        root.insert(key("producers"), Value::Mapping(producers));

        let mut updaters = Mapping::new();
        for (group, list) in &self.updaters {
            let mut by_name = Mapping::new();
            for u in list {
                let mut entry = Mapping::new();
                entry.insert(key("interval"), str_value(&u.interval));
                let sets = u
                    .sets
                    .iter()
                    .map(|s| {
                        let mut m = Mapping::new();
                        m.insert(key("regex"), str_value(&s.regex));
                        m.insert(key("field"), str_value(s.field.as_str()));
                        Value::Mapping(m)
                    })
                    .collect();
                entry.insert(key("sets"), Value::Sequence(sets));
                let matchers = u
                    .producers
                    .iter()
                    .map(|m| {
                        let mut map = Mapping::new();
                        map.insert(key("regex"), str_value(&m.regex));
                        Value::Mapping(map)
                    })
                    .collect();
                entry.insert(key("producers"), Value::Sequence(matchers));
                if let Some(push) = &u.push {
                    entry.insert(key("push"), str_value(push));
                }
                if let Some(auto) = u.auto {
                    entry.insert(key("auto"), Value::from(auto));
                }
                by_name.insert(str_value(&u.name), Value::Mapping(entry));
            }
            updaters.insert(str_value(group), Value::Mapping(by_name));
        }
        root.insert(key("updaters"), Value::Mapping(updaters));

        let mut stores = Mapping::new();
        for (group, list) in &self.stores {
            let mut by_name = Mapping::new();
            for store in list {
                let mut plugin = Mapping::new();
                plugin.insert(key("name"), str_value(&store.plugin.name));
                plugin.insert(key("config"), Value::Mapping(store.plugin.config.clone()));

                let mut entry = Mapping::new();
                entry.insert(key("container"), str_value(&store.container));
                entry.insert(key("schema"), str_value(&store.schema));
                entry.insert(key("plugin"), Value::Mapping(plugin));
                if let Some(flush) = &store.flush {
                    entry.insert(key("flush"), str_value(flush));
                }
                by_name.insert(str_value(&store.name), Value::Mapping(entry));
            }
            stores.insert(str_value(group), Value::Mapping(by_name));
        }
        root.insert(key("stores"), Value::Mapping(stores));

        let mut samplers = Mapping::new();
        for (group, entries) in &self.samplers {
            let items = entries
                .iter()
                .map(|e| {
                    let mut entry = Mapping::new();
                    entry.insert(key("plugin"), str_value(&e.plugin));
                    if let Some(interval) = &e.interval {
                        entry.insert(key("interval"), str_value(interval));
                    }
                    if let Some(perm) = &e.perm {
                        entry.insert(key("perm"), str_value(perm));
                    }
                    entry.insert(key("config"), Value::Mapping(e.config.clone()));
                    Value::Mapping(entry)
                })
                .collect();
            samplers.insert(str_value(group), Value::Sequence(items));
        }
        root.insert(key("samplers"), Value::Mapping(samplers));

        let mut plugins = Mapping::new();
        for (group, list) in &self.plugins {
            let mut by_name = Mapping::new();
            for plugin in list {
                by_name.insert(
                    str_value(&plugin.name),
                    Value::Mapping(plugin.config.clone()),
                );
            }
            plugins.insert(str_value(group), Value::Mapping(by_name));
        }
        root.insert(key("plugins"), Value::Mapping(plugins));

        Value::Mapping(root)
    }
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn str_value(text: &str) -> Value {
    Value::String(text.to_string())
}

fn str_seq(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|s| str_value(s)).collect())
}
