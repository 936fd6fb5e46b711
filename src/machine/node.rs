use super::capability::{Bounds, Capability, FunctionSet};
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Stable handle of a node inside a [`super::MachineGraph`].
pub type NodeId = usize;

/// Identifier of a valve configuration. Configuration `0` is always closed.
pub type ConfigurationId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerClass {
    /// Reservoirs that only feed or only drain the machine.
    Open,
    /// Chambers that hold liquid while operations happen inside them.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpDirection {
    /// Liquid enters through the pump's incoming tubes and leaves through its outgoing ones.
    Unidirectional,
    Bidirectional,
}

/// Port groups connected by each valve configuration.
///
/// Groups are kept as connectivity components: overlapping groups in one
/// configuration are merged, and groups with fewer than two ports are
/// dropped since they connect nothing. Deserialized tables are rebuilt
/// through [`TruthTable::add_configuration`], so these rules hold for them too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTruthTable", into = "RawTruthTable")]
pub struct TruthTable {
    configurations: BTreeMap<ConfigurationId, Vec<BTreeSet<u16>>>,
}

impl Default for TruthTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TruthTable {
    pub fn new() -> Self {
        let mut configurations = BTreeMap::new();
        configurations.insert(0, Vec::new());
        Self { configurations }
    }

    pub fn with_configuration<G, P>(mut self, id: ConfigurationId, groups: G) -> Self
    where
        G: IntoIterator<Item = P>,
        P: IntoIterator<Item = u16>,
    {
        self.add_configuration(id, groups);
        self
    }

    pub fn add_configuration<G, P>(&mut self, id: ConfigurationId, groups: G)
    where
        G: IntoIterator<Item = P>,
        P: IntoIterator<Item = u16>,
    {
        if id == 0 {
            return;
        }
        let groups: Vec<BTreeSet<u16>> = groups
            .into_iter()
            .map(|g| g.into_iter().collect())
            .collect();
        self.configurations.insert(id, merge_groups(groups));
    }

    pub fn configurations(&self) -> impl Iterator<Item = (ConfigurationId, &[BTreeSet<u16>])> {
        self.configurations.iter().map(|(id, g)| (*id, g.as_slice()))
    }

    pub fn groups(&self, id: ConfigurationId) -> Option<&[BTreeSet<u16>]> {
        self.configurations.get(&id).map(Vec::as_slice)
    }

    /// Whether some configuration lets liquid pass from `a` to `b`.
    pub fn connects(&self, a: u16, b: u16) -> bool {
        self.configurations
            .values()
            .flatten()
            .any(|group| group.contains(&a) && group.contains(&b))
    }

    /// Configuration whose groups are exactly `components`.
    pub fn exact_match(&self, components: &[BTreeSet<u16>]) -> Option<ConfigurationId> {
        self.configurations
            .iter()
            .find(|(_, groups)| groups.as_slice() == components)
            .map(|(id, _)| *id)
    }

    /// Whether some configuration contains every component inside one of its groups.
    pub fn admits(&self, components: &[BTreeSet<u16>]) -> bool {
        self.configurations.values().any(|groups| {
            components
                .iter()
                .all(|c| groups.iter().any(|g| c.is_subset(g)))
        })
    }

    pub(super) fn validate(&self, ports: u16) -> Result<(), GraphError> {
        for port in self.configurations.values().flatten().flatten() {
            if *port >= ports {
                return Err(GraphError::InvalidTruthTable {
                    ports,
                    port: *port,
                });
            }
        }
        Ok(())
    }
}

/// Serialized form of a [`TruthTable`].
///
/// Configuration ids are string keys: machine nodes are read through an
/// internally tagged enum, which hands map keys over as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTruthTable {
    configurations: BTreeMap<String, Vec<BTreeSet<u16>>>,
}

impl TryFrom<RawTruthTable> for TruthTable {
    type Error = GraphError;

    fn try_from(raw: RawTruthTable) -> Result<Self, Self::Error> {
        let mut table = TruthTable::new();
        for (key, groups) in raw.configurations {
            let id: ConfigurationId = key.trim().parse().map_err(|_| {
                GraphError::Definition(format!("invalid valve configuration id '{}'", key))
            })?;
            if id == 0 {
                if !merge_groups(groups).is_empty() {
                    return Err(GraphError::Definition(
                        "valve configuration 0 must keep every port closed".to_string(),
                    ));
                }
                continue;
            }
            table.add_configuration(id, groups);
        }
        Ok(table)
    }
}

impl From<TruthTable> for RawTruthTable {
    fn from(table: TruthTable) -> Self {
        Self {
            configurations: table
                .configurations
                .into_iter()
                .map(|(id, groups)| (id.to_string(), groups))
                .collect(),
        }
    }
}

/// Merges overlapping port groups into sorted connectivity components.
pub fn merge_groups(groups: Vec<BTreeSet<u16>>) -> Vec<BTreeSet<u16>> {
    let mut merged: Vec<BTreeSet<u16>> = Vec::new();
    for group in groups {
        let mut current = group;
        let mut i = 0;
        while i < merged.len() {
            if merged[i].is_disjoint(&current) {
                i += 1;
            } else {
                current.extend(merged.swap_remove(i));
                i = 0;
            }
        }
        merged.push(current);
    }
    merged.retain(|g| g.len() > 1);
    merged.sort();
    merged
}

/// Node of the physical machine graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhysicalNode {
    Container {
        ports: u16,
        class: ContainerClass,
        capacity: f64,
        #[serde(default)]
        capabilities: Vec<Capability>,
    },
    Valve {
        ports: u16,
        table: TruthTable,
    },
    Pump {
        ports: u16,
        direction: PumpDirection,
        rates: Bounds,
    },
}

impl PhysicalNode {
    pub fn ports(&self) -> u16 {
        match self {
            PhysicalNode::Container { ports, .. }
            | PhysicalNode::Valve { ports, .. }
            | PhysicalNode::Pump { ports, .. } => *ports,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, PhysicalNode::Container { .. })
    }

    pub fn container_class(&self) -> Option<ContainerClass> {
        match self {
            PhysicalNode::Container { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn capabilities(&self) -> &[Capability] {
        match self {
            PhysicalNode::Container { capabilities, .. } => capabilities,
            _ => &[],
        }
    }

    pub fn functions(&self) -> FunctionSet {
        self.capabilities().iter().map(|c| c.function).collect()
    }
}
