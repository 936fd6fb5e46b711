use crate::machine::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Assignment of logical container names to physical nodes.
///
/// Insertion keeps the table injective: a node already in use is never
/// assigned a second name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationTable {
    entries: BTreeMap<String, NodeId>,
}

impl RelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and leaves the table untouched) when `node` is taken.
    pub fn insert(&mut self, name: &str, node: NodeId) -> bool {
        if self.contains_node(node) {
            return false;
        }
        self.entries.insert(name.to_string(), node);
        true
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.entries.get(name).copied()
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.entries.values().any(|n| *n == node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), *node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for RelationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, node)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} -> {}", name, node)?;
        }
        write!(f, "}}")
    }
}
