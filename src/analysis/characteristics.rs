use crate::machine::{ContainerClass, Function, FunctionSet, WorkingRange};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Requirements a protocol places on one named container.
///
/// Built up while the protocol is simulated; every observation can only widen
/// the requirements.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalContainer {
    name: String,
    arriving: BTreeSet<String>,
    leaving: BTreeSet<String>,
    functions: FunctionSet,
    working_ranges: BTreeMap<Function, WorkingRange>,
}

impl LogicalContainer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            arriving: BTreeSet::new(),
            leaving: BTreeSet::new(),
            functions: FunctionSet::empty(),
            working_ranges: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Containers liquid arrives from.
    pub fn sources(&self) -> &BTreeSet<String> {
        &self.arriving
    }

    /// Containers liquid leaves to.
    pub fn destinations(&self) -> &BTreeSet<String> {
        &self.leaving
    }

    pub fn arriving_connections(&self) -> usize {
        self.arriving.len()
    }

    pub fn leaving_connections(&self) -> usize {
        self.leaving.len()
    }

    pub fn connections(&self) -> usize {
        self.arriving.len() + self.leaving.len()
    }

    /// Every container this one exchanges liquid with.
    pub fn neighbours(&self) -> impl Iterator<Item = &str> {
        self.arriving
            .union(&self.leaving)
            .map(String::as_str)
    }

    pub fn functions(&self) -> FunctionSet {
        self.functions
    }

    pub fn working_ranges(&self) -> &BTreeMap<Function, WorkingRange> {
        &self.working_ranges
    }

    pub fn working_range(&self, function: Function) -> Option<&WorkingRange> {
        self.working_ranges.get(&function)
    }

    /// Containers hosting operations, or sitting in the middle of a flow,
    /// need a closed chamber.
    pub fn class(&self) -> ContainerClass {
        let flows_through = !self.arriving.is_empty() && !self.leaving.is_empty();
        if !self.functions.is_empty() || flows_through {
            ContainerClass::Closed
        } else {
            ContainerClass::Open
        }
    }

    /// One port for incoming liquid and one for outgoing liquid, when used.
    pub fn minimum_ports(&self) -> u16 {
        u16::from(!self.arriving.is_empty()) + u16::from(!self.leaving.is_empty())
    }

    pub(crate) fn record_arriving(&mut self, from: &str) {
        if from != self.name {
            self.arriving.insert(from.to_string());
        }
    }

    pub(crate) fn record_leaving(&mut self, to: &str) {
        if to != self.name {
            self.leaving.insert(to.to_string());
        }
    }

    pub(crate) fn record_function(&mut self, function: Function, range: &WorkingRange) {
        self.functions.insert(function);
        self.working_ranges
            .entry(function)
            .or_default()
            .widen(range);
    }
}

impl fmt::Display for LogicalContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name: {};connections: {};functions: {};class: {:?};working ranges[",
            self.name,
            self.connections(),
            self.functions,
            self.class()
        )?;
        for (function, range) in &self.working_ranges {
            if !range.is_empty() {
                write!(f, "{}:{},", function, range)?;
            }
        }
        write!(f, "]")
    }
}
