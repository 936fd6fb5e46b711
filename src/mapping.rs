//! Mapping orchestrator: protocol analysis followed by assignment search.

use crate::analysis::{AnalysisReport, ProtocolSimulator};
use crate::config::SearchConfig;
use crate::error::MappingError;
use crate::feasibility::{FeasibilityBackend, RoutingBackend};
use crate::machine::{MachineGraph, NodeId};
use crate::search::{AStarSearch, RelationTable, SearchOutcome, sort_by_priority};

/// Finds where every container of a protocol lives on a machine.
pub struct FluidicModelMapping {
    graph: MachineGraph,
    config: SearchConfig,
    backend: Box<dyn FeasibilityBackend>,
    report: Option<AnalysisReport>,
    relation: Option<RelationTable>,
    history: Vec<RelationTable>,
}

pub struct FluidicModelMappingBuilder {
    graph: MachineGraph,
    config: SearchConfig,
    backend: Option<Box<dyn FeasibilityBackend>>,
}

impl FluidicModelMappingBuilder {
    pub fn new(graph: MachineGraph) -> Self {
        Self {
            graph,
            config: SearchConfig::default(),
            backend: None,
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default [`RoutingBackend`].
    pub fn with_backend(mut self, backend: Box<dyn FeasibilityBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> FluidicModelMapping {
        let backend = self
            .backend
            .unwrap_or_else(|| Box::new(RoutingBackend::new()));
        FluidicModelMapping {
            graph: self.graph,
            config: self.config,
            backend,
            report: None,
            relation: None,
            history: Vec::new(),
        }
    }
}

impl FluidicModelMapping {
    pub fn new(graph: MachineGraph) -> Self {
        Self::builder(graph).build()
    }

    pub fn builder(graph: MachineGraph) -> FluidicModelMappingBuilder {
        FluidicModelMappingBuilder::new(graph)
    }

    /// Analyses the protocol and searches an assignment for its containers.
    ///
    /// An infeasible assignment is a regular outcome; only malformed protocols
    /// are errors. A previous relation is discarded before searching.
    pub fn find_relation(
        &mut self,
        simulator: &mut dyn ProtocolSimulator,
    ) -> Result<SearchOutcome, MappingError> {
        self.relation = None;
        self.history.clear();

        let mut report = simulator.analyse()?;
        sort_by_priority(&mut report.containers);
        log::info!(
            "Mapping {} containers onto a machine of {} nodes",
            report.containers.len(),
            self.graph.len()
        );

        let mut search = AStarSearch::new(&self.graph, self.backend.as_ref())
            .with_max_expansions(self.config.max_expansions);
        let outcome = search.search(&report.containers, &report.schedule);
        self.history = search.into_history();

        if let SearchOutcome::Found(relation) = &outcome {
            self.relation = Some(relation.clone());
        }
        self.report = Some(report);
        Ok(outcome)
    }

    /// Physical node hosting `name` in the last relation found.
    pub fn get_mapped_component(&self, name: &str) -> Result<NodeId, MappingError> {
        let relation = self.relation.as_ref().ok_or(MappingError::NoRelation)?;
        relation
            .get(name)
            .ok_or_else(|| MappingError::NotFound(name.to_string()))
    }

    pub fn relation(&self) -> Option<&RelationTable> {
        self.relation.as_ref()
    }

    pub fn history(&self) -> &[RelationTable] {
        &self.history
    }

    /// Analysis of the last protocol given to [`Self::find_relation`], with
    /// containers in search order.
    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn graph(&self) -> &MachineGraph {
        &self.graph
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}
