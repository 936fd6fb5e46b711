use super::heuristic::TopologyHeuristic;
use super::RelationTable;
use crate::analysis::LogicalContainer;
use crate::feasibility::FeasibilityBackend;
use crate::flow::FlowSchedule;
use crate::machine::MachineGraph;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// Result of an assignment search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(RelationTable),
    /// No complete assignment exists (or the expansion cap was reached).
    Infeasible { message: String },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn relation(&self) -> Option<&RelationTable> {
        match self {
            SearchOutcome::Found(relation) => Some(relation),
            SearchOutcome::Infeasible { .. } => None,
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::Found(relation) => write!(f, "found {}", relation),
            SearchOutcome::Infeasible { message } => write!(f, "infeasible: {}", message),
        }
    }
}

/// Frontier entry; the heap pops the lowest `f`, then the oldest entry.
struct Entry {
    f: f64,
    seq: u64,
    relation: RelationTable,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Orders containers most constrained first: connections, then number of
/// required functions, both descending, then name.
pub fn sort_by_priority(containers: &mut [LogicalContainer]) {
    containers.sort_by(|a, b| {
        b.connections()
            .cmp(&a.connections())
            .then_with(|| b.functions().len().cmp(&a.functions().len()))
            .then_with(|| a.name().cmp(b.name()))
    });
}

/// A* over partial relation tables.
///
/// Containers are assigned one per level in the order they are given, every
/// assignment costing one. Extensions whose fully mapped flow paths cannot be
/// routed are pruned before they reach the frontier, so the first complete
/// table popped is a solution.
pub struct AStarSearch<'a> {
    graph: &'a MachineGraph,
    backend: &'a dyn FeasibilityBackend,
    max_expansions: Option<usize>,
    history: Vec<RelationTable>,
}

impl<'a> AStarSearch<'a> {
    pub fn new(graph: &'a MachineGraph, backend: &'a dyn FeasibilityBackend) -> Self {
        Self {
            graph,
            backend,
            max_expansions: None,
            history: Vec::new(),
        }
    }

    pub fn with_max_expansions(mut self, limit: Option<usize>) -> Self {
        self.max_expansions = limit;
        self
    }

    /// Deepest tables reached during the last search, the last one being the
    /// accepted solution when the search succeeded.
    pub fn history(&self) -> &[RelationTable] {
        &self.history
    }

    pub fn into_history(self) -> Vec<RelationTable> {
        self.history
    }

    pub fn search(
        &mut self,
        containers: &[LogicalContainer],
        schedule: &FlowSchedule,
    ) -> SearchOutcome {
        self.history.clear();
        let heuristic = TopologyHeuristic::new(self.graph, containers);

        let mut frontier = BinaryHeap::new();
        let mut seq = 0;
        frontier.push(Entry {
            f: heuristic.estimate(&RelationTable::new(), containers),
            seq,
            relation: RelationTable::new(),
        });

        let mut expansions = 0;
        let mut best_depth = 0;
        // Depths where some candidate was dropped because flows could not be routed.
        let mut unroutable = vec![false; containers.len()];
        while let Some(Entry { relation, .. }) = frontier.pop() {
            let depth = relation.len();
            if depth > best_depth {
                best_depth = depth;
                self.history.push(relation.clone());
            }
            if depth == containers.len() {
                if self.history.last() != Some(&relation) {
                    self.history.push(relation.clone());
                }
                log::info!(
                    "Assignment found after {} expansions: {}",
                    expansions,
                    relation
                );
                return SearchOutcome::Found(relation);
            }

            expansions += 1;
            if self.max_expansions.is_some_and(|limit| expansions > limit) {
                return SearchOutcome::Infeasible {
                    message: format!("search stopped after {} expansions", expansions - 1),
                };
            }

            let container = &containers[depth];
            for &node in heuristic.candidates(depth) {
                let mut next = relation.clone();
                if !next.insert(container.name(), node) {
                    continue;
                }
                if !self.backend.check_schedule(self.graph, &next, schedule) {
                    unroutable[depth] = true;
                    log::trace!("Pruned {} -> {}: flows cannot be routed", container.name(), node);
                    continue;
                }
                let h = heuristic.estimate(&next, containers);
                if h.is_infinite() {
                    continue;
                }
                seq += 1;
                frontier.push(Entry {
                    f: (depth + 1) as f64 + h,
                    seq,
                    relation: next,
                });
            }
            log::debug!(
                "Expanded {} at depth {}, frontier holds {}",
                relation,
                depth,
                frontier.len()
            );
        }

        let message = match containers.get(best_depth) {
            Some(container) if unroutable[best_depth] => format!(
                "flows of logical container `{}` cannot be routed on this machine",
                container.name()
            ),
            Some(container) => format!(
                "no physical node can host logical container `{}`",
                container.name()
            ),
            None => "the flow schedule cannot be realized on this machine".to_string(),
        };
        log::info!("Assignment search failed: {}", message);
        SearchOutcome::Infeasible { message }
    }
}
