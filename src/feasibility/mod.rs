//! Physical realizability of flow requirements under a relation table.

pub mod routing;

pub use routing::RoutingBackend;

use crate::flow::{FlowSchedule, TimeWindow};
use crate::machine::MachineGraph;
use crate::search::RelationTable;

/// Decides whether a machine can carry the flows of a schedule.
///
/// Only paths whose containers are all present in `relation` are checked, so
/// the same call serves partial assignments during search and the final one.
pub trait FeasibilityBackend {
    fn check_window(
        &self,
        graph: &MachineGraph,
        relation: &RelationTable,
        window: &TimeWindow,
    ) -> bool;

    fn check_schedule(
        &self,
        graph: &MachineGraph,
        relation: &RelationTable,
        schedule: &FlowSchedule,
    ) -> bool {
        schedule
            .windows()
            .iter()
            .all(|window| self.check_window(graph, relation, window))
    }
}
