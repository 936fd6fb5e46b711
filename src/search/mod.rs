//! Assignment of logical containers to physical nodes.

pub mod astar;
pub mod heuristic;
pub mod relation;

pub use astar::{AStarSearch, SearchOutcome, sort_by_priority};
pub use heuristic::{TopologyHeuristic, accepts};
pub use relation::RelationTable;
