//! Flow requirements: elementary facts, merged paths and their time windows.

pub mod ledger;
pub mod path;

pub use ledger::{FlowFact, FlowLedger, LedgerState};
pub use path::{FlowPath, FlowSchedule, Rate, TimeWindow};
