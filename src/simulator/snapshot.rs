use crate::flow::LedgerState;
use crate::protocol::VariableTable;

/// Full capture of the simulator state at one instant.
///
/// Restoring a snapshot replaces the variable table and the in-progress flow
/// state wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    variables: VariableTable,
    flows: LedgerState,
}

impl Snapshot {
    pub fn new(variables: VariableTable, flows: LedgerState) -> Self {
        Self { variables, flows }
    }

    pub fn time(&self) -> f64 {
        self.variables.time()
    }

    pub fn into_parts(self) -> (VariableTable, LedgerState) {
        (self.variables, self.flows)
    }
}
