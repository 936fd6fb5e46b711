use super::AnalysisReport;
use super::characteristics::LogicalContainer;
use crate::flow::{FlowLedger, LedgerState, Rate};
use crate::protocol::FunctionUse;
use crate::simulator::ActuatorExecutor;
use ahash::AHashMap;
use itertools::Itertools;

/// Actuator executor that records what every container is asked to do
/// instead of driving hardware.
#[derive(Debug, Default)]
pub struct CharacteristicsExecutor {
    containers: Vec<LogicalContainer>,
    index: AHashMap<String, usize>,
    ledger: FlowLedger,
}

impl CharacteristicsExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn container(&mut self, name: &str) -> &mut LogicalContainer {
        let position = match self.index.get(name) {
            Some(position) => *position,
            None => {
                self.containers.push(LogicalContainer::new(name));
                self.index.insert(name.to_string(), self.containers.len() - 1);
                self.containers.len() - 1
            }
        };
        &mut self.containers[position]
    }

    fn record_connections(&mut self, path: &[String]) {
        for (from, to) in path.iter().tuple_windows() {
            self.container(from).record_leaving(to);
            self.container(to).record_arriving(from);
        }
    }

    pub fn containers(&self) -> &[LogicalContainer] {
        &self.containers
    }

    pub fn ledger(&self) -> &FlowLedger {
        &self.ledger
    }

    /// Containers in first-seen order plus the committed schedule.
    pub fn into_report(self) -> AnalysisReport {
        AnalysisReport {
            containers: self.containers,
            schedule: self.ledger.into_schedule(),
        }
    }
}

impl ActuatorExecutor for CharacteristicsExecutor {
    fn continuous_flow(&mut self, path: &[String], rate: Rate, start: f64, until: Option<f64>) {
        self.record_connections(path);
        for (from, to) in path.iter().tuple_windows() {
            match until {
                Some(until) => self.ledger.record_flow_until(from, to, rate, start, until),
                None => self.ledger.record_flow(from, to, rate, start),
            }
        }
    }

    fn stop_flow(&mut self, path: &[String], at_time: f64) {
        for (from, to) in path.iter().tuple_windows() {
            self.ledger.stop_flow(from, to, at_time);
        }
    }

    fn use_function(&mut self, usage: &FunctionUse<'_>) {
        self.container(usage.container)
            .record_function(usage.function, &usage.range);
    }

    fn flow_state(&self) -> LedgerState {
        self.ledger.state().clone()
    }

    fn restore_flow_state(&mut self, state: LedgerState) {
        self.ledger.restore(state);
    }

    fn settle(&mut self, upto: f64) {
        self.ledger.settle(upto);
    }

    fn flush(&mut self) {
        self.ledger.flush();
    }
}
