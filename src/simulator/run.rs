use super::ActuatorExecutor;
use super::control::IfProgress;
use super::snapshot::Snapshot;
use crate::ast::ExpressionEngine;
use crate::config::SimulationConfig;
use crate::error::ProtocolError;
use crate::flow::Rate;
use crate::protocol::{LogicBlock, NodeKind, Operation, Protocol, ProtocolNodeId, VariableTable};
use ahash::{AHashMap, AHashSet};

/// State of a single simulation run.
pub(super) struct Run<'a> {
    pub(super) protocol: &'a Protocol,
    pub(super) config: &'a SimulationConfig,
    pub(super) executor: &'a mut dyn ActuatorExecutor,
    pub(super) variables: VariableTable,
    pub(super) ifs: AHashMap<ProtocolNodeId, IfProgress>,
    pub(super) whiles: AHashSet<ProtocolNodeId>,
    pub(super) steps: usize,
    worklist: Vec<ProtocolNodeId>,
}

impl<'a> Run<'a> {
    pub(super) fn new(
        protocol: &'a Protocol,
        config: &'a SimulationConfig,
        executor: &'a mut dyn ActuatorExecutor,
    ) -> Self {
        Self {
            protocol,
            config,
            executor,
            variables: VariableTable::new(),
            ifs: AHashMap::new(),
            whiles: AHashSet::new(),
            steps: 0,
            worklist: Vec::new(),
        }
    }

    pub(super) fn execute(&mut self) -> Result<(), ProtocolError> {
        let protocol = self.protocol;
        protocol.graph.node(protocol.graph.start())?;
        self.worklist.push(protocol.graph.start());

        while let Some(id) = self.worklist.pop() {
            self.steps += 1;
            if self.steps > self.config.max_steps {
                return Err(ProtocolError::StepLimitExceeded(self.config.max_steps));
            }

            let node = protocol.graph.node(id)?;
            match &node.kind {
                NodeKind::Computation(assignment) => {
                    let value = ExpressionEngine::new(&self.variables).evaluate(&assignment.value)?;
                    self.variables.set(&assignment.variable, value.as_number());
                    self.enqueue_successors(id)?;
                }
                NodeKind::Actuator(operation) => {
                    self.actuate(id, operation)?;
                    self.enqueue_successors(id)?;
                }
                NodeKind::Control(control) => match protocol.blocks.get(id) {
                    Some(LogicBlock::If(block)) => self.simulate_if(id, block, control)?,
                    Some(LogicBlock::While(block)) => self.simulate_while(id, block, control)?,
                    None => self.enqueue_successors(id)?,
                },
            }
        }

        if !self.ifs.is_empty() || !self.whiles.is_empty() {
            log::warn!(
                "Simulation ended with {} conditionals and {} loops still open",
                self.ifs.len(),
                self.whiles.len()
            );
        }
        self.executor.flush();
        Ok(())
    }

    /// Pushes `id` unless it is already waiting.
    pub(super) fn enqueue(&mut self, id: ProtocolNodeId) {
        if !self.worklist.contains(&id) {
            self.worklist.push(id);
        }
    }

    fn enqueue_successors(&mut self, id: ProtocolNodeId) -> Result<(), ProtocolError> {
        let protocol = self.protocol;
        for edge in protocol.graph.successors(id) {
            let open = match &edge.guard {
                None => true,
                Some(guard) => ExpressionEngine::new(&self.variables)
                    .evaluate_bool(guard, "guard")
                    .map_err(|e| ProtocolError::UnresolvableGuard {
                        source_node: id,
                        target_node: edge.target,
                        reason: e.to_string(),
                    })?,
            };
            if open {
                self.enqueue(edge.target);
            }
        }
        Ok(())
    }

    fn actuate(&mut self, id: ProtocolNodeId, operation: &Operation) -> Result<(), ProtocolError> {
        let now = self.variables.time();
        log::debug!("t={} node {}: {}", now, id, operation);

        match operation {
            Operation::ContinuousFlow { path, rate, timing } => {
                if path.len() < 2 {
                    return Err(ProtocolError::ShortFlowPath {
                        node_id: id,
                        found: path.len(),
                    });
                }
                let rate = ExpressionEngine::new(&self.variables).evaluate_number(rate)?;
                let start = timing.start.unwrap_or(now);
                let until = (timing.duration > 0.0).then(|| start + timing.duration);
                self.executor
                    .continuous_flow(path, Rate::ml_per_hr(rate), start, until);
            }
            Operation::StopFlow { path } => {
                if path.len() < 2 {
                    return Err(ProtocolError::ShortFlowPath {
                        node_id: id,
                        found: path.len(),
                    });
                }
                self.executor.stop_flow(path, now);
            }
            other => {
                for usage in other.function_uses() {
                    self.executor.use_function(&usage);
                }
                if let Some(target) = other.measurement_target() {
                    self.variables.set(target, self.config.measurement_value);
                }
            }
        }

        if let Some(timing) = operation.timing() {
            let end = timing.start.unwrap_or(now) + timing.duration;
            if end > now {
                self.variables.set_time(end);
            }
        }
        Ok(())
    }

    pub(super) fn capture(&self) -> Snapshot {
        Snapshot::new(self.variables.clone(), self.executor.flow_state())
    }

    /// Overwrites the current state with `snapshot`. Flows reached so far are
    /// settled first so explored timelines still reach the schedule.
    pub(super) fn restore(&mut self, snapshot: Snapshot) {
        self.executor.settle(self.variables.time());
        let (variables, flows) = snapshot.into_parts();
        self.variables = variables;
        self.executor.restore_flow_state(flows);
    }
}
