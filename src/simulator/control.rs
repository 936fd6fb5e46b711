use super::run::Run;
use super::snapshot::Snapshot;
use crate::error::ProtocolError;
use crate::protocol::{ControlNode, IfBlock, ProtocolNodeId, WhileBlock};

/// Exploration progress of one conditional block.
pub(super) struct IfProgress {
    next_branch: usize,
    init: Snapshot,
    longest: Option<(f64, Snapshot)>,
}

fn missing(node_id: ProtocolNodeId, what: &str) -> ProtocolError {
    ProtocolError::MissingControlMetadata {
        node_id,
        what: what.to_string(),
    }
}

impl Run<'_> {
    /// Explores the branches of a conditional one at a time.
    ///
    /// Each visit after the first one marks the end of a branch. The state at
    /// the end of the longest branch is kept and adopted once every branch
    /// has run.
    pub(super) fn simulate_if(
        &mut self,
        id: ProtocolNodeId,
        block: &IfBlock,
        control: &ControlNode,
    ) -> Result<(), ProtocolError> {
        if block.branch_triggers.is_empty() {
            return Err(missing(id, "branch trigger variables"));
        }
        if block.end_variables.is_empty() {
            return Err(missing(id, "end variables"));
        }
        if control.exit_targets.is_empty() {
            return Err(missing(id, "exit targets"));
        }

        if !self.ifs.contains_key(&id) {
            self.start_if(id, block);
        }

        let finished_branch = block
            .end_variables
            .iter()
            .any(|v| self.variables.has_been_written(v));
        if finished_branch {
            let mut progress = self
                .ifs
                .remove(&id)
                .ok_or_else(|| missing(id, "branch progress"))?;

            let duration = self.variables.time() - progress.init.time();
            let longer = progress
                .longest
                .as_ref()
                .is_none_or(|(longest, _)| duration > *longest);
            if longer {
                progress.longest = Some((duration, self.capture()));
            }

            if progress.next_branch < block.branch_triggers.len() {
                log::debug!("if {}: exploring branch {}", id, progress.next_branch);
                self.restore(progress.init.clone());
                let now = self.variables.time();
                self.variables
                    .set(&block.branch_triggers[progress.next_branch], now);
                progress.next_branch += 1;
                for variable in &block.end_variables {
                    self.variables.clear_written(variable);
                }
                self.ifs.insert(id, progress);
            } else {
                self.finish_if(block, progress);
            }
        }

        for target in &control.exit_targets {
            self.enqueue(*target);
        }
        Ok(())
    }

    fn start_if(&mut self, id: ProtocolNodeId, block: &IfBlock) {
        let init = self.capture();

        self.variables.set(&block.executed, 0.0);
        self.variables.block(&block.executed);
        for variable in &block.end_variables {
            self.variables.block(variable);
            self.variables.clear_written(variable);
        }

        let now = self.variables.time();
        self.variables.set(&block.branch_triggers[0], now);
        self.ifs.insert(
            id,
            IfProgress {
                next_branch: 1,
                init,
                longest: None,
            },
        );
    }

    fn finish_if(&mut self, block: &IfBlock, progress: IfProgress) {
        if let Some((duration, state)) = progress.longest {
            log::debug!("if finished, longest branch took {}s", duration);
            self.restore(state);
        }

        let now = self.variables.time();
        for variable in &block.end_variables {
            self.variables.unblock(variable);
            self.variables.set(variable, now);
        }
        self.variables.unblock(&block.executed);
        self.variables.set(&block.executed, 1.0);
    }

    /// Loops run through their own back edges; the control node only tracks
    /// when the loop starts and when its condition stops holding.
    pub(super) fn simulate_while(
        &mut self,
        id: ProtocolNodeId,
        block: &WhileBlock,
        control: &ControlNode,
    ) -> Result<(), ProtocolError> {
        if block.end_variables.is_empty() {
            return Err(missing(id, "end variables"));
        }
        if control.exit_targets.is_empty() {
            return Err(missing(id, "exit targets"));
        }

        if self.whiles.insert(id) {
            for variable in &block.end_variables {
                self.variables.block(variable);
            }
            self.variables.clear_written(&block.executing);
            let now = self.variables.time();
            self.variables.set(&block.trigger, now);
        }

        if self.variables.has_been_written(&block.executing) {
            let now = self.variables.time();
            for variable in &block.end_variables {
                self.variables.unblock(variable);
                self.variables.set(variable, now);
            }
            self.whiles.remove(&id);
        }

        for target in &control.exit_targets {
            self.enqueue(*target);
        }
        Ok(())
    }
}
