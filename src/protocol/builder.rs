use super::blocks::{IfBlock, LogicBlocks, WhileBlock};
use super::graph::{Assignment, ControlNode, NodeKind, ProtocolGraph, ProtocolNodeId};
use super::operation::{Operation, Timing};
use super::variables::TIME_VARIABLE;
use crate::ast::Expression;
use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// Structured protocol source, lowered to a [`ProtocolGraph`] by [`ProtocolBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    Assign {
        variable: String,
        value: Expression,
    },
    Operation {
        operation: Operation,
    },
    If {
        branches: Vec<Branch>,
        #[serde(default)]
        otherwise: Option<Vec<Statement>>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    Parallel {
        lanes: Vec<Vec<Statement>>,
    },
}

/// One guarded arm of an if / else-if chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Kept for readers of the protocol only: the lowered graph explores
    /// every arm regardless of its guard, so it is never evaluated.
    pub condition: Expression,
    pub body: Vec<Statement>,
}

impl Statement {
    pub fn assign(variable: &str, value: Expression) -> Self {
        Statement::Assign {
            variable: variable.to_string(),
            value,
        }
    }

    pub fn operation(operation: Operation) -> Self {
        Statement::Operation { operation }
    }

    /// Continuous flow along `path` at a constant rate in ml/hr.
    pub fn flow(path: &[&str], rate: f64, timing: Timing) -> Self {
        Statement::Operation {
            operation: Operation::ContinuousFlow {
                path: path.iter().map(|s| s.to_string()).collect(),
                rate: Expression::number(rate),
                timing,
            },
        }
    }
}

/// A protocol graph together with the metadata of its control blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Protocol {
    pub graph: ProtocolGraph,
    pub blocks: LogicBlocks,
}

struct Exit {
    node: ProtocolNodeId,
    guard: Option<Expression>,
}

/// Part of the graph with one entry and a set of dangling, guarded exits.
struct Fragment {
    entry: ProtocolNodeId,
    exits: Vec<Exit>,
}

impl Fragment {
    fn single(node: ProtocolNodeId) -> Self {
        Self {
            entry: node,
            exits: vec![Exit { node, guard: None }],
        }
    }
}

/// Lowers [`Statement`]s to a guarded control-flow graph.
///
/// Conditionals become a reset chain, an `if` control node and a junction
/// whose edges start branch *k* while `trigger_k >= 0 && executed == 0`.
/// Every branch stamps the end variable and returns to the `if` node, which
/// explores the branches one after another. Loops follow the same pattern
/// with a head junction testing the condition and a terminating node that
/// writes the `executing` flag.
#[derive(Debug, Default)]
pub struct ProtocolBuilder {
    graph: ProtocolGraph,
    blocks: LogicBlocks,
    next_if: usize,
    next_while: usize,
    next_parallel: usize,
}

impl ProtocolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, statements: &[Statement]) -> Result<Protocol, ProtocolError> {
        let start = self.junction();
        self.graph.set_start(start)?;
        let body = self.lower_sequence(statements)?;
        self.graph.add_edge(start, body.entry, None)?;

        log::debug!(
            "Lowered protocol into {} nodes and {} control blocks",
            self.graph.len(),
            self.blocks.len()
        );
        Ok(Protocol {
            graph: self.graph,
            blocks: self.blocks,
        })
    }

    fn junction(&mut self) -> ProtocolNodeId {
        self.graph
            .add_node(NodeKind::Control(ControlNode::default()))
    }

    fn assignment(&mut self, variable: &str, value: Expression) -> ProtocolNodeId {
        self.graph
            .add_node(NodeKind::Computation(Assignment::new(variable, value)))
    }

    fn connect(&mut self, exits: Vec<Exit>, target: ProtocolNodeId) -> Result<(), ProtocolError> {
        for exit in exits {
            self.graph.add_edge(exit.node, target, exit.guard)?;
        }
        Ok(())
    }

    /// Links `nodes` one after the other with unguarded edges.
    fn chain(&mut self, nodes: &[ProtocolNodeId]) -> Result<(), ProtocolError> {
        for pair in nodes.windows(2) {
            self.graph.add_edge(pair[0], pair[1], None)?;
        }
        Ok(())
    }

    fn lower_sequence(&mut self, statements: &[Statement]) -> Result<Fragment, ProtocolError> {
        let fragments = statements
            .iter()
            .map(|s| self.lower(s))
            .collect::<Result<Vec<_>, _>>()?;

        let mut fragments = fragments.into_iter();
        let Some(first) = fragments.next() else {
            return Ok(Fragment::single(self.junction()));
        };
        let entry = first.entry;
        let mut exits = first.exits;
        for fragment in fragments {
            self.connect(exits, fragment.entry)?;
            exits = fragment.exits;
        }
        Ok(Fragment { entry, exits })
    }

    fn lower(&mut self, statement: &Statement) -> Result<Fragment, ProtocolError> {
        match statement {
            Statement::Assign { variable, value } => {
                Ok(Fragment::single(self.assignment(variable, value.clone())))
            }
            Statement::Operation { operation } => {
                let node = self.graph.add_node(NodeKind::Actuator(operation.clone()));
                Ok(Fragment::single(node))
            }
            Statement::If {
                branches,
                otherwise,
            } => {
                let mut arms: Vec<&[Statement]> =
                    branches.iter().map(|b| b.body.as_slice()).collect();
                if let Some(otherwise) = otherwise {
                    arms.push(otherwise.as_slice());
                }
                self.lower_if(&arms)
            }
            Statement::While { condition, body } => self.lower_while(condition, body),
            Statement::Parallel { lanes } => self.lower_parallel(lanes),
        }
    }

    fn lower_if(&mut self, arms: &[&[Statement]]) -> Result<Fragment, ProtocolError> {
        if arms.is_empty() {
            return Ok(Fragment::single(self.junction()));
        }
        let prefix = format!("__if{}", self.next_if);
        self.next_if += 1;
        let executed = format!("{}_executed", prefix);
        let end = format!("{}_end", prefix);
        let triggers: Vec<String> = (0..arms.len())
            .map(|k| format!("{}_trigger{}", prefix, k))
            .collect();

        let mut reset = vec![self.assignment(&executed, Expression::number(0.0))];
        for trigger in &triggers {
            reset.push(self.assignment(trigger, Expression::number(-1.0)));
        }
        reset.push(self.assignment(&end, Expression::number(-1.0)));
        let if_node = self.junction();
        reset.push(if_node);
        self.chain(&reset)?;

        let dispatch = self.junction();
        self.graph.set_exit_targets(if_node, vec![dispatch])?;

        for (arm, trigger) in arms.iter().zip(&triggers) {
            let body = self.lower_sequence(arm)?;
            let closing = self.assignment(&end, Expression::var(TIME_VARIABLE));
            self.connect(body.exits, closing)?;
            self.graph.add_edge(closing, if_node, None)?;

            let guard = Expression::var(trigger)
                .ge(Expression::number(0.0))
                .and(Expression::var(&executed).equals(Expression::number(0.0)));
            self.graph.add_edge(dispatch, body.entry, Some(guard))?;
        }

        self.blocks.register_if(
            if_node,
            IfBlock {
                branch_triggers: triggers,
                end_variables: vec![end],
                executed: executed.clone(),
            },
        );

        Ok(Fragment {
            entry: reset[0],
            exits: vec![Exit {
                node: dispatch,
                guard: Some(Expression::var(&executed).equals(Expression::number(1.0))),
            }],
        })
    }

    fn lower_while(
        &mut self,
        condition: &Expression,
        body: &[Statement],
    ) -> Result<Fragment, ProtocolError> {
        let prefix = format!("__while{}", self.next_while);
        self.next_while += 1;
        let trigger = format!("{}_trigger", prefix);
        let end = format!("{}_end", prefix);
        let executing = format!("{}_executing", prefix);

        let reset_end = self.assignment(&end, Expression::number(-1.0));
        let reset_executing = self.assignment(&executing, Expression::number(-1.0));
        let while_node = self.junction();
        self.chain(&[reset_end, reset_executing, while_node])?;

        let dispatch = self.junction();
        self.graph.set_exit_targets(while_node, vec![dispatch])?;

        let head = self.junction();
        let running = Expression::var(&end).lt(Expression::number(0.0));
        self.graph.add_edge(dispatch, head, Some(running))?;

        let body = self.lower_sequence(body)?;
        self.graph
            .add_edge(head, body.entry, Some(condition.clone()))?;
        self.connect(body.exits, head)?;

        let terminate = self.assignment(&executing, Expression::var(TIME_VARIABLE));
        self.graph
            .add_edge(head, terminate, Some(condition.clone().negate()))?;
        self.graph.add_edge(terminate, while_node, None)?;

        self.blocks.register_while(
            while_node,
            WhileBlock {
                trigger,
                end_variables: vec![end.clone()],
                executing,
            },
        );

        Ok(Fragment {
            entry: reset_end,
            exits: vec![Exit {
                node: dispatch,
                guard: Some(Expression::var(&end).ge(Expression::number(0.0))),
            }],
        })
    }

    /// Lanes start together and the continuation waits for the last one.
    fn lower_parallel(&mut self, lanes: &[Vec<Statement>]) -> Result<Fragment, ProtocolError> {
        if lanes.is_empty() {
            return Ok(Fragment::single(self.junction()));
        }
        let done = format!("__parallel{}_done", self.next_parallel);
        self.next_parallel += 1;

        let reset = self.assignment(&done, Expression::number(0.0));
        let fork = self.junction();
        let join = self.junction();
        self.chain(&[reset, fork])?;

        for lane in lanes {
            let body = self.lower_sequence(lane)?;
            self.graph.add_edge(fork, body.entry, None)?;
            let count = self.assignment(
                &done,
                Expression::var(&done).plus(Expression::number(1.0)),
            );
            self.connect(body.exits, count)?;
            self.graph.add_edge(count, join, None)?;
        }

        Ok(Fragment {
            entry: reset,
            exits: vec![Exit {
                node: join,
                guard: Some(Expression::var(&done).equals(Expression::number(lanes.len() as f64))),
            }],
        })
    }
}
