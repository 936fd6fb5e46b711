//! Tests for the protocol flow simulator and its building blocks.
mod common;
use common::*;
use fluidmap::analysis::CharacteristicsExecutor;
use fluidmap::ast::ExpressionEngine;
use fluidmap::prelude::*;
use fluidmap::protocol::{
    ControlNode, IfBlock, LogicBlocks, NodeKind, ProtocolGraph, VariableTable, WhileBlock,
};

fn run(
    statements: &[Statement],
    config: SimulationConfig,
) -> std::result::Result<VariableTable, ProtocolError> {
    let protocol = ProtocolBuilder::new()
        .build(statements)
        .expect("protocol should lower");
    let simulator = FlowSimulator::new(protocol).with_config(config);
    let mut executor = CharacteristicsExecutor::new();
    simulator.simulate(&mut executor)
}

/// Single control node registered with `block`, used to feed broken metadata.
fn lone_control_node(exit_targets: Vec<usize>, block: Option<fluidmap::protocol::LogicBlock>) -> Protocol {
    let mut graph = ProtocolGraph::new();
    let node = graph.add_node(NodeKind::Control(ControlNode::default()));
    for _ in &exit_targets {
        graph.add_node(NodeKind::Control(ControlNode::default()));
    }
    graph.set_start(node).expect("start exists");
    graph
        .set_exit_targets(node, exit_targets)
        .expect("exit targets exist");

    let mut blocks = LogicBlocks::new();
    match block {
        Some(fluidmap::protocol::LogicBlock::If(block)) => blocks.register_if(node, block),
        Some(fluidmap::protocol::LogicBlock::While(block)) => blocks.register_while(node, block),
        None => {}
    }
    Protocol { graph, blocks }
}

#[cfg(test)]
mod expression_tests {
    use super::*;

    #[test]
    fn test_arithmetic_and_comparison() {
        let mut variables = VariableTable::new();
        variables.set("od", 450.0);
        let engine = ExpressionEngine::new(&variables);

        let rate = Expression::number(300.0)
            .minus(Expression::var("od").divided_by(Expression::number(3.0)));
        assert_eq!(engine.evaluate_number(&rate), Ok(150.0));

        let guard = Expression::var("od")
            .lt(Expression::number(600.0))
            .and(Expression::var("time").ge(Expression::number(0.0)));
        assert_eq!(engine.evaluate_bool(&guard, "guard"), Ok(true));
    }

    #[test]
    fn test_flags_compare_as_numbers() {
        let mut variables = VariableTable::new();
        variables.set("executed", 1.0);
        let engine = ExpressionEngine::new(&variables);

        let guard = Expression::var("executed").equals(Expression::boolean(true));
        assert_eq!(engine.evaluate(&guard), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(600.0).to_string(), "600");
        assert_eq!(Value::Number(0.25).to_string(), "0.25");
        assert_eq!(Value::Number(-1e19).to_string(), "-10000000000000000000");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_unknown_variable_is_reported() {
        let variables = VariableTable::new();
        let engine = ExpressionEngine::new(&variables);
        let result = engine.evaluate(&Expression::var("missing"));
        assert_eq!(result, Err(ProtocolError::UnknownVariable("missing".to_string())));
    }

    #[test]
    fn test_type_mismatch_in_arithmetic() {
        let variables = VariableTable::new();
        let engine = ExpressionEngine::new(&variables);
        let result = engine.evaluate(&Expression::number(1.0).plus(Expression::boolean(true)));
        assert!(matches!(result, Err(ProtocolError::TypeMismatch { .. })));
    }

    #[test]
    fn test_short_circuit_skips_unknown_variable() {
        let variables = VariableTable::new();
        let engine = ExpressionEngine::new(&variables);
        let guard = Expression::boolean(false).and(Expression::var("missing").gt(Expression::number(0.0)));
        assert_eq!(engine.evaluate_bool(&guard, "guard"), Ok(false));
    }
}

#[cfg(test)]
mod variable_tests {
    use super::*;

    #[test]
    fn test_time_is_always_present() {
        let variables = VariableTable::new();
        assert_eq!(variables.time(), 0.0);
        assert_eq!(variables.value("time"), Some(0.0));
    }

    #[test]
    fn test_blocked_write_is_flagged_but_not_visible() {
        let mut variables = VariableTable::new();
        variables.set("end", -1.0);
        variables.clear_written("end");
        variables.block("end");

        variables.set("end", 12.0);
        assert!(variables.has_been_written("end"));
        assert_eq!(variables.value("end"), Some(-1.0));

        variables.unblock("end");
        variables.set("end", 12.0);
        assert_eq!(variables.value("end"), Some(12.0));
    }
}

#[cfg(test)]
mod control_flow_tests {
    use super::*;

    #[test]
    fn test_loop_runs_until_condition_fails() {
        let variables = run(
            &switching_loop(3, 300.0),
            SimulationConfig::default(),
        )
        .expect("simulation should succeed");

        assert_eq!(variables.value("counter"), Some(3.0));
        assert_eq!(variables.time(), 3.0 * 3600.0);
    }

    #[test]
    fn test_measurement_ends_turbidostat_loop() {
        let variables = run(
            &turbidostat(),
            SimulationConfig::default().with_measurement_value(700.0),
        )
        .expect("simulation should succeed");

        assert_eq!(variables.value("od"), Some(700.0));
        assert_eq!(variables.time(), 32.0);
    }

    #[test]
    fn test_default_reading_ends_turbidostat_loop() {
        let protocol = ProtocolBuilder::new()
            .build(&turbidostat())
            .expect("protocol should lower");
        let report = FlowSimulator::new(protocol)
            .analyse()
            .expect("default settings terminate");

        assert_eq!(report.containers.len(), 3);
        assert_eq!(report.schedule.windows().len(), 1);
    }

    #[test]
    fn test_conditional_continues_from_longest_branch() {
        let variables = run(&if_collision(), SimulationConfig::default())
            .expect("simulation should succeed");

        // Longest branch ends at 22s, the trailing flow is scheduled until 25s.
        assert_eq!(variables.time(), 25.0);
        assert_eq!(variables.value("__if0_executed"), Some(1.0));
    }

    #[test]
    fn test_else_if_chain_explores_every_branch() {
        let statements = vec![Statement::If {
            branches: vec![
                fluidmap::protocol::Branch {
                    condition: Expression::boolean(true),
                    body: vec![Statement::flow(&["A", "B"], 300.0, Timing::now(5.0))],
                },
                fluidmap::protocol::Branch {
                    condition: Expression::boolean(false),
                    body: vec![Statement::flow(&["A", "C"], 300.0, Timing::now(40.0))],
                },
            ],
            otherwise: Some(vec![Statement::flow(&["A", "D"], 300.0, Timing::now(8.0))]),
        }];

        let report = analyse(&statements);
        assert_eq!(report.schedule.distinct_paths().len(), 3);
        assert_eq!(report.container("A").map(|a| a.connections()), Some(3));
    }

    #[test]
    fn test_branch_conditions_are_never_evaluated() {
        // `never_set` would be an unknown variable if the guard were read.
        let statements = vec![Statement::If {
            branches: vec![fluidmap::protocol::Branch {
                condition: Expression::var("never_set").lt(Expression::number(1.0)),
                body: vec![Statement::flow(&["A", "B"], 300.0, Timing::now(5.0))],
            }],
            otherwise: Some(vec![Statement::flow(&["A", "C"], 300.0, Timing::now(5.0))]),
        }];

        let report = analyse(&statements);
        assert_eq!(report.schedule.distinct_paths().len(), 2);
    }

    #[test]
    fn test_parallel_lanes_join_once() {
        let statements = vec![
            Statement::Parallel {
                lanes: vec![
                    vec![Statement::flow(&["A", "B"], 300.0, Timing::at(0.0, 10.0))],
                    vec![Statement::flow(&["C", "D"], 300.0, Timing::at(0.0, 20.0))],
                ],
            },
            Statement::flow(&["E", "F"], 300.0, Timing::now(5.0)),
        ];

        let report = analyse(&statements);
        assert_eq!(
            report.schedule.to_string(),
            "[[{[A,B,],300 ml/hr},{[C,D,],300 ml/hr},],[{[C,D,],300 ml/hr},],[{[E,F,],300 ml/hr},],]"
        );
    }

    #[test]
    fn test_stop_flow_ends_open_flow() {
        let statements = vec![
            Statement::flow(&["A", "B"], 300.0, Timing::at(0.0, 0.0)),
            Statement::operation(Operation::MeasureVolume {
                container: "B".to_string(),
                into: None,
                timing: Timing::now(10.0),
            }),
            Statement::operation(Operation::StopFlow {
                path: vec!["A".to_string(), "B".to_string()],
            }),
            Statement::flow(&["B", "C"], 300.0, Timing::now(10.0)),
        ];

        let report = analyse(&statements);
        assert_eq!(
            report.schedule.to_string(),
            "[[{[A,B,],300 ml/hr},],[{[B,C,],300 ml/hr},],]"
        );
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_non_terminating_loop_hits_step_limit() {
        // A reading of 0 never reaches the 600 threshold.
        let result = run(
            &turbidostat(),
            SimulationConfig::default()
                .with_measurement_value(0.0)
                .with_max_steps(500),
        );
        assert_eq!(result, Err(ProtocolError::StepLimitExceeded(500)));
    }

    #[test]
    fn test_unknown_variable_in_assignment() {
        let statements = vec![Statement::assign(
            "rate",
            Expression::var("missing").plus(Expression::number(1.0)),
        )];
        let result = run(&statements, SimulationConfig::default());
        assert_eq!(result, Err(ProtocolError::UnknownVariable("missing".to_string())));
    }

    #[test]
    fn test_unresolvable_guard() {
        let statements = vec![Statement::While {
            condition: Expression::var("undefined").lt(Expression::number(1.0)),
            body: vec![Statement::flow(&["A", "B"], 300.0, Timing::now(1.0))],
        }];
        let result = run(&statements, SimulationConfig::default());
        assert!(matches!(result, Err(ProtocolError::UnresolvableGuard { .. })));
    }

    #[test]
    fn test_flow_needs_two_containers() {
        let statements = vec![Statement::flow(&["A"], 300.0, Timing::now(1.0))];
        let result = run(&statements, SimulationConfig::default());
        assert!(matches!(
            result,
            Err(ProtocolError::ShortFlowPath { found: 1, .. })
        ));
    }

    #[test]
    fn test_if_without_triggers_is_malformed() {
        let protocol = lone_control_node(
            vec![1],
            Some(fluidmap::protocol::LogicBlock::If(IfBlock {
                branch_triggers: vec![],
                end_variables: vec!["end".to_string()],
                executed: "executed".to_string(),
            })),
        );
        let mut executor = CharacteristicsExecutor::new();
        let result = FlowSimulator::new(protocol).simulate(&mut executor);
        assert!(matches!(
            result,
            Err(ProtocolError::MissingControlMetadata { node_id: 0, .. })
        ));
    }

    #[test]
    fn test_while_without_exit_targets_is_malformed() {
        let protocol = lone_control_node(
            vec![],
            Some(fluidmap::protocol::LogicBlock::While(WhileBlock {
                trigger: "trigger".to_string(),
                end_variables: vec!["end".to_string()],
                executing: "executing".to_string(),
            })),
        );
        let mut executor = CharacteristicsExecutor::new();
        let result = FlowSimulator::new(protocol).simulate(&mut executor);
        assert!(matches!(
            result,
            Err(ProtocolError::MissingControlMetadata { .. })
        ));
    }

    #[test]
    fn test_dangling_edge_is_rejected() {
        let mut graph = ProtocolGraph::new();
        let node = graph.add_node(NodeKind::Control(ControlNode::default()));
        assert_eq!(
            graph.add_edge(node, 7, None),
            Err(ProtocolError::NodeNotFound(7))
        );
    }
}
