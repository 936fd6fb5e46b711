//! Common test utilities: machine graphs and protocols shared by the suites.
use fluidmap::prelude::*;
use fluidmap::analysis::CharacteristicsExecutor;
use fluidmap::protocol::Branch;

/// Simple turbidostat machine.
///
/// ```text
/// C1 --+
///      v
///      V5 --> C2 --> P4 --> C3
///      ^
/// C0 --+
/// ```
///
/// C0, C1 and C3 are open single-port containers, C2 is a closed two-port
/// container with an OD sensor (500-650 nm), P4 a bidirectional pump and V5
/// a valve with configurations `1: {0,2}` and `2: {1,2}`.
#[allow(dead_code)]
pub fn simple_machine() -> MachineGraph {
    let table = TruthTable::new()
        .with_configuration(1, [[0, 2]])
        .with_configuration(2, [[1, 2]]);
    build_simple_machine(1, table, 0)
}

/// Same topology with two-port containers and a valve that can also merge
/// both inlets (`3: {0,1,2}`).
#[allow(dead_code)]
pub fn simple_machine_with_merge_valve() -> MachineGraph {
    let table = TruthTable::new()
        .with_configuration(1, [[0, 2]])
        .with_configuration(2, [[1, 2]])
        .with_configuration(3, [[0, 1, 2]]);
    build_simple_machine(2, table, 1)
}

#[allow(dead_code)]
fn build_simple_machine(ports: u16, table: TruthTable, inlet_port: u16) -> MachineGraph {
    let mut graph = MachineGraph::new();
    let c0 = graph.add_container(ports, ContainerClass::Open, 100.0);
    let c1 = graph.add_container(ports, ContainerClass::Open, 100.0);
    let c2 = graph.add_container(2, ContainerClass::Closed, 100.0);
    graph
        .add_capability(
            c2,
            Capability::new(Function::MeasureOd).with_range(Dimension::Wavelength, 500.0, 650.0),
        )
        .expect("c2 is a container");
    let c3 = graph.add_container(ports, ContainerClass::Open, 100.0);
    let p = graph.add_pump(2, PumpDirection::Bidirectional, Bounds::new(0.0, 999.0));
    let v = graph.add_valve(3, table).expect("valid truth table");

    graph.connect_nodes(c0, v, inlet_port, 0).expect("c0 -> v");
    graph.connect_nodes(c1, v, inlet_port, 1).expect("c1 -> v");
    graph.connect_nodes(v, c2, 2, 0).expect("v -> c2");
    graph.connect_nodes(c2, p, 1, 0).expect("c2 -> p");
    graph.connect_nodes(p, c3, 1, 0).expect("p -> c3");
    graph
}

/// Multipath wash machine with 18 nodes.
///
/// Ids: 0 sample, 1 media, 2 waste (4 ports), 3 water, 4 ethanol, 5 naoh
/// (all open), 6 chemostat and 7 cell (closed, 3 ports, cell has an OD
/// sensor), 8 pump 0-999 ml/hr, 9 pump 100-200 ml/hr (both unidirectional),
/// 10..17 valves.
#[allow(dead_code)]
pub fn complex_machine() -> MachineGraph {
    let mut graph = MachineGraph::new();
    let sample = graph.add_container(1, ContainerClass::Open, 100.0);
    let media = graph.add_container(1, ContainerClass::Open, 100.0);
    let waste = graph.add_container(4, ContainerClass::Open, 100.0);
    let water = graph.add_container(1, ContainerClass::Open, 100.0);
    let ethanol = graph.add_container(1, ContainerClass::Open, 100.0);
    let naoh = graph.add_container(1, ContainerClass::Open, 100.0);
    let chemo = graph.add_container(3, ContainerClass::Closed, 100.0);
    let cell = graph.add_container(3, ContainerClass::Closed, 100.0);
    graph
        .add_capability(
            cell,
            Capability::new(Function::MeasureOd).with_range(Dimension::Wavelength, 500.0, 650.0),
        )
        .expect("cell is a container");

    let p1 = graph.add_pump(2, PumpDirection::Unidirectional, Bounds::new(0.0, 999.0));
    let p2 = graph.add_pump(3, PumpDirection::Unidirectional, Bounds::new(100.0, 200.0));

    let two_way = TruthTable::new().with_configuration(1, [[0, 1]]);
    let three_way = TruthTable::new()
        .with_configuration(1, [[0, 2]])
        .with_configuration(2, [[1, 2]])
        .with_configuration(3, [[0, 1]]);
    let selector = TruthTable::new()
        .with_configuration(1, [[1, 0]])
        .with_configuration(2, [[2, 0]])
        .with_configuration(3, [[3, 0]]);

    let v1 = graph.add_valve(2, two_way.clone()).expect("v1");
    let v5 = graph.add_valve(2, two_way.clone()).expect("v5");
    let v4 = graph.add_valve(2, two_way).expect("v4");
    let v2 = graph.add_valve(3, three_way.clone()).expect("v2");
    let v3 = graph.add_valve(3, three_way.clone()).expect("v3");
    let v6 = graph.add_valve(3, three_way.clone()).expect("v6");
    let v7 = graph.add_valve(3, three_way).expect("v7");
    let v8 = graph.add_valve(4, selector).expect("v8");

    let edges = [
        (media, p1, 0, 0),
        (p1, chemo, 1, 0),
        (chemo, v3, 1, 2),
        (chemo, v4, 2, 0),
        (v4, waste, 1, 1),
        (v3, v2, 0, 2),
        (v3, v7, 1, 0),
        (v7, waste, 1, 2),
        (p2, v7, 1, 2),
        (v8, p2, 0, 2),
        (water, v8, 0, 1),
        (ethanol, v8, 0, 2),
        (naoh, v8, 0, 3),
        (v2, cell, 0, 1),
        (v2, v6, 1, 0),
        (v6, waste, 1, 3),
        (p2, v6, 0, 2),
        (cell, v1, 0, 1),
        (cell, v5, 2, 0),
        (v1, sample, 0, 0),
        (v5, waste, 1, 0),
    ];
    for (source, target, source_port, target_port) in edges {
        graph
            .connect_nodes(source, target, source_port, target_port)
            .expect("valid machine edge");
    }
    graph
}

/// Two open containers, 0 and 1, joined by `stages` valve diamonds in a row
/// (`2^stages` routes, none of them pumped) and, with `bypass`, by a
/// unidirectional 0-500 ml/hr pump from 0 to 1.
#[allow(dead_code)]
pub fn ladder_machine(stages: usize, bypass: bool) -> MachineGraph {
    let mut graph = MachineGraph::new();
    let src = graph.add_container(2, ContainerClass::Open, 100.0);
    let dst = graph.add_container(2, ContainerClass::Open, 100.0);
    let split = TruthTable::new()
        .with_configuration(1, [[0, 1]])
        .with_configuration(2, [[0, 2]]);
    let join = TruthTable::new()
        .with_configuration(1, [[0, 2]])
        .with_configuration(2, [[1, 2]]);

    let (mut tail, mut tail_port) = (src, 0);
    for _ in 0..stages {
        let s = graph.add_valve(3, split.clone()).expect("split valve");
        let j = graph.add_valve(3, join.clone()).expect("join valve");
        graph.connect_nodes(tail, s, tail_port, 0).expect("into split");
        graph.connect_nodes(s, j, 1, 0).expect("upper arm");
        graph.connect_nodes(s, j, 2, 1).expect("lower arm");
        tail = j;
        tail_port = 2;
    }
    graph.connect_nodes(tail, dst, tail_port, 0).expect("into dst");

    if bypass {
        let pump = graph.add_pump(2, PumpDirection::Unidirectional, Bounds::new(0.0, 500.0));
        graph.connect_nodes(src, pump, 1, 0).expect("src -> pump");
        graph.connect_nodes(pump, dst, 1, 1).expect("pump -> dst");
    }
    graph
}

/// `A,B,C` for 30s, then `D,B,C` for 30s.
#[allow(dead_code)]
pub fn switching_flows() -> Vec<Statement> {
    vec![
        Statement::flow(&["A", "B"], 300.0, Timing::at(0.0, 30.0)),
        Statement::flow(&["B", "C"], 300.0, Timing::at(0.0, 30.0)),
        Statement::flow(&["D", "B"], 300.0, Timing::at(30.0, 30.0)),
        Statement::flow(&["B", "C"], 300.0, Timing::at(30.0, 30.0)),
    ]
}

/// Same flows as [`switching_flows`] but all starting at 0.
#[allow(dead_code)]
pub fn parallel_flows() -> Vec<Statement> {
    vec![
        Statement::flow(&["A", "B"], 300.0, Timing::at(0.0, 30.0)),
        Statement::flow(&["B", "C"], 300.0, Timing::at(0.0, 30.0)),
        Statement::flow(&["D", "B"], 300.0, Timing::at(0.0, 30.0)),
        Statement::flow(&["B", "C"], 300.0, Timing::at(0.0, 30.0)),
    ]
}

/// OD, two centrifugations and a fluorescence reading on `A`.
#[allow(dead_code)]
pub fn working_ranges() -> Vec<Statement> {
    let centrifugation = || {
        Statement::operation(Operation::Centrifugation {
            container: "A".to_string(),
            speed: 50.0,
            temperature: 26.0,
            timing: Timing::now(2.0),
        })
    };
    vec![
        Statement::operation(Operation::MeasureOd {
            container: "A".to_string(),
            wavelength: 650.0,
            into: None,
            timing: Timing::at(0.0, 3.0),
        }),
        centrifugation(),
        centrifugation(),
        Statement::operation(Operation::MeasureFluorescence {
            container: "A".to_string(),
            excitation: 650.0,
            emission: 680.0,
            into: None,
            timing: Timing::now(2.0),
        }),
    ]
}

#[allow(dead_code)]
fn measure_od(container: &str, into: &str, timing: Timing) -> Statement {
    Statement::operation(Operation::MeasureOd {
        container: container.to_string(),
        wavelength: 650.0,
        into: Some(into.to_string()),
        timing,
    })
}

/// `od = measureOD(A)`, then `B -> A` for 10s or `B -> C` for 20s.
#[allow(dead_code)]
pub fn if_normal() -> Vec<Statement> {
    vec![
        measure_od("A", "od", Timing::at(0.0, 2.0)),
        Statement::If {
            branches: vec![Branch {
                condition: Expression::var("od").lt(Expression::number(600.0)),
                body: vec![Statement::flow(&["B", "A"], 300.0, Timing::now(10.0))],
            }],
            otherwise: Some(vec![Statement::flow(
                &["B", "C"],
                300.0,
                Timing::now(20.0),
            )]),
        },
    ]
}

/// [`if_normal`] followed by `D -> E` during `[15s, 25s)`, overlapping the
/// longest branch.
#[allow(dead_code)]
pub fn if_collision() -> Vec<Statement> {
    let mut statements = if_normal();
    statements.push(Statement::flow(&["D", "E"], 300.0, Timing::at(15.0, 10.0)));
    statements
}

/// While the OD stays under 600, measure the cell and pump media through it.
#[allow(dead_code)]
pub fn turbidostat() -> Vec<Statement> {
    vec![
        Statement::assign("rate", Expression::number(300.0)),
        Statement::assign("od", Expression::number(0.0)),
        Statement::While {
            condition: Expression::var("od").lt(Expression::number(600.0)),
            body: vec![
                measure_od("cell", "od", Timing::now(2.0)),
                Statement::operation(Operation::ContinuousFlow {
                    path: vec!["media".into(), "cell".into(), "waste".into()],
                    rate: Expression::var("rate"),
                    timing: Timing::now(30.0),
                }),
            ],
        },
    ]
}

/// [`turbidostat`] followed by a poison flow through the same cell.
#[allow(dead_code)]
pub fn turbidostat_with_poison() -> Vec<Statement> {
    let mut statements = turbidostat();
    statements.push(Statement::operation(Operation::ContinuousFlow {
        path: vec!["poison".into(), "cell".into(), "waste".into()],
        rate: Expression::var("rate"),
        timing: Timing::now(30.0),
    }));
    statements
}

/// `iterations` rounds of media1 then media2 through the cell, 30 min each.
#[allow(dead_code)]
pub fn switching_loop(iterations: usize, rate: f64) -> Vec<Statement> {
    vec![
        Statement::assign("counter", Expression::number(0.0)),
        Statement::While {
            condition: Expression::var("counter").lt(Expression::number(iterations as f64)),
            body: vec![
                Statement::flow(&["media1", "cell", "waste"], rate, Timing::now(1800.0)),
                Statement::flow(&["media2", "cell", "waste"], rate, Timing::now(1800.0)),
                Statement::assign(
                    "counter",
                    Expression::var("counter").plus(Expression::number(1.0)),
                ),
            ],
        },
    ]
}

/// Simulator with default settings: OD readings of 650 end loops guarded
/// by `od < 600` after one iteration.
#[allow(dead_code)]
pub fn simulator(statements: &[Statement]) -> FlowSimulator {
    let protocol = ProtocolBuilder::new()
        .build(statements)
        .expect("protocol should lower");
    FlowSimulator::new(protocol)
}

/// Runs the characteristics analysis of `statements`.
#[allow(dead_code)]
pub fn analyse(statements: &[Statement]) -> AnalysisReport {
    simulator(statements)
        .analyse()
        .expect("analysis should succeed")
}

/// Requirements of the turbidostat built straight from executor events.
#[allow(dead_code)]
pub fn turbidostat_requirements() -> AnalysisReport {
    use fluidmap::protocol::FunctionUse;
    use fluidmap::simulator::ActuatorExecutor;

    let mut executor = CharacteristicsExecutor::new();
    let path: Vec<String> = vec!["media".into(), "cell".into(), "waste".into()];
    executor.continuous_flow(&path, Rate::ml_per_hr(300.0), 0.0, None);
    executor.use_function(&FunctionUse {
        container: "cell",
        function: Function::MeasureOd,
        range: Default::default(),
    });
    executor.flush();
    executor.into_report()
}
