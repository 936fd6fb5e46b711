use clap::Parser;
use fluidmap::prelude::*;
use serde::Deserialize;
use std::fs;
use std::time::Instant;

/// Everything needed for one mapping run, as read from disk.
#[derive(Deserialize)]
struct Scenario {
    machine: MachineDefinition,
    protocol: Vec<Statement>,
    #[serde(default)]
    simulation: SimulationConfig,
    #[serde(default)]
    search: SearchConfig,
}

/// Maps a protocol onto a fluidic machine and prints the assignment
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the scenario JSON file (machine, protocol and optional settings)
    scenario_path: String,

    /// Overrides the value returned by simulated measurements
    #[arg(short, long)]
    measurement_value: Option<f64>,

    /// Stops the assignment search after this many expansions
    #[arg(short = 'x', long)]
    max_expansions: Option<usize>,

    /// Print the per-container requirements found by the analysis
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. Loading ---
    let scenario_json = fs::read_to_string(&cli.scenario_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read scenario file '{}': {}",
            &cli.scenario_path, e
        ))
    });
    let mut scenario: Scenario = serde_json::from_str(&scenario_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse scenario JSON: {}", e)));
    if let Some(value) = cli.measurement_value {
        scenario.simulation = scenario.simulation.with_measurement_value(value);
    }
    if let Some(limit) = cli.max_expansions {
        scenario.search = scenario.search.with_max_expansions(limit);
    }

    // --- 2. Machine and protocol ---
    let names: Vec<String> = scenario
        .machine
        .node_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let graph = scenario
        .machine
        .into_machine_graph()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid machine definition: {}", e)));
    let protocol = ProtocolBuilder::new()
        .build(&scenario.protocol)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid protocol: {}", e)));
    println!(
        "Loaded machine with {} nodes and protocol with {} nodes",
        graph.len(),
        protocol.graph.len()
    );

    // --- 3. Mapping ---
    let mut simulator = FlowSimulator::new(protocol).with_config(scenario.simulation);
    let mut mapping = FluidicModelMapping::builder(graph)
        .with_config(scenario.search)
        .build();
    let search_start = Instant::now();
    let outcome = mapping
        .find_relation(&mut simulator)
        .unwrap_or_else(|e| exit_with_error(&format!("Protocol analysis failed: {}", e)));
    let search_duration = search_start.elapsed();

    // --- 4. Results ---
    if let Some(report) = mapping.report() {
        println!("\nFlow schedule: {}", report.schedule);
        if cli.verbose {
            println!("\nContainers (search order):");
            for container in &report.containers {
                println!("  {}", container);
            }
        }
    }

    let node_name = |id: NodeId| names.get(id).map_or("?", String::as_str);
    match &outcome {
        SearchOutcome::Found(relation) => {
            println!("\nMapping found:");
            for (container, node) in relation.iter() {
                println!("  {} -> {} ({})", container, node_name(node), node);
            }
        }
        SearchOutcome::Infeasible { message } => {
            println!("\nNo mapping found: {}", message);
        }
    }

    println!("\nSearch history:");
    for (step, relation) in mapping.history().iter().enumerate() {
        println!("  {}: {}", step, relation);
    }

    println!("\n--- Performance Summary ---");
    println!("Analysis + Search:    {:?}", search_duration);
    println!("Total Execution:      {:?}", total_start.elapsed());

    if !outcome.is_found() {
        std::process::exit(2);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
