use serde::{Deserialize, Serialize};

/// Knobs of the protocol flow simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Executed nodes after which the protocol is declared non-terminating.
    pub max_steps: usize,
    /// Reading returned by every simulated measurement. The default sits at
    /// the top of the usual OD range, so loops waiting for growth finish.
    pub measurement_value: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            measurement_value: 650.0,
        }
    }
}

impl SimulationConfig {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_measurement_value(mut self, value: f64) -> Self {
        self.measurement_value = value;
        self
    }
}

/// Knobs of the assignment search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Optional cap on A* expansions.
    pub max_expansions: Option<usize>,
}

impl SearchConfig {
    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }
}
