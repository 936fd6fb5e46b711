use crate::ast::VariableSource;
use ahash::AHashMap;

/// Name of the simulated clock variable, in seconds.
pub const TIME_VARIABLE: &str = "time";

/// A protocol variable with write tracking.
///
/// While blocked, a write is flagged but the visible value stays frozen so
/// that guards reading the variable do not fire early.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Variable {
    value: f64,
    written: bool,
    blocked: bool,
}

impl Variable {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            written: false,
            blocked: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set(&mut self, value: f64) {
        self.written = true;
        if !self.blocked {
            self.value = value;
        }
    }

    pub fn has_been_written(&self) -> bool {
        self.written
    }

    pub fn clear_written(&mut self) {
        self.written = false;
    }

    pub fn block(&mut self) {
        self.blocked = true;
    }

    pub fn unblock(&mut self) {
        self.blocked = false;
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableTable {
    variables: AHashMap<String, Variable>,
}

impl Default for VariableTable {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableTable {
    /// A table holding only the clock, set to zero.
    pub fn new() -> Self {
        let mut variables = AHashMap::new();
        variables.insert(TIME_VARIABLE.to_string(), Variable::new(0.0));
        Self { variables }
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.variables.get(name).map(Variable::value)
    }

    /// Writes `value`, declaring the variable on first use.
    pub fn set(&mut self, name: &str, value: f64) {
        self.entry(name).set(value);
    }

    pub fn has_been_written(&self, name: &str) -> bool {
        self.variables
            .get(name)
            .is_some_and(Variable::has_been_written)
    }

    pub fn clear_written(&mut self, name: &str) {
        self.entry(name).clear_written();
    }

    pub fn block(&mut self, name: &str) {
        self.entry(name).block();
    }

    pub fn unblock(&mut self, name: &str) {
        self.entry(name).unblock();
    }

    pub fn time(&self) -> f64 {
        self.value(TIME_VARIABLE).unwrap_or(0.0)
    }

    pub fn set_time(&mut self, time: f64) {
        self.set(TIME_VARIABLE, time);
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn entry(&mut self, name: &str) -> &mut Variable {
        self.variables.entry(name.to_string()).or_default()
    }
}

impl VariableSource for VariableTable {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.value(name)
    }
}
