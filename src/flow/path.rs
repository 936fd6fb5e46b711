use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Volumetric flow rate in ml/hr.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(f64);

impl Rate {
    pub fn ml_per_hr(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

// Rates are compared on their bit pattern so they can key maps.
impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Rate {}

impl Hash for Rate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Whole rates print without a fraction: `300 ml/hr`.
        write!(f, "{} ml/hr", self.0)
    }
}

/// Ordered chain of at least two containers sharing one rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowPath {
    containers: Vec<String>,
    rate: Rate,
}

impl FlowPath {
    pub fn new<I, S>(containers: I, rate: Rate) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            containers: containers.into_iter().map(Into::into).collect(),
            rate,
        }
    }

    pub fn containers(&self) -> &[String] {
        &self.containers
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Consecutive `(from, to)` pairs along the path.
    pub fn segments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.containers
            .iter()
            .tuple_windows()
            .map(|(a, b)| (a.as_str(), b.as_str()))
    }
}

impl fmt::Display for FlowPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{[")?;
        for name in &self.containers {
            write!(f, "{},", name)?;
        }
        write!(f, "],{}}}", self.rate)
    }
}

/// Set of flow paths active at the same time.
///
/// Paths are kept sorted, so two windows holding the same paths in any order
/// compare equal while each path keeps its internal order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimeWindow {
    paths: Vec<FlowPath>,
}

impl TimeWindow {
    pub fn new(mut paths: Vec<FlowPath>) -> Self {
        paths.sort();
        paths.dedup();
        Self { paths }
    }

    pub fn paths(&self) -> &[FlowPath] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for path in &self.paths {
            write!(f, "{},", path)?;
        }
        write!(f, "]")
    }
}

/// Chronological sequence of windows, consecutive duplicates collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowSchedule {
    windows: Vec<TimeWindow>,
}

impl FlowSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `window` unless it is empty or equal to the last one.
    /// Returns whether the schedule grew.
    pub fn push(&mut self, window: TimeWindow) -> bool {
        if window.is_empty() || self.windows.last() == Some(&window) {
            return false;
        }
        self.windows.push(window);
        true
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Every distinct path of the schedule, in first-seen order.
    pub fn distinct_paths(&self) -> Vec<&FlowPath> {
        self.windows.iter().flat_map(|w| w.paths()).unique().collect()
    }
}

impl FromIterator<TimeWindow> for FlowSchedule {
    fn from_iter<I: IntoIterator<Item = TimeWindow>>(iter: I) -> Self {
        let mut schedule = FlowSchedule::new();
        for window in iter {
            schedule.push(window);
        }
        schedule
    }
}

impl fmt::Display for FlowSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for window in &self.windows {
            write!(f, "{},", window)?;
        }
        write!(f, "]")
    }
}
