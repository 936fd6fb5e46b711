use super::path::{FlowPath, FlowSchedule, Rate, TimeWindow};
use ahash::AHashSet;

/// Elementary flow demand between two containers.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowFact {
    pub source: String,
    pub target: String,
    pub rate: Rate,
    pub start: f64,
    /// `None` while the flow has not been stopped.
    pub end: Option<f64>,
}

impl FlowFact {
    pub fn is_active_at(&self, time: f64) -> bool {
        self.start <= time && self.end.is_none_or(|end| time < end)
    }
}

/// In-progress part of the ledger; this is what simulator snapshots capture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerState {
    facts: Vec<FlowFact>,
    cursor: f64,
    settled: usize,
}

impl LedgerState {
    pub fn facts(&self) -> &[FlowFact] {
        &self.facts
    }
}

/// Merges elementary flow facts into paths and groups them into time windows.
#[derive(Debug, Clone, Default)]
pub struct FlowLedger {
    state: LedgerState,
    schedule: FlowSchedule,
}

impl FlowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an open-ended flow starting at `at_time`.
    pub fn record_flow(&mut self, source: &str, target: &str, rate: Rate, at_time: f64) {
        self.push_fact(source, target, rate, at_time, None);
    }

    /// Registers a flow active during `[at_time, until)`.
    pub fn record_flow_until(
        &mut self,
        source: &str,
        target: &str,
        rate: Rate,
        at_time: f64,
        until: f64,
    ) {
        self.push_fact(source, target, rate, at_time, Some(until));
    }

    fn push_fact(&mut self, source: &str, target: &str, rate: Rate, start: f64, end: Option<f64>) {
        log::trace!("flow {} -> {} at {} from {}", source, target, rate, start);
        self.state.facts.push(FlowFact {
            source: source.to_string(),
            target: target.to_string(),
            rate,
            start,
            end,
        });
    }

    /// Closes every open flow `source -> target` at `at_time`.
    pub fn stop_flow(&mut self, source: &str, target: &str, at_time: f64) {
        for fact in self.state.facts.iter_mut() {
            if fact.source == source && fact.target == target && fact.end.is_none() {
                fact.end = Some(at_time.max(fact.start));
            }
        }
    }

    /// Chains the facts active at `at_time` into a window and appends it to
    /// the schedule. Returns whether the schedule grew.
    pub fn commit_window(&mut self, at_time: f64) -> bool {
        let active: Vec<&FlowFact> = self
            .state
            .facts
            .iter()
            .filter(|f| f.is_active_at(at_time))
            .collect();
        let window = TimeWindow::new(chain_facts(&active));
        self.schedule.push(window)
    }

    /// Commits a window at every configuration change before `upto`, then
    /// moves the cursor there.
    pub fn settle(&mut self, upto: f64) {
        let cursor = self.state.cursor;
        let mut points: Vec<f64> = Vec::new();
        for (index, fact) in self.state.facts.iter().enumerate() {
            let boundaries = std::iter::once(fact.start).chain(fact.end);
            for b in boundaries {
                if cursor <= b && b < upto {
                    points.push(b);
                }
            }
            // Facts recorded since the last settle may start in the past.
            if index >= self.state.settled && fact.start < cursor {
                points.push(fact.start);
            }
        }
        points.sort_by(f64::total_cmp);
        points.dedup();

        for point in points {
            self.commit_window(point);
        }
        self.state.cursor = upto;
        self.state.settled = self.state.facts.len();
    }

    /// Settles everything that is still pending.
    pub fn flush(&mut self) {
        self.settle(f64::INFINITY);
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Replaces the in-progress state; the committed schedule is kept.
    pub fn restore(&mut self, state: LedgerState) {
        self.state = state;
    }

    pub fn schedule(&self) -> &FlowSchedule {
        &self.schedule
    }

    pub fn into_schedule(self) -> FlowSchedule {
        self.schedule
    }
}

/// Chains active facts into paths, one rate group at a time.
fn chain_facts(facts: &[&FlowFact]) -> Vec<FlowPath> {
    let mut rates: Vec<Rate> = Vec::new();
    for fact in facts {
        if !rates.contains(&fact.rate) {
            rates.push(fact.rate);
        }
    }

    let mut paths = Vec::new();
    for rate in rates {
        let mut edges: Vec<(&str, &str)> = Vec::new();
        for fact in facts.iter().filter(|f| f.rate == rate) {
            let edge = (fact.source.as_str(), fact.target.as_str());
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
        paths.extend(
            chain_group(&edges)
                .into_iter()
                .map(|chain| FlowPath::new(chain, rate)),
        );
    }
    paths
}

/// Builds maximal chains over the edges of one rate group.
///
/// Chains start at roots (nodes that are never a target) and fork at fan-out
/// nodes, each branch keeping the common prefix. Edges left uncovered, i.e.
/// those on pure cycles, start chains from their own source.
fn chain_group<'a>(edges: &[(&'a str, &'a str)]) -> Vec<Vec<&'a str>> {
    let targets: AHashSet<&str> = edges.iter().map(|(_, t)| *t).collect();
    let mut starts: Vec<&str> = Vec::new();
    for &(source, _) in edges {
        if !targets.contains(source) && !starts.contains(&source) {
            starts.push(source);
        }
    }

    let mut chains = Vec::new();
    let mut covered: AHashSet<(&str, &str)> = AHashSet::new();
    for root in starts {
        follow(edges, vec![root], &mut covered, &mut chains);
    }
    while let Some(&(source, _)) = edges.iter().find(|e| !covered.contains(*e)) {
        follow(edges, vec![source], &mut covered, &mut chains);
    }
    chains
}

fn follow<'a>(
    edges: &[(&'a str, &'a str)],
    chain: Vec<&'a str>,
    covered: &mut AHashSet<(&'a str, &'a str)>,
    chains: &mut Vec<Vec<&'a str>>,
) {
    let Some(&last) = chain.last() else {
        return;
    };
    let outgoing: Vec<&(&str, &str)> = edges.iter().filter(|(s, _)| *s == last).collect();
    if outgoing.is_empty() {
        if chain.len() > 1 {
            chains.push(chain);
        }
        return;
    }
    for edge in outgoing {
        covered.insert(*edge);
        let next = edge.1;
        if chain.contains(&next) {
            // Cycle guard: the chain ends before revisiting a node.
            if chain.len() > 1 && !chains.contains(&chain) {
                chains.push(chain.clone());
            }
            continue;
        }
        let mut extended = chain.clone();
        extended.push(next);
        follow(edges, extended, covered, chains);
    }
}
