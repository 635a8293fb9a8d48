//! Region automaton: quotient of the closure automaton by its connected
//! service-action/time parts.
use std::collections::BTreeSet;

use petgraph::stable_graph::NodeIndex;

use crate::automaton::core::{Automaton, EdgePayload, StatePayload};

/// A region is a set of closure-automaton states, identified by their
/// handles in the closure automaton it was built from.
#[derive(Debug, Clone)]
pub struct RegionState {
    region: BTreeSet<NodeIndex>,
    final_: bool,
}

impl RegionState {
    pub fn new(region: BTreeSet<NodeIndex>) -> Self {
        Self {
            region,
            final_: false,
        }
    }

    pub fn region(&self) -> &BTreeSet<NodeIndex> {
        &self.region
    }

    pub fn contains(&self, closure_state: NodeIndex) -> bool {
        self.region.contains(&closure_state)
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    pub fn set_final(&mut self, final_: bool) {
        self.final_ = final_;
    }
}

impl StatePayload for RegionState {
    type Key = BTreeSet<NodeIndex>;

    fn key(&self) -> Self::Key {
        self.region.clone()
    }

    fn is_final(&self) -> bool {
        self.final_
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEdge {
    pub label: String,
}

impl RegionEdge {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl EdgePayload for RegionEdge {
    fn label(&self) -> &str {
        &self.label
    }
}

pub type RegionAutomaton = Automaton<RegionState, RegionEdge>;

impl RegionAutomaton {
    /// The region containing a given closure-automaton state.
    pub fn region_of(&self, closure_state: NodeIndex) -> Option<NodeIndex> {
        self.states_ordered()
            .into_iter()
            .find(|&idx| self.state(idx).contains(closure_state))
    }
}
