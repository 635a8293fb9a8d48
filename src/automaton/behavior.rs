//! Behavior automaton: one state per reachable timed net state, plus an
//! optional singleton sink for bound-violating successors.
use petgraph::stable_graph::NodeIndex;

use crate::automaton::core::{Automaton, EdgePayload, StatePayload};
use crate::net::core::Net;
use crate::net::state::NetState;
use crate::net::structure::{Marking, TimeMarking};

/// The bound-violation sink orders below every regular state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BehaviorKey {
    BoundViolation,
    State(NetState),
}

#[derive(Debug, Clone)]
pub struct BehaviorState {
    pub net_state: NetState,
    bound_violation: bool,
    final_: bool,
}

impl BehaviorState {
    pub fn new(net_state: NetState) -> Self {
        Self {
            net_state,
            bound_violation: false,
            final_: false,
        }
    }

    /// The singleton `!` state.
    pub fn bound_violation() -> Self {
        Self {
            net_state: NetState::new(Marking::new(0), TimeMarking::new(0)),
            bound_violation: true,
            final_: false,
        }
    }

    pub fn is_bound_violation(&self) -> bool {
        self.bound_violation
    }

    pub fn set_final(&mut self, final_: bool) {
        self.final_ = final_;
    }

    pub fn display(&self, net: &Net) -> String {
        if self.bound_violation {
            "!".to_string()
        } else {
            self.net_state.display(net)
        }
    }
}

impl StatePayload for BehaviorState {
    type Key = BehaviorKey;

    fn key(&self) -> BehaviorKey {
        if self.bound_violation {
            BehaviorKey::BoundViolation
        } else {
            BehaviorKey::State(self.net_state.clone())
        }
    }

    fn is_final(&self) -> bool {
        self.final_
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorEdge {
    pub label: String,
}

impl BehaviorEdge {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn tau() -> Self {
        Self::new("")
    }
}

impl EdgePayload for BehaviorEdge {
    fn label(&self) -> &str {
        &self.label
    }
}

pub type BehaviorAutomaton = Automaton<BehaviorState, BehaviorEdge>;

impl BehaviorAutomaton {
    /// Find-or-create of the shared `!` sink.
    pub fn bound_violation_state(&mut self) -> NodeIndex {
        self.find_or_create(BehaviorState::bound_violation()).0
    }
}
