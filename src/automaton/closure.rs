//! Closure automaton: one state per tau-closure, edges per observable
//! action and unit time step.
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::automaton::core::{Automaton, EdgePayload, StatePayload};
use crate::net::rule::Closure;

/// Classification of an observable edge. Service actions are moves the
/// service itself makes, partner actions are moves of the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeKind {
    InputSend,
    InputRead,
    OutputSend,
    OutputRead,
    Time,
}

impl EdgeKind {
    pub fn is_service_action(&self) -> bool {
        matches!(self, EdgeKind::OutputSend | EdgeKind::InputRead)
    }

    pub fn is_partner_action(&self) -> bool {
        matches!(self, EdgeKind::InputSend | EdgeKind::OutputRead)
    }

    pub fn is_time_action(&self) -> bool {
        matches!(self, EdgeKind::Time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureEdge {
    pub label: String,
    pub kind: EdgeKind,
}

impl ClosureEdge {
    pub fn new(label: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    pub fn time() -> Self {
        Self::new("1", EdgeKind::Time)
    }
}

impl EdgePayload for ClosureEdge {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_tau(&self) -> bool {
        false
    }
}

/// The violation sink is keyed apart from every regular closure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClosureKey {
    BoundViolation,
    Closure(Closure),
}

#[derive(Debug, Clone)]
pub struct ClosureState {
    closure: Closure,
    bound_violation: bool,
    final_: bool,
    /// 0 = unknown; otherwise the fixed-point iteration in which the state
    /// was identified as a potential deadlock.
    deadlock_distance: u64,
    reachable: bool,
}

impl ClosureState {
    pub fn new(closure: Closure) -> Self {
        Self {
            closure,
            bound_violation: false,
            final_: false,
            deadlock_distance: 0,
            reachable: true,
        }
    }

    pub fn bound_violation(closure: Closure) -> Self {
        Self {
            closure,
            bound_violation: true,
            final_: false,
            deadlock_distance: 0,
            reachable: true,
        }
    }

    pub fn closure(&self) -> &Closure {
        &self.closure
    }

    pub fn is_bound_violation(&self) -> bool {
        self.bound_violation
    }

    /// Empty means "the action is not currently possible". The violation
    /// sink never counts as empty, even when its recorded closure has no
    /// states, so the two sinks stay distinguishable downstream.
    pub fn is_empty(&self) -> bool {
        !self.bound_violation && self.closure.is_empty()
    }

    pub fn set_final(&mut self, final_: bool) {
        self.final_ = final_;
    }

    pub fn deadlock_distance(&self) -> u64 {
        self.deadlock_distance
    }

    pub fn set_deadlock_distance(&mut self, distance: u64) {
        self.deadlock_distance = distance;
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    pub fn set_reachable(&mut self, reachable: bool) {
        self.reachable = reachable;
    }
}

impl StatePayload for ClosureState {
    type Key = ClosureKey;

    fn key(&self) -> ClosureKey {
        if self.bound_violation {
            ClosureKey::BoundViolation
        } else {
            ClosureKey::Closure(self.closure.clone())
        }
    }

    fn is_final(&self) -> bool {
        self.final_
    }
}

pub type ClosureAutomaton = Automaton<ClosureState, ClosureEdge>;

impl ClosureAutomaton {
    /// Find-or-create of the shared violation sink; the first violating
    /// closure encountered fixes its recorded states.
    pub fn bound_violation_state(&mut self, closure: Closure) -> NodeIndex {
        self.find_or_create(ClosureState::bound_violation(closure)).0
    }

    /// Initial deadlock predicate: a non-final, non-empty state whose every
    /// outgoing edge loops back to itself or leads to an empty state.
    pub fn is_deadlock(&self, idx: NodeIndex) -> bool {
        let state = self.state(idx);
        if state.is_final() || state.is_empty() {
            return false;
        }
        self.outgoing(idx)
            .all(|edge| edge.target() == idx || self.state(edge.target()).is_empty())
    }
}
