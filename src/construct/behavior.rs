//! Behavior automaton construction: single-threaded reachability over the
//! timed state space.
use std::collections::VecDeque;

use log::debug;
use petgraph::stable_graph::NodeIndex;

use crate::automaton::behavior::{BehaviorAutomaton, BehaviorEdge, BehaviorState};
use crate::construct::ConstructError;
use crate::net::core::Net;
use crate::net::rule::FiringRule;
use crate::net::state::NetState;

/// Builds the full timed state graph of a net. Bound-violating successors
/// are suppressed unless the singleton `!` sink is requested.
pub struct ConstructBehavior {
    bound_violation_state: bool,
}

impl ConstructBehavior {
    pub fn new() -> Self {
        Self {
            bound_violation_state: false,
        }
    }

    /// Route bound-violating successors to the shared `!` state instead of
    /// dropping them.
    pub fn with_bound_violation_state(mut self) -> Self {
        self.bound_violation_state = true;
        self
    }

    pub fn construct(&self, net: &Net) -> Result<BehaviorAutomaton, ConstructError> {
        let rule = FiringRule::new(net);
        let mut automaton = BehaviorAutomaton::new();

        let initial = rule.initial_state();
        let mut payload = BehaviorState::new(initial.clone());
        payload.set_final(initial.is_final_marking(net));
        let initial_idx = automaton.create_state(payload)?;
        automaton.set_initial(initial_idx);

        let mut worklist = VecDeque::from([initial_idx]);
        while let Some(idx) = worklist.pop_front() {
            let net_state = automaton.state(idx).net_state.clone();

            for transition in rule.fireable_transitions(&net_state) {
                let successor = rule.fire(transition, &net_state)?;
                let label = net.transitions[transition].label.clone();
                self.handle_successor(net, &mut automaton, &mut worklist, idx, successor, label);
            }

            if rule.can_make_time_step(&net_state) {
                let successor = rule.make_time_step(&net_state)?;
                self.handle_successor(
                    net,
                    &mut automaton,
                    &mut worklist,
                    idx,
                    successor,
                    "1".to_string(),
                );
            }
        }

        debug!(
            "behavior automaton: {} states, {} edges",
            automaton.state_count(),
            automaton.edge_count()
        );
        Ok(automaton)
    }

    fn handle_successor(
        &self,
        net: &Net,
        automaton: &mut BehaviorAutomaton,
        worklist: &mut VecDeque<NodeIndex>,
        source: NodeIndex,
        successor: NetState,
        label: String,
    ) {
        if !successor.is_bounded(net) {
            if self.bound_violation_state {
                let sink = automaton.bound_violation_state();
                automaton.connect(source, sink, BehaviorEdge::new(label));
            }
            return;
        }

        let mut payload = BehaviorState::new(successor.clone());
        payload.set_final(successor.is_final_marking(net));
        let (target, created) = automaton.find_or_create(payload);
        if created {
            worklist.push_back(target);
        }
        automaton.connect(source, target, BehaviorEdge::new(label));
    }
}

impl Default for ConstructBehavior {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::core::EdgePayload;
    use petgraph::visit::IntoEdgeReferences;
    use crate::net::structure::{Marking, TimeBound, TimeInterval};
    use petgraph::visit::EdgeRef;

    // A(1) --t1[2,3]--> A
    fn minimal_cycle() -> Net {
        let mut net = Net::empty();
        let a = net.create_place("A", 1).unwrap();
        let t1 = net
            .create_transition("t1", TimeInterval::new(2, TimeBound::Finite(3)).unwrap())
            .unwrap();
        net.connect_place_to_transition(a, t1, 1).unwrap();
        net.connect_transition_to_place(t1, a, 1).unwrap();
        net.set_initial_marking(Marking::from_vec(vec![1])).unwrap();
        net
    }

    #[test]
    fn minimal_cycle_has_four_states() {
        let net = minimal_cycle();
        let behavior = ConstructBehavior::new().construct(&net).unwrap();

        // clocks 0..=3 on the single marking
        assert_eq!(behavior.state_count(), 4);

        let time_edges = behavior
            .graph()
            .edge_references()
            .filter(|e| e.weight().label() == "1")
            .count();
        assert_eq!(time_edges, 3);

        // firing from clocks 2 and 3 loops back to clock 0
        let firing_edges: Vec<_> = behavior
            .graph()
            .edge_references()
            .filter(|e| e.weight().label() == "t1")
            .collect();
        assert_eq!(firing_edges.len(), 2);
        let initial = behavior.initial().unwrap();
        assert!(firing_edges.iter().all(|e| e.target() == initial));
    }

    #[test]
    fn unmatched_final_marking_yields_no_final_states() {
        let mut net = minimal_cycle();
        net.add_final_marking(Marking::from_vec(vec![0])).unwrap();
        let behavior = ConstructBehavior::new().construct(&net).unwrap();
        assert!(behavior.final_states().is_empty());
    }

    // P(1) with t[0,0] producing into P without consuming
    fn violating_net() -> Net {
        let mut net = Net::empty();
        let p = net.create_place("P", 1).unwrap();
        let t = net
            .create_transition("t", TimeInterval::new(0, TimeBound::Finite(0)).unwrap())
            .unwrap();
        net.connect_transition_to_place(t, p, 1).unwrap();
        net.set_initial_marking(Marking::from_vec(vec![1])).unwrap();
        net
    }

    #[test]
    fn bound_violations_are_routed_to_the_sink_when_requested() {
        let net = violating_net();
        let behavior = ConstructBehavior::new()
            .with_bound_violation_state()
            .construct(&net)
            .unwrap();

        assert_eq!(behavior.state_count(), 2);
        assert_eq!(behavior.edge_count(), 1);
        let edge = behavior.graph().edge_references().next().unwrap();
        assert_eq!(edge.weight().label(), "t");
        assert!(behavior.state(edge.target()).is_bound_violation());
    }

    #[test]
    fn bound_violations_are_suppressed_by_default() {
        let net = violating_net();
        let behavior = ConstructBehavior::new().construct(&net).unwrap();
        assert_eq!(behavior.state_count(), 1);
        assert_eq!(behavior.edge_count(), 0);
    }

    #[test]
    fn construction_is_deterministic() {
        let net = minimal_cycle();
        let first = ConstructBehavior::new().construct(&net).unwrap();
        let second = ConstructBehavior::new().construct(&net).unwrap();
        assert_eq!(first.state_count(), second.state_count());
        assert_eq!(first.edge_count(), second.edge_count());
    }

    #[test]
    fn initial_state_can_be_final() {
        let mut net = minimal_cycle();
        net.add_final_marking(Marking::from_vec(vec![1])).unwrap();
        let behavior = ConstructBehavior::new().construct(&net).unwrap();
        let initial = behavior.initial().unwrap();
        assert!(behavior
            .final_states()
            .iter()
            .any(|&idx| idx == initial));
    }
}
