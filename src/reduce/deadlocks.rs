//! Potential-deadlock elimination: mark the fixed point, then delete.
use std::collections::BTreeSet;

use log::debug;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::automaton::closure::ClosureAutomaton;
use crate::automaton::core::StatePayload;

#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlockStats {
    pub marked: usize,
    pub max_distance: u64,
}

/// Marks every potential deadlock with the fixed-point iteration in which
/// it was identified (the deadlock distance). Nothing is deleted.
pub fn mark_potential_deadlocks(automaton: &mut ClosureAutomaton) -> (BTreeSet<NodeIndex>, u64) {
    let mut marked: BTreeSet<NodeIndex> = BTreeSet::new();

    for idx in automaton.states_ordered() {
        if automaton.is_deadlock(idx) {
            marked.insert(idx);
        }
    }
    if marked.is_empty() {
        return (marked, 0);
    }
    for &idx in &marked {
        automaton.state_mut(idx).set_deadlock_distance(1);
    }

    let mut iteration = 1;
    loop {
        // unmarked predecessors of the marked set are the only candidates
        let mut candidates: BTreeSet<NodeIndex> = BTreeSet::new();
        for &idx in &marked {
            for edge in automaton.incoming(idx) {
                let predecessor = edge.source();
                if predecessor != idx && !marked.contains(&predecessor) {
                    candidates.insert(predecessor);
                }
            }
        }

        let additional: Vec<NodeIndex> = candidates
            .into_iter()
            .filter(|&idx| is_potential_deadlock(automaton, idx, &marked))
            .collect();
        if additional.is_empty() {
            break;
        }

        iteration += 1;
        for idx in additional {
            automaton.state_mut(idx).set_deadlock_distance(iteration);
            marked.insert(idx);
        }
    }

    debug!(
        "deadlock fixed point: {} states marked, max distance {}",
        marked.len(),
        iteration
    );
    (marked, iteration)
}

/// Marks and deletes all potential deadlocks.
pub fn remove_deadlocks(automaton: &mut ClosureAutomaton) -> DeadlockStats {
    let (marked, max_distance) = mark_potential_deadlocks(automaton);
    let stats = DeadlockStats {
        marked: marked.len(),
        max_distance,
    };
    automaton.delete_states(marked);
    stats
}

/// The propagation test. With `pc` the outgoing partner-action edges, `pdl`
/// those leading to a marked or empty state, `sdl` true when some service or
/// time edge leads to a marked state, and `odl` the outgoing edges leading
/// to a marked state, to the state itself or to an empty state, the state is
/// a potential deadlock iff `(pdl == pc && sdl) || (odl == outgoing)`.
fn is_potential_deadlock(
    automaton: &ClosureAutomaton,
    idx: NodeIndex,
    marked: &BTreeSet<NodeIndex>,
) -> bool {
    if automaton.state(idx).is_final() {
        return false;
    }

    let mut total = 0usize;
    let mut pc = 0usize;
    let mut pdl = 0usize;
    let mut sdl = false;
    let mut odl = 0usize;

    for edge in automaton.outgoing(idx) {
        total += 1;
        let successor = edge.target();
        let successor_marked = marked.contains(&successor);
        let kind = edge.weight().kind;

        if kind.is_partner_action() {
            pc += 1;
            if successor_marked || automaton.state(successor).is_empty() {
                pdl += 1;
            }
        }
        sdl |= (kind.is_service_action() || kind.is_time_action()) && successor_marked;
        if successor_marked || successor == idx || automaton.state(successor).is_empty() {
            odl += 1;
        }
    }

    (pdl == pc && sdl) || (odl == total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::closure::{ClosureEdge, ClosureState, EdgeKind};
    use crate::net::rule::Closure;
    use crate::net::state::NetState;
    use crate::net::structure::{Marking, TimeMarking};

    fn closure_with_token(token: u64) -> Closure {
        let state = NetState::new(Marking::from_vec(vec![token]), TimeMarking::new(0));
        Closure::from_states(std::collections::BTreeSet::from([state]))
    }

    // s0 --a!--> s1 --b?--> s2, s1 --a!--> s1, s2 terminal
    fn propagation_fixture() -> (ClosureAutomaton, [NodeIndex; 3]) {
        let mut cl = ClosureAutomaton::new();
        let s0 = cl
            .create_state(ClosureState::new(closure_with_token(0)))
            .unwrap();
        let s1 = cl
            .create_state(ClosureState::new(closure_with_token(1)))
            .unwrap();
        let s2 = cl
            .create_state(ClosureState::new(closure_with_token(2)))
            .unwrap();
        cl.connect(s0, s1, ClosureEdge::new("a!", EdgeKind::OutputSend));
        cl.connect(s1, s2, ClosureEdge::new("b?", EdgeKind::OutputRead));
        cl.connect(s1, s1, ClosureEdge::new("a!", EdgeKind::OutputSend));
        cl.set_initial(s0);
        (cl, [s0, s1, s2])
    }

    #[test]
    fn deadlocks_propagate_with_increasing_distance() {
        let (mut cl, [s0, s1, s2]) = propagation_fixture();
        let (marked, max_distance) = mark_potential_deadlocks(&mut cl);

        assert_eq!(marked.len(), 3);
        assert_eq!(cl.state(s2).deadlock_distance(), 1);
        assert_eq!(cl.state(s1).deadlock_distance(), 2);
        assert_eq!(cl.state(s0).deadlock_distance(), 3);
        assert_eq!(max_distance, 3);
    }

    #[test]
    fn removal_empties_the_fixture() {
        let (mut cl, _) = propagation_fixture();
        let stats = remove_deadlocks(&mut cl);
        assert_eq!(stats.marked, 3);
        assert_eq!(stats.max_distance, 3);
        assert_eq!(cl.state_count(), 0);
        assert_eq!(cl.edge_count(), 0);
        assert!(cl.initial().is_none());
    }

    #[test]
    fn final_states_stop_the_propagation() {
        let (mut cl, [s0, s1, s2]) = propagation_fixture();
        cl.state_mut(s1).set_final(true);
        let (marked, _) = mark_potential_deadlocks(&mut cl);
        assert!(marked.contains(&s2));
        assert!(!marked.contains(&s1));
        assert!(!marked.contains(&s0));
    }

    #[test]
    fn removal_is_a_fixed_point() {
        let (mut cl, _) = propagation_fixture();
        remove_deadlocks(&mut cl);
        let stats = remove_deadlocks(&mut cl);
        assert_eq!(stats.marked, 0);
        assert_eq!(stats.max_distance, 0);
    }

    #[test]
    fn service_successors_keep_states_alive() {
        // s0 --a!--> s1(final): nothing is a deadlock
        let mut cl = ClosureAutomaton::new();
        let s0 = cl
            .create_state(ClosureState::new(closure_with_token(0)))
            .unwrap();
        let s1 = cl
            .create_state(ClosureState::new(closure_with_token(1)))
            .unwrap();
        cl.state_mut(s1).set_final(true);
        cl.connect(s0, s1, ClosureEdge::new("a!", EdgeKind::OutputSend));
        let (marked, max_distance) = mark_potential_deadlocks(&mut cl);
        assert!(marked.is_empty());
        assert_eq!(max_distance, 0);
    }
}
