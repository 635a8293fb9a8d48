//! Unreachable-state elimination after deadlock removal.
use std::collections::BTreeSet;

use log::debug;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::automaton::closure::ClosureAutomaton;

/// Repeatedly drops states whose entire preset (ignoring self-loops) lies
/// within the dropped set. The initial state is never dropped. Returns the
/// number of removed states.
pub fn remove_unreachable_states(automaton: &mut ClosureAutomaton) -> usize {
    let unreachable = find_unreachable_states(automaton);
    for &idx in &unreachable {
        automaton.state_mut(idx).set_reachable(false);
    }
    let count = unreachable.len();
    automaton.delete_states(unreachable);
    debug!("unreachable states removed: {}", count);
    count
}

fn find_unreachable_states(automaton: &ClosureAutomaton) -> BTreeSet<NodeIndex> {
    let mut unreachable: BTreeSet<NodeIndex> = BTreeSet::new();
    loop {
        let before = unreachable.len();
        for idx in automaton.states_ordered() {
            if Some(idx) != automaton.initial()
                && !unreachable.contains(&idx)
                && preset_subset_ignoring_loops(automaton, idx, &unreachable)
            {
                unreachable.insert(idx);
            }
        }
        if unreachable.len() == before {
            return unreachable;
        }
    }
}

fn preset_subset_ignoring_loops(
    automaton: &ClosureAutomaton,
    idx: NodeIndex,
    set: &BTreeSet<NodeIndex>,
) -> bool {
    automaton
        .incoming(idx)
        .all(|edge| edge.source() == idx || set.contains(&edge.source()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::closure::{ClosureEdge, ClosureState, EdgeKind};
    use crate::net::rule::Closure;
    use crate::net::state::NetState;
    use crate::net::structure::{Marking, TimeMarking};

    fn state(token: u64) -> ClosureState {
        let net_state = NetState::new(Marking::from_vec(vec![token]), TimeMarking::new(0));
        ClosureState::new(Closure::from_states(std::collections::BTreeSet::from([
            net_state,
        ])))
    }

    #[test]
    fn orphaned_chains_are_dropped_transitively() {
        // init, and a detached chain o0 -> o1 with a self-loop on o1
        let mut cl = ClosureAutomaton::new();
        let init = cl.create_state(state(0)).unwrap();
        let o0 = cl.create_state(state(1)).unwrap();
        let o1 = cl.create_state(state(2)).unwrap();
        cl.connect(o0, o1, ClosureEdge::new("a!", EdgeKind::OutputSend));
        cl.connect(o1, o1, ClosureEdge::time());
        cl.set_initial(init);

        let removed = remove_unreachable_states(&mut cl);
        assert_eq!(removed, 2);
        assert_eq!(cl.state_count(), 1);
        assert_eq!(cl.initial(), Some(init));
    }

    #[test]
    fn reachable_successors_survive() {
        let mut cl = ClosureAutomaton::new();
        let init = cl.create_state(state(0)).unwrap();
        let succ = cl.create_state(state(1)).unwrap();
        cl.connect(init, succ, ClosureEdge::new("a!", EdgeKind::OutputSend));
        cl.set_initial(init);

        assert_eq!(remove_unreachable_states(&mut cl), 0);
        assert_eq!(cl.state_count(), 2);
    }

    #[test]
    fn detached_cycles_survive_the_preset_test() {
        // a <-> b feed each other, so neither preset is ever fully dropped
        let mut cl = ClosureAutomaton::new();
        let init = cl.create_state(state(0)).unwrap();
        let a = cl.create_state(state(1)).unwrap();
        let b = cl.create_state(state(2)).unwrap();
        cl.connect(a, b, ClosureEdge::time());
        cl.connect(b, a, ClosureEdge::time());
        cl.set_initial(init);

        assert_eq!(remove_unreachable_states(&mut cl), 0);
        assert_eq!(cl.state_count(), 3);
    }

    #[test]
    fn states_fed_only_by_dropped_states_follow_them() {
        // o0 -> o1, o1 additionally fed by init-reachable chain? no: both orphaned
        let mut cl = ClosureAutomaton::new();
        let init = cl.create_state(state(0)).unwrap();
        let o0 = cl.create_state(state(1)).unwrap();
        let o1 = cl.create_state(state(2)).unwrap();
        let kept = cl.create_state(state(3)).unwrap();
        cl.connect(o0, o1, ClosureEdge::time());
        cl.connect(init, kept, ClosureEdge::time());
        cl.connect(o0, kept, ClosureEdge::time());
        cl.set_initial(init);

        assert_eq!(remove_unreachable_states(&mut cl), 2);
        // kept is still fed by init
        assert_eq!(cl.state_count(), 2);
    }
}
