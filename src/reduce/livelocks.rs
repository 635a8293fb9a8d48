//! Removal of states whose closure can cycle internally forever.
use log::debug;

use crate::automaton::closure::ClosureAutomaton;

/// Deletes every state whose tau-exploration re-entered an already-visited
/// net state: inside such a closure the service can refuse to ever produce
/// an observable action. Returns the number of removed states.
pub fn remove_livelock_states(automaton: &mut ClosureAutomaton) -> usize {
    let livelocks: Vec<_> = automaton
        .states_ordered()
        .into_iter()
        .filter(|&idx| automaton.state(idx).closure().contains_loop())
        .collect();
    let count = livelocks.len();
    automaton.delete_states(livelocks);
    debug!("livelock states removed: {}", count);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::closure::construct_closure_automaton;
    use crate::net::core::Net;
    use crate::net::maximal::construct_maximal_net;
    use crate::net::structure::{Marking, TimeInterval};

    #[test]
    fn internal_cycles_are_removed() {
        // A --t--> A internally, with an output place so the net is open
        let mut net = Net::empty();
        let a = net.create_place("A", 1).unwrap();
        let out = net.create_place("o", 1).unwrap();
        net.set_output_place(out).unwrap();
        let t = net
            .create_transition("t", TimeInterval::default())
            .unwrap();
        net.connect_place_to_transition(a, t, 1).unwrap();
        net.connect_transition_to_place(t, a, 1).unwrap();
        let u = net
            .create_transition("u", TimeInterval::default())
            .unwrap();
        net.connect_place_to_transition(a, u, 1).unwrap();
        net.connect_transition_to_place(u, out, 1).unwrap();
        net.set_initial_marking(Marking::from_vec(vec![1, 0]))
            .unwrap();
        construct_maximal_net(&mut net).unwrap();

        let mut closure = construct_closure_automaton(&net).unwrap();
        let with_loop = closure
            .states_ordered()
            .into_iter()
            .filter(|&idx| closure.state(idx).closure().contains_loop())
            .count();
        assert!(with_loop > 0);

        let removed = remove_livelock_states(&mut closure);
        assert_eq!(removed, with_loop);
        assert!(closure
            .states_ordered()
            .into_iter()
            .all(|idx| !closure.state(idx).closure().contains_loop()));
    }
}
