//! Simulation checks between automata.
use std::collections::BTreeSet;

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::automaton::core::{Automaton, EdgePayload, StatePayload};

/// `simulator` simulates `simulatee` iff a relation containing the pair of
/// initial states exists such that every labeled step of the simulatee can
/// be mirrored by an equally labeled step of the simulator. A missing
/// initial state on either side means no relation exists.
pub fn simulates<SA, EA, SB, EB>(
    simulator: &Automaton<SA, EA>,
    simulatee: &Automaton<SB, EB>,
) -> bool
where
    SA: StatePayload,
    EA: EdgePayload,
    SB: StatePayload,
    EB: EdgePayload,
{
    check_roots(simulator, simulatee, false)
}

/// Weak simulation: the simulator may wrap its answering step into tau
/// moves, and mirrors a tau step by any number of tau moves (including
/// none).
pub fn weakly_simulates<SA, EA, SB, EB>(
    simulator: &Automaton<SA, EA>,
    simulatee: &Automaton<SB, EB>,
) -> bool
where
    SA: StatePayload,
    EA: EdgePayload,
    SB: StatePayload,
    EB: EdgePayload,
{
    check_roots(simulator, simulatee, true)
}

fn check_roots<SA, EA, SB, EB>(
    simulator: &Automaton<SA, EA>,
    simulatee: &Automaton<SB, EB>,
    weak: bool,
) -> bool
where
    SA: StatePayload,
    EA: EdgePayload,
    SB: StatePayload,
    EB: EdgePayload,
{
    let (Some(init_a), Some(init_b)) = (simulator.initial(), simulatee.initial()) else {
        return false;
    };
    let mut relation = BTreeSet::new();
    check(simulator, simulatee, init_a, init_b, &mut relation, weak)
}

fn check<SA, EA, SB, EB>(
    simulator: &Automaton<SA, EA>,
    simulatee: &Automaton<SB, EB>,
    mine: NodeIndex,
    other: NodeIndex,
    relation: &mut BTreeSet<(NodeIndex, NodeIndex)>,
    weak: bool,
) -> bool
where
    SA: StatePayload,
    EA: EdgePayload,
    SB: StatePayload,
    EB: EdgePayload,
{
    // coinductive: a pair already under consideration counts as matched
    if !relation.insert((mine, other)) {
        return true;
    }

    for edge in simulatee.outgoing(other) {
        let candidates: Vec<NodeIndex> = if weak {
            weak_successors(simulator, mine, edge.weight().label(), edge.weight().is_tau())
        } else {
            simulator
                .outgoing(mine)
                .filter(|e| e.weight().label() == edge.weight().label())
                .map(|e| e.target())
                .collect()
        };

        let mut matched = false;
        for candidate in candidates {
            let mut attempt = relation.clone();
            if check(
                simulator,
                simulatee,
                candidate,
                edge.target(),
                &mut attempt,
                weak,
            ) {
                *relation = attempt;
                matched = true;
                break;
            }
        }
        if !matched {
            return false;
        }
    }
    true
}

fn tau_closure<S, E>(automaton: &Automaton<S, E>, start: NodeIndex) -> BTreeSet<NodeIndex>
where
    S: StatePayload,
    E: EdgePayload,
{
    let mut closure = BTreeSet::new();
    let mut stack = vec![start];
    while let Some(idx) = stack.pop() {
        if !closure.insert(idx) {
            continue;
        }
        for edge in automaton.outgoing(idx) {
            if edge.weight().is_tau() {
                stack.push(edge.target());
            }
        }
    }
    closure
}

/// States reachable via `tau* label tau*` (or plain `tau*` when the matched
/// step itself is tau).
fn weak_successors<S, E>(
    automaton: &Automaton<S, E>,
    from: NodeIndex,
    label: &str,
    tau: bool,
) -> Vec<NodeIndex>
where
    S: StatePayload,
    E: EdgePayload,
{
    let before = tau_closure(automaton, from);
    if tau {
        return before.into_iter().collect();
    }

    let mut result = BTreeSet::new();
    for idx in before {
        for edge in automaton.outgoing(idx) {
            if !edge.weight().is_tau() && edge.weight().label() == label {
                result.extend(tau_closure(automaton, edge.target()));
            }
        }
    }
    result.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::simple::{SimpleAutomaton, SimpleEdge, SimpleState};

    fn automaton(
        states: &[&str],
        edges: &[(&str, &str, &str)],
        initial: &str,
    ) -> SimpleAutomaton {
        let mut result = SimpleAutomaton::new();
        for name in states {
            result.create_state(SimpleState::new(*name)).unwrap();
        }
        for (from, label, to) in edges {
            let from = result.find(&from.to_string()).unwrap();
            let to = result.find(&to.to_string()).unwrap();
            result.connect(from, to, SimpleEdge::new(*label));
        }
        let initial = result.find(&initial.to_string()).unwrap();
        result.set_initial(initial);
        result
    }

    #[test]
    fn branching_automaton_simulates_a_loop() {
        let a = automaton(&["0", "1"], &[("0", "a", "1"), ("0", "b", "0")], "0");
        let b = automaton(&["x"], &[("x", "a", "x")], "x");
        assert!(simulates(&a, &b));
    }

    #[test]
    fn missing_labels_break_the_simulation() {
        let a = automaton(&["0", "1"], &[("0", "a", "1"), ("0", "b", "0")], "0");
        let b = automaton(&["x"], &[("x", "a", "x"), ("x", "c", "x")], "x");
        assert!(!simulates(&a, &b));
    }

    #[test]
    fn simulation_is_reflexive() {
        let a = automaton(
            &["0", "1", "2"],
            &[("0", "a", "1"), ("1", "b", "2"), ("2", "a", "0")],
            "0",
        );
        assert!(simulates(&a, &a));
        assert!(weakly_simulates(&a, &a));
    }

    #[test]
    fn missing_initial_states_mean_no_relation() {
        let a = automaton(&["0"], &[], "0");
        let mut b = SimpleAutomaton::new();
        b.create_state(SimpleState::new("x")).unwrap();
        assert!(!simulates(&a, &b));
        assert!(!simulates(&b, &a));
    }

    #[test]
    fn weak_simulation_skips_tau_prefixes() {
        // x --tau--> y --a--> z versus p --a--> q
        let a = automaton(&["x", "y", "z"], &[("x", "", "y"), ("y", "a", "z")], "x");
        let b = automaton(&["p", "q"], &[("p", "a", "q")], "p");
        assert!(!simulates(&a, &b));
        assert!(weakly_simulates(&a, &b));
    }

    #[test]
    fn weak_simulation_matches_tau_by_staying_put() {
        let a = automaton(&["x"], &[], "x");
        let b = automaton(&["p", "q"], &[("p", "", "q")], "p");
        assert!(weakly_simulates(&a, &b));
    }

    #[test]
    fn nondeterministic_choices_are_backtracked() {
        // two a-successors; only one of them answers b
        let a = automaton(
            &["0", "dead", "live"],
            &[("0", "a", "dead"), ("0", "a", "live"), ("live", "b", "live")],
            "0",
        );
        let b = automaton(&["x", "y"], &[("x", "a", "y"), ("y", "b", "y")], "x");
        assert!(simulates(&a, &b));
    }
}
