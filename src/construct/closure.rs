//! Closure automaton construction: tau-closures as states, observable
//! actions and unit time steps as edges.
use std::collections::VecDeque;

use log::debug;

use crate::automaton::closure::{
    ClosureAutomaton, ClosureEdge, ClosureState, EdgeKind,
};
use crate::construct::ConstructError;
use crate::net::core::Net;
use crate::net::ids::TransitionId;
use crate::net::index_vec::Idx;
use crate::net::rule::{Closure, FiringRule, TAU};
use crate::net::state::NetState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionType {
    InputSend,
    InputRead,
    OutputSend,
    OutputRead,
    Internal,
}

/// Classifies every transition by its single interface neighbor. More than
/// one interface neighbor is a configuration error.
fn classify_transitions(net: &Net) -> Result<Vec<TransitionType>, ConstructError> {
    let mut types = Vec::with_capacity(net.transitions_len());
    for transition in net.transitions.indices() {
        let preset_io = net
            .transition_preset(transition)
            .filter(|&(p, _)| net.places[p].is_interface())
            .count();
        let postset_io = net
            .transition_postset(transition)
            .filter(|&(p, _)| net.places[p].is_interface())
            .count();
        if preset_io + postset_io > 1 {
            return Err(ConstructError::MultipleInterfaces(
                net.transitions[transition].name.clone(),
            ));
        }

        types.push(if net.is_input_send(transition) {
            TransitionType::InputSend
        } else if net.is_input_read(transition) {
            TransitionType::InputRead
        } else if net.is_output_send(transition) {
            TransitionType::OutputSend
        } else if net.is_output_read(transition) {
            TransitionType::OutputRead
        } else {
            TransitionType::Internal
        });
    }
    Ok(types)
}

fn edge_kind(transition_type: TransitionType) -> EdgeKind {
    match transition_type {
        TransitionType::InputSend => EdgeKind::InputSend,
        TransitionType::InputRead => EdgeKind::InputRead,
        TransitionType::OutputSend => EdgeKind::OutputSend,
        TransitionType::OutputRead => EdgeKind::OutputRead,
        TransitionType::Internal => unreachable!("internal transitions produce no edges"),
    }
}

fn is_final_closure(net: &Net, closure: &Closure) -> bool {
    closure.states().iter().any(|s| s.is_final_marking(net))
}

pub fn construct_closure_automaton(net: &Net) -> Result<ClosureAutomaton, ConstructError> {
    let types = classify_transitions(net)?;
    let observable: Vec<TransitionId> = net
        .transitions
        .indices()
        .filter(|&t| types[t.index()] != TransitionType::Internal)
        .collect();

    let rule = FiringRule::new(net);
    let mut automaton = ClosureAutomaton::new();

    let initial_closure = rule.build_closure(&rule.initial_state(), &[TAU]);
    let mut payload = ClosureState::new(initial_closure);
    payload.set_final(is_final_closure(net, payload.closure()));
    let initial_idx = automaton.create_state(payload)?;
    automaton.set_initial(initial_idx);

    let mut worklist = VecDeque::from([initial_idx]);
    while let Some(idx) = worklist.pop_front() {
        let states: Vec<NetState> = automaton
            .state(idx)
            .closure()
            .states()
            .iter()
            .cloned()
            .collect();

        for &transition in &observable {
            let mut successors = Vec::new();
            for state in &states {
                if rule.is_fireable(transition, state) {
                    successors.push(rule.fire(transition, state)?);
                }
            }
            let closure = rule.build_closure_from_set(successors, &[TAU]);
            let label = net.transitions[transition].label.clone();
            let kind = edge_kind(types[transition.index()]);
            handle_successor(net, &mut automaton, &mut worklist, idx, closure, label, kind);
        }

        let mut successors = Vec::new();
        for state in &states {
            if rule.can_make_time_step(state) {
                successors.push(rule.make_time_step(state)?);
            }
        }
        let closure = rule.build_closure_from_set(successors, &[TAU]);
        handle_successor(
            net,
            &mut automaton,
            &mut worklist,
            idx,
            closure,
            "1".to_string(),
            EdgeKind::Time,
        );
    }

    debug!(
        "closure automaton: {} states, {} edges",
        automaton.state_count(),
        automaton.edge_count()
    );
    Ok(automaton)
}

fn handle_successor(
    net: &Net,
    automaton: &mut ClosureAutomaton,
    worklist: &mut VecDeque<petgraph::stable_graph::NodeIndex>,
    source: petgraph::stable_graph::NodeIndex,
    closure: Closure,
    label: String,
    kind: EdgeKind,
) {
    if closure.contains_bound_violation() {
        // the shared violation sink is never expanded
        let sink = automaton.bound_violation_state(closure);
        automaton.connect(source, sink, ClosureEdge::new(label, kind));
        return;
    }

    let mut payload = ClosureState::new(closure);
    payload.set_final(is_final_closure(net, payload.closure()));
    let (target, created) = automaton.find_or_create(payload);
    if created {
        worklist.push_back(target);
    }
    automaton.connect(source, target, ClosureEdge::new(label, kind));
}
