//! Plain-text automaton writer, mirroring the automaton input format.
use std::collections::BTreeMap;
use std::io::{self, Write};

use itertools::Itertools;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::automaton::core::{Automaton, EdgePayload, StatePayload};
use crate::automaton::simple::SimpleAutomaton;

/// Writes `automaton` in the text format, naming states through `namer`.
/// Output order is deterministic: states in key order, edges by source,
/// label and target.
pub fn write_automaton<S, E, W, F>(
    automaton: &Automaton<S, E>,
    out: &mut W,
    mut namer: F,
) -> io::Result<()>
where
    S: StatePayload,
    E: EdgePayload,
    W: Write,
    F: FnMut(usize, &S) -> String,
{
    let states = automaton.states_ordered();
    let names: BTreeMap<NodeIndex, String> = states
        .iter()
        .enumerate()
        .map(|(position, &idx)| (idx, namer(position, automaton.state(idx))))
        .collect();

    writeln!(out, "AUTOMATON")?;

    if !states.is_empty() {
        writeln!(out, "STATES {};", states.iter().map(|idx| &names[idx]).join(","))?;
    }

    let mut edges: Vec<(&String, &str, &String)> = automaton
        .graph()
        .edge_references()
        .map(|edge| {
            (
                &names[&edge.source()],
                edge.weight().label(),
                &names[&edge.target()],
            )
        })
        .collect();
    edges.sort();
    for (from, label, to) in edges {
        writeln!(out, "TRANSITION {}; FROM {}; TO {};", label, from, to)?;
    }

    if let Some(initial) = automaton.initial() {
        writeln!(out, "INITIALSTATE {};", names[&initial])?;
    }

    let finals = automaton.final_states();
    if !finals.is_empty() {
        writeln!(
            out,
            "FINALSTATES {};",
            finals.iter().map(|idx| &names[idx]).join(",")
        )?;
    }
    Ok(())
}

/// Simple automata keep their own state names.
pub fn write_simple(automaton: &SimpleAutomaton, out: &mut impl Write) -> io::Result<()> {
    write_automaton(automaton, out, |_, state| state.name.clone())
}

/// Behavior and closure automata get fresh sequential names.
pub fn write_anonymous<S, E>(automaton: &Automaton<S, E>, out: &mut impl Write) -> io::Result<()>
where
    S: StatePayload,
    E: EdgePayload,
{
    write_automaton(automaton, out, |position, _| format!("s{}", position))
}
