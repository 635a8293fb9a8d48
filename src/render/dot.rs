//! Graph-description-language output for behavior and closure automata.
use std::collections::BTreeMap;
use std::io::{self, Write};

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::automaton::behavior::BehaviorAutomaton;
use crate::automaton::closure::ClosureAutomaton;
use crate::automaton::core::{EdgePayload, StatePayload};
use crate::automaton::region::RegionAutomaton;
use crate::net::core::Net;

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn write_behavior(
    net: &Net,
    behavior: &BehaviorAutomaton,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "digraph {{")?;
    writeln!(out, "    rankdir=LR;")?;

    let states = behavior.states_ordered();
    let ids: BTreeMap<NodeIndex, usize> =
        states.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();

    for &idx in &states {
        let state = behavior.state(idx);
        let mut attrs = format!("label=\"{}\", shape=ellipse", escape(&state.display(net)));
        if state.is_final() {
            attrs.push_str(", peripheries=2");
        }
        if Some(idx) == behavior.initial() {
            attrs.push_str(", style=bold");
        }
        writeln!(out, "    {} [{}];", ids[&idx], attrs)?;
    }

    for edge in behavior.graph().edge_references() {
        writeln!(
            out,
            "    {} -> {} [label=\"{}\"];",
            ids[&edge.source()],
            ids[&edge.target()],
            escape(edge.weight().label())
        )?;
    }

    writeln!(out, "}}")
}

/// Renders the closure automaton, grouping states of one region into a
/// cluster. Empty states can be suppressed; deadlock-marked states are
/// filled and annotated with their distance.
pub fn write_closure(
    net: &Net,
    closure: &ClosureAutomaton,
    regions: Option<&RegionAutomaton>,
    show_empty: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "digraph {{")?;
    writeln!(out, "    rankdir=LR;")?;

    let states = closure.states_ordered();
    let ids: BTreeMap<NodeIndex, usize> =
        states.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();
    let hidden =
        |idx: NodeIndex| -> bool { !show_empty && closure.state(idx).is_empty() };

    let mut clustered: BTreeMap<NodeIndex, usize> = BTreeMap::new();
    if let Some(regions) = regions {
        for (cluster, region_idx) in regions.states_ordered().into_iter().enumerate() {
            writeln!(out, "    subgraph cluster_{} {{", cluster)?;
            writeln!(out, "        style=dashed;")?;
            for &member in regions.state(region_idx).region() {
                if ids.contains_key(&member) && !hidden(member) {
                    write_closure_state(net, closure, member, ids[&member], 8, out)?;
                    clustered.insert(member, cluster);
                }
            }
            writeln!(out, "    }}")?;
        }
    }

    for &idx in &states {
        if clustered.contains_key(&idx) || hidden(idx) {
            continue;
        }
        write_closure_state(net, closure, idx, ids[&idx], 4, out)?;
    }

    for edge in closure.graph().edge_references() {
        if hidden(edge.source()) || hidden(edge.target()) {
            continue;
        }
        let style = if edge.weight().kind.is_partner_action() {
            ", style=dashed"
        } else if edge.weight().kind.is_time_action() {
            ", style=dotted"
        } else {
            ""
        };
        writeln!(
            out,
            "    {} -> {} [label=\"{}\"{}];",
            ids[&edge.source()],
            ids[&edge.target()],
            escape(edge.weight().label()),
            style
        )?;
    }

    writeln!(out, "}}")
}

fn write_closure_state(
    net: &Net,
    closure: &ClosureAutomaton,
    idx: NodeIndex,
    id: usize,
    indent: usize,
    out: &mut impl Write,
) -> io::Result<()> {
    let state = closure.state(idx);
    let label = if state.is_bound_violation() {
        "!".to_string()
    } else if state.is_empty() {
        "empty".to_string()
    } else {
        state.closure().display(net, "\n")
    };

    let mut attrs = format!("label=\"{}\", shape=ellipse", escape(&label));
    if state.is_final() {
        attrs.push_str(", peripheries=2");
    }
    if Some(idx) == closure.initial() {
        attrs.push_str(", style=bold");
    }
    if state.deadlock_distance() > 0 {
        attrs.push_str(&format!(
            ", style=filled, fillcolor=\"#fadbd8\", xlabel=\"{}\"",
            state.deadlock_distance()
        ));
    }
    writeln!(out, "{:indent$}{} [{}];", "", id, attrs, indent = indent)
}
