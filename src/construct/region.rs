//! Region automaton construction: flood fill over service-action and time
//! edges, partner actions lifted between regions.
use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::automaton::closure::ClosureAutomaton;
use crate::automaton::core::StatePayload;
use crate::automaton::region::{RegionAutomaton, RegionEdge, RegionState};

/// Quotients the closure automaton: each region is the maximal set of
/// non-empty closure states connected (in either direction) through service
/// and time edges; inter-region edges carry the partner actions.
pub fn construct_region_automaton(closure: &ClosureAutomaton) -> RegionAutomaton {
    let mut regions = RegionAutomaton::new();
    let mut region_of: BTreeMap<NodeIndex, NodeIndex> = BTreeMap::new();
    let mut visited: BTreeSet<NodeIndex> = BTreeSet::new();

    for start in closure.states_ordered() {
        if visited.contains(&start) || closure.state(start).is_empty() {
            continue;
        }

        // flood fill with an explicit stack; deep regions must not recurse
        let mut members = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            if closure.state(idx).is_empty() || !visited.insert(idx) {
                continue;
            }
            members.insert(idx);
            for edge in closure.outgoing(idx) {
                if edge.weight().kind.is_service_action() || edge.weight().kind.is_time_action() {
                    stack.push(edge.target());
                }
            }
            for edge in closure.incoming(idx) {
                if edge.weight().kind.is_service_action() || edge.weight().kind.is_time_action() {
                    stack.push(edge.source());
                }
            }
        }

        let mut payload = RegionState::new(members.clone());
        payload.set_final(members.iter().any(|&idx| closure.state(idx).is_final()));
        let (region_idx, _) = regions.find_or_create(payload);
        for member in members {
            region_of.insert(member, region_idx);
        }
    }

    // lift partner edges; duplicates between the same regions collapse
    for source in closure.states_ordered() {
        let Some(&source_region) = region_of.get(&source) else {
            continue;
        };
        for edge in closure.outgoing(source) {
            if !edge.weight().kind.is_partner_action() {
                continue;
            }
            if let Some(&target_region) = region_of.get(&edge.target()) {
                regions.connect(
                    source_region,
                    target_region,
                    RegionEdge::new(edge.weight().label.clone()),
                );
            }
        }
    }

    if let Some(initial) = closure.initial() {
        if let Some(&initial_region) = region_of.get(&initial) {
            regions.set_initial(initial_region);
        }
    }

    debug!(
        "region automaton: {} regions, {} edges",
        regions.state_count(),
        regions.edge_count()
    );
    regions
}
