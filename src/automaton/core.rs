//! Shared automaton skeleton: a stable graph of state payloads plus a
//! key-ordered index for find-or-create and deterministic iteration.
use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use thiserror::Error;

/// State payload of an automaton. The key is the identity used by
/// find-or-create; it must not change after insertion.
pub trait StatePayload {
    type Key: Ord + Clone;

    fn key(&self) -> Self::Key;
    fn is_final(&self) -> bool;
}

/// Edge payload. Two edges between the same endpoints with equal payloads
/// are the same edge; `connect` never duplicates them.
pub trait EdgePayload: Clone + PartialEq {
    fn label(&self) -> &str;

    fn is_tau(&self) -> bool {
        self.label().is_empty()
    }
}

#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("automaton already contains a state with the given key")]
    DuplicateState,
}

/// A directed, edge-labeled automaton. States and edges live in a stable
/// arena; handles stay valid across deletions of other states.
#[derive(Debug)]
pub struct Automaton<S: StatePayload, E: EdgePayload> {
    graph: StableDiGraph<S, E>,
    index: BTreeMap<S::Key, NodeIndex>,
    initial: Option<NodeIndex>,
}

impl<S: StatePayload, E: EdgePayload> Automaton<S, E> {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
            index: BTreeMap::new(),
            initial: None,
        }
    }

    pub fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &StableDiGraph<S, E> {
        &self.graph
    }

    /// Inserts a state whose key must be fresh.
    pub fn create_state(&mut self, payload: S) -> Result<NodeIndex, AutomatonError> {
        let key = payload.key();
        if self.index.contains_key(&key) {
            return Err(AutomatonError::DuplicateState);
        }
        let idx = self.graph.add_node(payload);
        self.index.insert(key, idx);
        Ok(idx)
    }

    /// Returns the state with the payload's key, creating it if absent. The
    /// boolean is true when the state was created by this call.
    pub fn find_or_create(&mut self, payload: S) -> (NodeIndex, bool) {
        let key = payload.key();
        if let Some(&idx) = self.index.get(&key) {
            return (idx, false);
        }
        let idx = self.graph.add_node(payload);
        self.index.insert(key, idx);
        (idx, true)
    }

    pub fn find(&self, key: &S::Key) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn state(&self, idx: NodeIndex) -> &S {
        &self.graph[idx]
    }

    pub fn state_mut(&mut self, idx: NodeIndex) -> &mut S {
        &mut self.graph[idx]
    }

    pub fn set_initial(&mut self, idx: NodeIndex) {
        self.initial = Some(idx);
    }

    pub fn initial(&self) -> Option<NodeIndex> {
        self.initial
    }

    /// Connects two states. An edge with an equal payload between the same
    /// endpoints is returned instead of being duplicated.
    pub fn connect(&mut self, source: NodeIndex, target: NodeIndex, payload: E) -> EdgeIndex {
        if let Some(existing) = self
            .graph
            .edges_connecting(source, target)
            .find(|edge| *edge.weight() == payload)
        {
            return existing.id();
        }
        self.graph.add_edge(source, target, payload)
    }

    /// All states in key order; the deterministic iteration order of every
    /// pass and renderer.
    pub fn states_ordered(&self) -> Vec<NodeIndex> {
        self.index.values().copied().collect()
    }

    pub fn final_states(&self) -> Vec<NodeIndex> {
        self.states_ordered()
            .into_iter()
            .filter(|&idx| self.graph[idx].is_final())
            .collect()
    }

    pub fn outgoing(
        &self,
        idx: NodeIndex,
    ) -> impl Iterator<Item = petgraph::stable_graph::EdgeReference<'_, E>> {
        self.graph.edges_directed(idx, Direction::Outgoing)
    }

    pub fn incoming(
        &self,
        idx: NodeIndex,
    ) -> impl Iterator<Item = petgraph::stable_graph::EdgeReference<'_, E>> {
        self.graph.edges_directed(idx, Direction::Incoming)
    }

    /// Removes a state together with its incident edges. The index entry is
    /// dropped before the storage is released.
    pub fn delete_state(&mut self, idx: NodeIndex) {
        if let Some(payload) = self.graph.remove_node(idx) {
            self.index.remove(&payload.key());
            if self.initial == Some(idx) {
                self.initial = None;
            }
        }
    }

    /// Batch deletion: the to-delete set is collected by the caller first.
    pub fn delete_states(&mut self, indices: impl IntoIterator<Item = NodeIndex>) {
        for idx in indices {
            self.delete_state(idx);
        }
    }
}

impl<S: StatePayload, E: EdgePayload> Default for Automaton<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
