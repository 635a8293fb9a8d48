//! Simple automata: named states and labeled edges, as read and written by
//! the text format.
use crate::automaton::core::{Automaton, EdgePayload, StatePayload};

#[derive(Debug, Clone)]
pub struct SimpleState {
    pub name: String,
    final_: bool,
}

impl SimpleState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            final_: false,
        }
    }

    pub fn set_final(&mut self, final_: bool) {
        self.final_ = final_;
    }
}

impl StatePayload for SimpleState {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn is_final(&self) -> bool {
        self.final_
    }
}

/// An empty label denotes tau.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleEdge {
    pub label: String,
}

impl SimpleEdge {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl EdgePayload for SimpleEdge {
    fn label(&self) -> &str {
        &self.label
    }
}

pub type SimpleAutomaton = Automaton<SimpleState, SimpleEdge>;
