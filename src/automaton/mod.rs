pub mod behavior;
pub mod closure;
pub mod core;
pub mod region;
pub mod simple;

pub use behavior::{BehaviorAutomaton, BehaviorEdge, BehaviorKey, BehaviorState};
pub use closure::{ClosureAutomaton, ClosureEdge, ClosureKey, ClosureState, EdgeKind};
pub use self::core::{Automaton, AutomatonError, EdgePayload, StatePayload};
pub use region::{RegionAutomaton, RegionEdge, RegionState};
pub use simple::{SimpleAutomaton, SimpleEdge, SimpleState};
