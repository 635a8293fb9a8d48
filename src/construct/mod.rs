pub mod behavior;
pub mod closure;
pub mod region;

use thiserror::Error;

use crate::automaton::core::AutomatonError;
use crate::net::rule::FireError;

#[derive(Debug, Error)]
pub enum ConstructError {
    #[error(transparent)]
    Fire(#[from] FireError),
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
    #[error("transition '{0}' is connected to more than one interface place")]
    MultipleInterfaces(String),
}

pub use behavior::ConstructBehavior;
pub use closure::construct_closure_automaton;
pub use region::construct_region_automaton;
