pub mod deadlocks;
pub mod livelocks;
pub mod unreachable;

pub use deadlocks::{DeadlockStats, mark_potential_deadlocks, remove_deadlocks};
pub use livelocks::remove_livelock_states;
pub use unreachable::remove_unreachable_states;
