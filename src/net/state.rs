//! 网状态：库所标识与时钟标识的有序对.
use std::fmt::Write as _;

use crate::net::core::Net;
use crate::net::structure::{Marking, TimeMarking};

/// A timed net state. The derived order is lexicographic over the place
/// marking first, then over the time marking, which gives the total order
/// the automata key their states by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetState {
    pub places: Marking,
    pub times: TimeMarking,
}

impl NetState {
    pub fn new(places: Marking, times: TimeMarking) -> Self {
        Self { places, times }
    }

    pub fn is_bounded(&self, net: &Net) -> bool {
        net.is_bounded(&self.places)
    }

    /// Final means the place marking matches one of the net's registered
    /// final markings; clocks are ignored.
    pub fn is_final_marking(&self, net: &Net) -> bool {
        net.is_final_marking(&self.places)
    }

    /// Renders `([p:1,q:0],[t:2,u:#])` with names taken from `net`.
    pub fn display(&self, net: &Net) -> String {
        let mut out = String::new();
        out.push_str("([");
        for (i, (place, tokens)) in self.places.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}:{}", net.places[place].name, tokens);
        }
        out.push_str("],[");
        for (i, (transition, clock)) in self.times.0.iter_enumerated().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}:{}", net.transitions[transition].name, clock);
        }
        out.push_str("])");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::Clock;

    fn state(places: Vec<u64>, clocks: Vec<Clock>) -> NetState {
        NetState::new(
            Marking::from_vec(places),
            TimeMarking(clocks.into()),
        )
    }

    #[test]
    fn order_is_places_first_then_clocks() {
        let a = state(vec![0, 1], vec![Clock::Active(5)]);
        let b = state(vec![1, 0], vec![Clock::Active(0)]);
        assert!(a < b);

        // 相同库所标识时按时钟排序
        let c = state(vec![1, 0], vec![Clock::Active(1)]);
        assert!(b < c);
        let d = state(vec![1, 0], vec![Clock::Disabled]);
        assert!(c < d);
    }
}
