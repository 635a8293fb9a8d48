//! 发生规则：使能判定、发生语义、单位时间步与 tau 闭包构造.
use std::cmp::Ordering;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::net::core::Net;
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::state::NetState;
use crate::net::structure::{Clock, Marking, TimeBound, TimeMarking};

/// The tau label: transitions labeled with the empty string are internal.
pub const TAU: &str = "";

#[derive(Debug, Error)]
pub enum FireError {
    #[error("transition '{0}' is not fireable")]
    NotFireable(String),
    #[error("the net does not admit a unit time step")]
    TimeStepNotAdmitted,
}

/// Set of net states reachable from a seed via internal moves, plus two
/// exploration flags. Ordering and equality consider the state set only;
/// the flags are annotations.
#[derive(Debug, Clone, Default)]
pub struct Closure {
    states: BTreeSet<NetState>,
    contains_loop: bool,
    contains_bound_violation: bool,
}

impl Closure {
    pub fn from_states(states: BTreeSet<NetState>) -> Self {
        Self {
            states,
            contains_loop: false,
            contains_bound_violation: false,
        }
    }

    pub fn states(&self) -> &BTreeSet<NetState> {
        &self.states
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, state: &NetState) -> bool {
        self.states.contains(state)
    }

    pub fn contains_loop(&self) -> bool {
        self.contains_loop
    }

    pub fn contains_bound_violation(&self) -> bool {
        self.contains_bound_violation
    }

    pub fn display(&self, net: &Net, state_separator: &str) -> String {
        let rendered: Vec<String> = self.states.iter().map(|s| s.display(net)).collect();
        rendered.join(state_separator)
    }
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states
    }
}

impl Eq for Closure {}

impl PartialOrd for Closure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Closure {
    fn cmp(&self, other: &Self) -> Ordering {
        self.states.cmp(&other.states)
    }
}

/// The stateless firing-rule engine. Borrows the net and maps net states to
/// net states; it never mutates the net.
pub struct FiringRule<'a> {
    net: &'a Net,
}

impl<'a> FiringRule<'a> {
    pub fn new(net: &'a Net) -> Self {
        Self { net }
    }

    pub fn net(&self) -> &Net {
        self.net
    }

    /// Place-enabledness derived from a marking alone.
    pub fn check_place_enabled(&self, transition: TransitionId, marking: &Marking) -> bool {
        self.net
            .transition_preset(transition)
            .all(|(place, weight)| marking.tokens(place) >= weight)
    }

    /// Place-enabledness as cached in the time marking.
    pub fn is_place_enabled(&self, transition: TransitionId, state: &NetState) -> bool {
        !state.times.clock(transition).is_disabled()
    }

    pub fn is_fireable(&self, transition: TransitionId, state: &NetState) -> bool {
        match state.times.clock(transition) {
            Clock::Active(clock) => clock >= self.net.transitions[transition].interval.min(),
            Clock::Disabled => false,
        }
    }

    pub fn fireable_transitions(&self, state: &NetState) -> Vec<TransitionId> {
        self.net
            .transitions
            .indices()
            .filter(|&t| self.is_fireable(t, state))
            .collect()
    }

    /// The initial state: the net's initial marking with a zeroed clock on
    /// every place-enabled transition.
    pub fn initial_state(&self) -> NetState {
        let marking = self.net.initial_marking().clone();
        let mut times = TimeMarking::new(self.net.transitions_len());
        for transition in self.net.transitions.indices() {
            if self.check_place_enabled(transition, &marking) {
                *times.clock_mut(transition) = Clock::Active(0);
            }
        }
        NetState::new(marking, times)
    }

    pub fn fire(&self, transition: TransitionId, state: &NetState) -> Result<NetState, FireError> {
        if !self.is_fireable(transition, state) {
            return Err(FireError::NotFireable(
                self.net.transitions[transition].name.clone(),
            ));
        }
        Ok(self.apply_firing(transition, state))
    }

    fn apply_firing(&self, transition: TransitionId, state: &NetState) -> NetState {
        let mut next = state.clone();

        for (place, weight) in self.net.transition_preset(transition) {
            let tokens = next.places.tokens_mut(place);
            debug_assert!(*tokens >= weight);
            *tokens -= weight;
        }
        for (place, weight) in self.net.transition_postset(transition) {
            *next.places.tokens_mut(place) += weight;
        }

        // Consumption restarts every clock competing for the touched place,
        // production only wakes up newly enabled transitions.
        for (place, _) in self.net.transition_preset(transition) {
            self.reset_postset(place, &mut next);
            self.enable_postset(place, &mut next);
        }
        for (place, _) in self.net.transition_postset(transition) {
            self.enable_postset(place, &mut next);
        }

        next
    }

    fn reset_postset(&self, place: PlaceId, state: &mut NetState) {
        for transition in self.net.place_postset(place) {
            *state.times.clock_mut(transition) = Clock::Active(0);
        }
    }

    fn enable_postset(&self, place: PlaceId, state: &mut NetState) {
        for transition in self.net.place_postset(place) {
            if self.check_place_enabled(transition, &state.places) {
                if state.times.clock(transition).is_disabled() {
                    // transition was disabled, but now became enabled
                    *state.times.clock_mut(transition) = Clock::Active(0);
                }
            } else {
                *state.times.clock_mut(transition) = Clock::Disabled;
            }
        }
    }

    /// A unit step is admitted iff no place-enabled transition would be
    /// pushed past its latest firing time.
    pub fn can_make_time_step(&self, state: &NetState) -> bool {
        self.net.transitions.indices().all(|transition| {
            match state.times.clock(transition) {
                Clock::Active(clock) => self.net.transitions[transition]
                    .interval
                    .admits_step(clock),
                Clock::Disabled => true,
            }
        })
    }

    /// Advances every active clock by one unit. A clock whose transition
    /// has an infinite latest firing time saturates at the earliest firing
    /// time: beyond it, larger values are behaviorally equivalent, and
    /// saturating keeps the reachable state space finite.
    pub fn make_time_step(&self, state: &NetState) -> Result<NetState, FireError> {
        if !self.can_make_time_step(state) {
            return Err(FireError::TimeStepNotAdmitted);
        }
        let mut next = state.clone();
        for transition in self.net.transitions.indices() {
            if let Clock::Active(clock) = next.times.clock(transition) {
                let interval = &self.net.transitions[transition].interval;
                let advanced = match interval.max() {
                    TimeBound::Finite(_) => clock + 1,
                    TimeBound::Infinity if clock < interval.min() => clock + 1,
                    TimeBound::Infinity => clock,
                };
                *next.times.clock_mut(transition) = Clock::Active(advanced);
            }
        }
        Ok(next)
    }

    /// Tau-closure of a single seed state. `labels` names the transition
    /// labels considered internal.
    pub fn build_closure(&self, seed: &NetState, labels: &[&str]) -> Closure {
        self.build_closure_from_set(std::iter::once(seed.clone()), labels)
    }

    /// Tau-closure of a set of seeds, explored with an explicit stack so
    /// that deep closures cannot overflow the call stack.
    pub fn build_closure_from_set(
        &self,
        seeds: impl IntoIterator<Item = NetState>,
        labels: &[&str],
    ) -> Closure {
        let mut closure = Closure::default();
        let mut stack: Vec<NetState> = seeds.into_iter().collect();

        while let Some(state) = stack.pop() {
            if !state.is_bounded(self.net) {
                closure.contains_bound_violation = true;
                continue;
            }
            if closure.states.contains(&state) {
                closure.contains_loop = true;
                continue;
            }
            for &transition in &self.fireable_transitions(&state) {
                if labels.contains(&self.net.transitions[transition].label.as_str()) {
                    stack.push(self.apply_firing(transition, &state));
                }
            }
            closure.states.insert(state);
        }

        closure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::{TimeBound, TimeInterval};

    // 单库所循环网: A(1) --t[eft,lft]--> A
    fn cycle_net(eft: u64, lft: TimeBound) -> Net {
        let mut net = Net::empty();
        let a = net.create_place("A", 1).unwrap();
        let t = net
            .create_transition("t", TimeInterval::new(eft, lft).unwrap())
            .unwrap();
        net.connect_place_to_transition(a, t, 1).unwrap();
        net.connect_transition_to_place(t, a, 1).unwrap();
        net.set_initial_marking(Marking::from_vec(vec![1])).unwrap();
        net
    }

    #[test]
    fn initial_state_zeroes_enabled_clocks() {
        let net = cycle_net(2, TimeBound::Finite(3));
        let rule = FiringRule::new(&net);
        let init = rule.initial_state();
        let t = net.find_transition("t").unwrap();
        assert_eq!(init.times.clock(t), Clock::Active(0));
        assert!(rule.is_place_enabled(t, &init));
        assert!(!rule.is_fireable(t, &init));
    }

    #[test]
    fn time_enabled_implies_place_enabled() {
        let net = cycle_net(0, TimeBound::Infinity);
        let rule = FiringRule::new(&net);
        let init = rule.initial_state();
        let t = net.find_transition("t").unwrap();
        assert!(rule.is_place_enabled(t, &init));
        assert!(rule.check_place_enabled(t, &init.places));
    }

    #[test]
    fn firing_resets_the_clock_of_the_fired_transition() {
        let net = cycle_net(2, TimeBound::Finite(3));
        let rule = FiringRule::new(&net);
        let t = net.find_transition("t").unwrap();

        let mut state = rule.initial_state();
        for _ in 0..2 {
            state = rule.make_time_step(&state).unwrap();
        }
        assert!(rule.is_fireable(t, &state));

        let next = rule.fire(t, &state).unwrap();
        assert_eq!(next, rule.initial_state());
    }

    #[test]
    fn firing_is_deterministic() {
        let net = cycle_net(0, TimeBound::Infinity);
        let rule = FiringRule::new(&net);
        let t = net.find_transition("t").unwrap();
        let init = rule.initial_state();
        assert_eq!(rule.fire(t, &init).unwrap(), rule.fire(t, &init).unwrap());
    }

    #[test]
    fn firing_a_non_fireable_transition_fails() {
        let net = cycle_net(2, TimeBound::Finite(3));
        let rule = FiringRule::new(&net);
        let t = net.find_transition("t").unwrap();
        let init = rule.initial_state();
        assert!(matches!(
            rule.fire(t, &init),
            Err(FireError::NotFireable(_))
        ));
    }

    #[test]
    fn time_step_blocked_at_latest_firing_time() {
        let net = cycle_net(0, TimeBound::Finite(0));
        let rule = FiringRule::new(&net);
        let init = rule.initial_state();
        // 区间 [0,0]: 立即可发生, 时间不得前进
        assert!(rule.can_make_time_step(&init) == false);
        assert!(matches!(
            rule.make_time_step(&init),
            Err(FireError::TimeStepNotAdmitted)
        ));
    }

    #[test]
    fn unbounded_interval_never_blocks_time() {
        let net = cycle_net(0, TimeBound::Infinity);
        let rule = FiringRule::new(&net);
        let mut state = rule.initial_state();
        for _ in 0..64 {
            state = rule.make_time_step(&state).unwrap();
        }
    }

    #[test]
    fn clocks_saturate_at_eft_under_infinite_lft() {
        let net = cycle_net(2, TimeBound::Infinity);
        let rule = FiringRule::new(&net);
        let t = net.find_transition("t").unwrap();

        let mut state = rule.initial_state();
        for expected in [1, 2, 2, 2] {
            state = rule.make_time_step(&state).unwrap();
            assert_eq!(state.times.clock(t), Clock::Active(expected));
        }
        // 饱和后时间步为恒等, 可达状态空间保持有限
        assert_eq!(state, rule.make_time_step(&state).unwrap());
    }

    #[test]
    fn disabled_clocks_are_untouched_by_time_steps() {
        let mut net = Net::empty();
        let a = net.create_place("A", 1).unwrap();
        let b = net.create_place("B", 1).unwrap();
        let t = net
            .create_transition("t", TimeInterval::default())
            .unwrap();
        let u = net
            .create_transition("u", TimeInterval::default())
            .unwrap();
        net.connect_place_to_transition(a, t, 1).unwrap();
        net.connect_place_to_transition(b, u, 1).unwrap();
        net.set_initial_marking(Marking::from_vec(vec![1, 0])).unwrap();

        let rule = FiringRule::new(&net);
        let init = rule.initial_state();
        assert_eq!(init.times.clock(u), Clock::Disabled);

        let stepped = rule.make_time_step(&init).unwrap();
        assert_eq!(stepped.times.clock(t), Clock::Active(1));
        assert_eq!(stepped.times.clock(u), Clock::Disabled);
    }

    #[test]
    fn production_wakes_up_newly_enabled_transitions() {
        // A --t--> B --u--> ()
        let mut net = Net::empty();
        let a = net.create_place("A", 1).unwrap();
        let b = net.create_place("B", 1).unwrap();
        let t = net
            .create_transition("t", TimeInterval::default())
            .unwrap();
        let u = net
            .create_transition("u", TimeInterval::default())
            .unwrap();
        net.connect_place_to_transition(a, t, 1).unwrap();
        net.connect_transition_to_place(t, b, 1).unwrap();
        net.connect_place_to_transition(b, u, 1).unwrap();
        net.set_initial_marking(Marking::from_vec(vec![1, 0])).unwrap();

        let rule = FiringRule::new(&net);
        let init = rule.initial_state();
        let after = rule.fire(t, &init).unwrap();
        assert_eq!(after.times.clock(t), Clock::Disabled);
        assert_eq!(after.times.clock(u), Clock::Active(0));
    }

    #[test]
    fn closure_detects_internal_loops() {
        let mut net = cycle_net(0, TimeBound::Infinity);
        let t = net.find_transition("t").unwrap();
        net.transitions[t].label = String::new();

        let rule = FiringRule::new(&net);
        let closure = rule.build_closure(&rule.initial_state(), &[TAU]);
        assert_eq!(closure.states().len(), 1);
        assert!(closure.contains_loop());
        assert!(!closure.contains_bound_violation());
    }

    #[test]
    fn closure_flags_bound_violations() {
        // t 无前集, 向有界库所 P 持续产生 token
        let mut net = Net::empty();
        let p = net.create_place("P", 1).unwrap();
        let t = net
            .create_transition("t", TimeInterval::default())
            .unwrap();
        net.connect_transition_to_place(t, p, 1).unwrap();
        net.set_initial_marking(Marking::from_vec(vec![1])).unwrap();
        net.transitions[t].label = String::new();

        let rule = FiringRule::new(&net);
        let closure = rule.build_closure(&rule.initial_state(), &[TAU]);
        assert!(closure.contains_bound_violation());
        assert_eq!(closure.states().len(), 1);
    }

    #[test]
    fn closure_is_idempotent_up_to_the_loop_flag() {
        // A --t--> B, t 为内部迁移
        let mut net = Net::empty();
        let a = net.create_place("A", 1).unwrap();
        let b = net.create_place("B", 1).unwrap();
        let t = net
            .create_transition("t", TimeInterval::default())
            .unwrap();
        net.connect_place_to_transition(a, t, 1).unwrap();
        net.connect_transition_to_place(t, b, 1).unwrap();
        net.set_initial_marking(Marking::from_vec(vec![1, 0])).unwrap();
        net.transitions[t].label = String::new();

        let rule = FiringRule::new(&net);
        let once = rule.build_closure(&rule.initial_state(), &[TAU]);
        assert_eq!(once.states().len(), 2);

        let twice = rule.build_closure_from_set(once.states().iter().cloned(), &[TAU]);
        assert_eq!(once, twice);
        assert!(twice.contains_loop());
    }
}
