//! 区间网容器：库所/迁移表、弧矩阵与初始/终止标识.
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::incidence::Incidence;
use crate::net::index_vec::IndexVec;
use crate::net::structure::{Marking, Place, TimeInterval, Transition, Weight};

#[derive(Debug, Error)]
pub enum NetError {
    #[error("net already contains a place with name '{0}'")]
    DuplicatePlace(String),
    #[error("net already contains a transition with name '{0}'")]
    DuplicateTransition(String),
    #[error("invalid firing interval [{eft},{lft}]")]
    InvalidInterval { eft: u64, lft: u64 },
    #[error("arc multiplicity must be at least 1")]
    InvalidMultiplicity,
    #[error("place '{0}' cannot be both an input and an output place")]
    InterfaceConflict(String),
    #[error("marking has {found} entries but the net has {expected} places")]
    MarkingSize { expected: usize, found: usize },
}

/// An interval-timed open workflow net. Populated once through the checked
/// constructors below; the analysis passes never mutate it.
#[derive(Clone)]
pub struct Net {
    pub places: IndexVec<PlaceId, Place>,
    pub transitions: IndexVec<TransitionId, Transition>,
    pub pre: Incidence<Weight>,
    pub post: Incidence<Weight>,
    initial_marking: Marking,
    final_markings: Vec<Marking>,
    place_names: HashMap<String, PlaceId>,
    transition_names: HashMap<String, TransitionId>,
}

impl Net {
    pub fn empty() -> Self {
        Self {
            places: IndexVec::new(),
            transitions: IndexVec::new(),
            pre: Incidence::new(0, 0, 0),
            post: Incidence::new(0, 0, 0),
            initial_marking: Marking::new(0),
            final_markings: Vec::new(),
            place_names: HashMap::new(),
            transition_names: HashMap::new(),
        }
    }

    pub fn create_place(
        &mut self,
        name: impl Into<String>,
        bound: Weight,
    ) -> Result<PlaceId, NetError> {
        let name = name.into();
        if self.place_names.contains_key(&name) {
            return Err(NetError::DuplicatePlace(name));
        }
        let id = self.places.push(Place::new(name.clone(), bound));
        self.pre.push_place_with_default(0);
        self.post.push_place_with_default(0);
        self.initial_marking.0.push(0);
        for marking in &mut self.final_markings {
            marking.0.push(0);
        }
        self.place_names.insert(name, id);
        Ok(id)
    }

    pub fn create_transition(
        &mut self,
        name: impl Into<String>,
        interval: TimeInterval,
    ) -> Result<TransitionId, NetError> {
        let name = name.into();
        if self.transition_names.contains_key(&name) {
            return Err(NetError::DuplicateTransition(name));
        }
        let id = self.transitions.push(Transition::new(name.clone(), interval));
        self.pre.push_transition_with_default(0);
        self.post.push_transition_with_default(0);
        self.transition_names.insert(name, id);
        Ok(id)
    }

    /// Arc place -> transition (consumption). Parallel arcs accumulate.
    pub fn connect_place_to_transition(
        &mut self,
        place: PlaceId,
        transition: TransitionId,
        multiplicity: Weight,
    ) -> Result<(), NetError> {
        if multiplicity < 1 {
            return Err(NetError::InvalidMultiplicity);
        }
        *self.pre.get_mut(place, transition) += multiplicity;
        Ok(())
    }

    /// Arc transition -> place (production).
    pub fn connect_transition_to_place(
        &mut self,
        transition: TransitionId,
        place: PlaceId,
        multiplicity: Weight,
    ) -> Result<(), NetError> {
        if multiplicity < 1 {
            return Err(NetError::InvalidMultiplicity);
        }
        *self.post.get_mut(place, transition) += multiplicity;
        Ok(())
    }

    pub fn set_input_place(&mut self, place: PlaceId) -> Result<(), NetError> {
        if self.places[place].output {
            return Err(NetError::InterfaceConflict(self.places[place].name.clone()));
        }
        self.places[place].input = true;
        Ok(())
    }

    pub fn set_output_place(&mut self, place: PlaceId) -> Result<(), NetError> {
        if self.places[place].input {
            return Err(NetError::InterfaceConflict(self.places[place].name.clone()));
        }
        self.places[place].output = true;
        Ok(())
    }

    pub fn set_initial_marking(&mut self, marking: Marking) -> Result<(), NetError> {
        if marking.len() != self.places.len() {
            return Err(NetError::MarkingSize {
                expected: self.places.len(),
                found: marking.len(),
            });
        }
        self.initial_marking = marking;
        Ok(())
    }

    pub fn add_final_marking(&mut self, marking: Marking) -> Result<(), NetError> {
        if marking.len() != self.places.len() {
            return Err(NetError::MarkingSize {
                expected: self.places.len(),
                found: marking.len(),
            });
        }
        if !self.final_markings.contains(&marking) {
            self.final_markings.push(marking);
            self.final_markings.sort();
        }
        Ok(())
    }

    pub fn find_place(&self, name: &str) -> Option<PlaceId> {
        self.place_names.get(name).copied()
    }

    pub fn find_transition(&self, name: &str) -> Option<TransitionId> {
        self.transition_names.get(name).copied()
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn final_markings(&self) -> &[Marking] {
        &self.final_markings
    }

    pub fn is_final_marking(&self, marking: &Marking) -> bool {
        self.final_markings.binary_search(marking).is_ok()
    }

    /// Bound check; a place with bound 0 is unbounded.
    pub fn is_bounded(&self, marking: &Marking) -> bool {
        self.places
            .iter_enumerated()
            .all(|(id, place)| place.bound == 0 || marking.tokens(id) <= place.bound)
    }

    /// Places consumed by `transition`, with multiplicities.
    pub fn transition_preset(
        &self,
        transition: TransitionId,
    ) -> impl Iterator<Item = (PlaceId, Weight)> {
        self.places.indices().filter_map(move |place| {
            let weight = *self.pre.get(place, transition);
            (weight > 0).then_some((place, weight))
        })
    }

    /// Places produced into by `transition`, with multiplicities.
    pub fn transition_postset(
        &self,
        transition: TransitionId,
    ) -> impl Iterator<Item = (PlaceId, Weight)> {
        self.places.indices().filter_map(move |place| {
            let weight = *self.post.get(place, transition);
            (weight > 0).then_some((place, weight))
        })
    }

    /// Transitions consuming from `place`.
    pub fn place_postset(&self, place: PlaceId) -> impl Iterator<Item = TransitionId> {
        self.transitions
            .indices()
            .filter(move |&t| *self.pre.get(place, t) > 0)
    }

    /// Transitions producing into `place`.
    pub fn place_preset(&self, place: PlaceId) -> impl Iterator<Item = TransitionId> {
        self.transitions
            .indices()
            .filter(move |&t| *self.post.get(place, t) > 0)
    }

    pub fn is_input_send(&self, transition: TransitionId) -> bool {
        self.transition_postset(transition)
            .any(|(p, _)| self.places[p].input)
    }

    pub fn is_input_read(&self, transition: TransitionId) -> bool {
        self.transition_preset(transition)
            .any(|(p, _)| self.places[p].input)
    }

    pub fn is_output_send(&self, transition: TransitionId) -> bool {
        self.transition_postset(transition)
            .any(|(p, _)| self.places[p].output)
    }

    pub fn is_output_read(&self, transition: TransitionId) -> bool {
        self.transition_preset(transition)
            .any(|(p, _)| self.places[p].output)
    }

    /// A net without interface places needs no environment.
    pub fn is_closed(&self) -> bool {
        self.places.iter().all(|place| !place.is_interface())
    }
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("initial_marking", &self.initial_marking)
            .field("final_markings", &self.final_markings)
            .finish()
    }
}

impl Default for Net {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::TimeBound;

    #[test]
    fn create_and_connect_updates_incidence() {
        let mut net = Net::empty();
        let p = net.create_place("p", 1).unwrap();
        let t = net
            .create_transition("t", TimeInterval::default())
            .unwrap();

        net.connect_place_to_transition(p, t, 1).unwrap();
        net.connect_transition_to_place(t, p, 1).unwrap();

        assert_eq!(*net.pre.get(p, t), 1);
        assert_eq!(*net.post.get(p, t), 1);
        assert_eq!(net.transition_preset(t).collect::<Vec<_>>(), vec![(p, 1)]);
        assert_eq!(net.place_postset(p).collect::<Vec<_>>(), vec![t]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut net = Net::empty();
        net.create_place("p", 0).unwrap();
        assert!(matches!(
            net.create_place("p", 1),
            Err(NetError::DuplicatePlace(_))
        ));

        net.create_transition("t", TimeInterval::default()).unwrap();
        assert!(matches!(
            net.create_transition("t", TimeInterval::default()),
            Err(NetError::DuplicateTransition(_))
        ));
        // 失败的构造不得留下半插入的节点
        assert_eq!(net.places_len(), 1);
        assert_eq!(net.transitions_len(), 1);
    }

    #[test]
    fn interface_flags_are_exclusive() {
        let mut net = Net::empty();
        let p = net.create_place("io", 1).unwrap();
        net.set_input_place(p).unwrap();
        assert!(matches!(
            net.set_output_place(p),
            Err(NetError::InterfaceConflict(_))
        ));
    }

    #[test]
    fn zero_multiplicity_is_rejected() {
        let mut net = Net::empty();
        let p = net.create_place("p", 0).unwrap();
        let t = net
            .create_transition("t", TimeInterval::default())
            .unwrap();
        assert!(matches!(
            net.connect_place_to_transition(p, t, 0),
            Err(NetError::InvalidMultiplicity)
        ));
    }

    #[test]
    fn bound_zero_means_unbounded() {
        let mut net = Net::empty();
        let free = net.create_place("free", 0).unwrap();
        let safe = net.create_place("safe", 1).unwrap();

        let mut marking = Marking::new(2);
        *marking.tokens_mut(free) = 100;
        *marking.tokens_mut(safe) = 1;
        assert!(net.is_bounded(&marking));

        *marking.tokens_mut(safe) = 2;
        assert!(!net.is_bounded(&marking));
    }

    #[test]
    fn final_markings_form_a_set() {
        let mut net = Net::empty();
        net.create_place("p", 1).unwrap();
        let m = Marking::from_vec(vec![1]);
        net.add_final_marking(m.clone()).unwrap();
        net.add_final_marking(m.clone()).unwrap();
        assert_eq!(net.final_markings().len(), 1);
        assert!(net.is_final_marking(&m));
        assert!(!net.is_final_marking(&Marking::from_vec(vec![0])));
    }

    #[test]
    fn marking_size_is_checked() {
        let mut net = Net::empty();
        net.create_place("p", 1).unwrap();
        assert!(matches!(
            net.set_initial_marking(Marking::new(2)),
            Err(NetError::MarkingSize { .. })
        ));
        assert!(matches!(
            TimeInterval::new(2, TimeBound::Finite(1)),
            Err(NetError::InvalidInterval { eft: 2, lft: 1 })
        ));
    }
}
