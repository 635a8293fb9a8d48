//! 输入、输出弧关系的稀疏化邻接矩阵封装.
use std::fmt;

use smallvec::SmallVec;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};

type SmallRow<T> = SmallVec<[T; 4]>;

/// Place-by-transition weight matrix. One row per place, one column per
/// transition; a zero entry means the arc is absent.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Incidence<T> {
    rows: IndexVec<PlaceId, SmallRow<T>>,
    cols: usize,
}

impl<T> Incidence<T>
where
    T: Clone,
{
    pub fn new(places: usize, transitions: usize, default: T) -> Self {
        let mut rows = IndexVec::new();
        for _ in 0..places {
            rows.push(SmallRow::from_elem(default.clone(), transitions));
        }
        Self {
            rows,
            cols: transitions,
        }
    }

    pub fn push_place_with_default(&mut self, default: T) -> PlaceId {
        let mut row = SmallRow::new();
        row.resize(self.cols, default);
        self.rows.push(row)
    }

    pub fn push_transition_with_default(&mut self, default: T) -> TransitionId {
        let next = self.cols;
        for row in self.rows.iter_mut() {
            row.push(default.clone());
        }
        self.cols += 1;
        TransitionId::from_usize(next)
    }

    pub fn places(&self) -> usize {
        self.rows.len()
    }

    pub fn transitions(&self) -> usize {
        self.cols
    }

    pub fn set(&mut self, place: PlaceId, transition: TransitionId, value: T) {
        self.rows[place][transition.index()] = value;
    }

    pub fn get(&self, place: PlaceId, transition: TransitionId) -> &T {
        &self.rows[place][transition.index()]
    }

    pub fn get_mut(&mut self, place: PlaceId, transition: TransitionId) -> &mut T {
        &mut self.rows[place][transition.index()]
    }

    pub fn rows(&self) -> &IndexVec<PlaceId, SmallRow<T>> {
        &self.rows
    }
}

impl<T> fmt::Debug for Incidence<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Incidence")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}
