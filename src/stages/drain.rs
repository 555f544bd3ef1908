//! Stages that must see the whole upstream before producing anything.
//!
//! These break the one-element-per-stage memory bound: a [`Drain`] buffers every
//! upstream element until the pipe reports exhaustion, reorders the buffer once,
//! and then serves it lazily.

use std::{cmp::Ordering, collections::HashSet, hash::Hash, mem, vec};

use crate::{Error, stage::Stage};

/// The one-shot transformation a [`Drain`] applies to its buffer.
pub trait Reorder<T> {
    fn reorder(&mut self, items: Vec<T>) -> Vec<T>;
}

/// Stable sort with a comparator.
pub struct SortBy<C>(C);

impl<T, C> Reorder<T> for SortBy<C>
where
    C: FnMut(&T, &T) -> Ordering,
{
    fn reorder(&mut self, mut items: Vec<T>) -> Vec<T> {
        items.sort_by(|a, b| (self.0)(a, b));
        items
    }
}

pub struct Reverse;

impl<T> Reorder<T> for Reverse {
    fn reorder(&mut self, mut items: Vec<T>) -> Vec<T> {
        items.reverse();
        items
    }
}

/// Keeps the first occurrence of every element.
pub struct Dedup;

impl<T> Reorder<T> for Dedup
where
    T: Eq + Hash,
{
    fn reorder(&mut self, items: Vec<T>) -> Vec<T> {
        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(items.len());
            items.iter().map(|item| seen.insert(item)).collect()
        };
        items
            .into_iter()
            .zip(keep)
            .filter_map(|(item, first)| first.then_some(item))
            .collect()
    }
}

/// Buffers upstream, reorders it at end of input, then yields it.
pub struct Drain<T, R> {
    buffer: Vec<T>,
    out: Option<vec::IntoIter<T>>,
    reorder: R,
}

pub type Sorted<T, C> = Drain<T, SortBy<C>>;
pub type Reversed<T> = Drain<T, Reverse>;
pub type Distinct<T> = Drain<T, Dedup>;

impl<T, R> Drain<T, R> {
    pub fn with(reorder: R) -> Self {
        Drain {
            buffer: Vec::new(),
            out: None,
            reorder,
        }
    }

    /// Number of elements currently held.
    pub fn buffered(&self) -> usize {
        self.buffer.len() + self.out.as_ref().map_or(0, |out| out.len())
    }
}

impl<T, C> Drain<T, SortBy<C>> {
    pub fn by(compare: C) -> Self {
        Drain::with(SortBy(compare))
    }
}

impl<T> Drain<T, Reverse> {
    pub fn new() -> Self {
        Drain::with(Reverse)
    }
}

impl<T> Drain<T, Dedup> {
    pub fn new() -> Self {
        Drain::with(Dedup)
    }
}

impl<T, R> Stage<T> for Drain<T, R>
where
    R: Reorder<T>,
{
    type Output = T;

    fn feed(&mut self, input: T) -> Result<(), Error> {
        self.buffer.push(input);
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.out.is_none()
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        Ok(self.out.as_ref().is_some_and(|out| out.len() > 0))
    }

    fn take_output(&mut self) -> Option<T> {
        self.out.as_mut()?.next()
    }

    fn is_terminal(&self) -> bool {
        self.out.as_ref().is_some_and(|out| out.len() == 0)
    }

    fn end_input(&mut self) -> Result<(), Error> {
        let items = mem::take(&mut self.buffer);
        self.out = Some(self.reorder.reorder(items).into_iter());
        Ok(())
    }
}
