//! Cursors: the `has_next`/`next` view of a source.
//!
//! An [`Enumerator`] wraps any [`Source`] and remembers one pulled-ahead element,
//! so `has_next` can be asked any number of times without pulling twice. Once it
//! has seen the end (or a failure) it stays there.
//!
//! # Examples
//!
//! ```rust
//! use enumerant::prelude::*;
//!
//! let mut cursor = from_iter([1, 2]).enumerator();
//! assert!(cursor.has_next().unwrap());
//! assert_eq!(cursor.next().unwrap(), 1);
//! assert_eq!(cursor.next().unwrap(), 2);
//! assert!(!cursor.has_next().unwrap());
//! assert!(cursor.next().unwrap_err().is_exhausted());
//! ```

use std::{fmt, mem};

use tracing::debug;

use crate::{Done, Error, source::Source, step::Step};

enum CursorState<T> {
    Fresh,
    Peeked(T),
    Exhausted,
    Failed(Error),
}

/// Observable state of an [`Enumerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStatus {
    /// Nothing pulled ahead.
    Fresh,
    /// One element is pulled ahead and waiting.
    Peeked,
    Exhausted,
    Failed,
}

/// A single-pass cursor over a source.
pub struct Enumerator<S>
where
    S: Source,
{
    source: S,
    state: CursorState<S::Item>,
}

impl<S> Enumerator<S>
where
    S: Source,
{
    pub fn new(source: S) -> Self {
        Enumerator {
            source,
            state: CursorState::Fresh,
        }
    }

    pub fn status(&self) -> CursorStatus {
        match self.state {
            CursorState::Fresh => CursorStatus::Fresh,
            CursorState::Peeked(_) => CursorStatus::Peeked,
            CursorState::Exhausted => CursorStatus::Exhausted,
            CursorState::Failed(_) => CursorStatus::Failed,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    fn fill(&mut self) {
        if let CursorState::Fresh = self.state {
            self.state = match self.source.pull() {
                Step::Yielded(value) => CursorState::Peeked(value),
                Step::Complete(Ok(())) => CursorState::Exhausted,
                Step::Complete(Err(err)) => {
                    debug!(error = %err, "cursor failed");
                    CursorState::Failed(err)
                }
            };
        }
    }

    /// Whether another element is available. Pulls at most once per element.
    pub fn has_next(&mut self) -> Result<bool, Error> {
        self.fill();
        match &self.state {
            CursorState::Peeked(_) => Ok(true),
            CursorState::Exhausted | CursorState::Fresh => Ok(false),
            CursorState::Failed(err) => Err(err.clone()),
        }
    }

    /// The next element without consuming it.
    pub fn peek(&mut self) -> Result<Option<&S::Item>, Error> {
        self.fill();
        match &self.state {
            CursorState::Peeked(value) => Ok(Some(value)),
            CursorState::Exhausted | CursorState::Fresh => Ok(None),
            CursorState::Failed(err) => Err(err.clone()),
        }
    }

    /// Consume the next element, `None` at the end.
    pub fn try_next(&mut self) -> Result<Option<S::Item>, Error> {
        self.fill();
        match mem::replace(&mut self.state, CursorState::Fresh) {
            CursorState::Peeked(value) => Ok(Some(value)),
            CursorState::Failed(err) => {
                self.state = CursorState::Failed(err.clone());
                Err(err)
            }
            terminal => {
                self.state = terminal;
                Ok(None)
            }
        }
    }

    /// Consume the next element.
    ///
    /// Fails with [`Error::Exhausted`] at the end of the sequence, and with the
    /// original error, every time, once the cursor has failed.
    pub fn next(&mut self) -> Result<S::Item, Error> {
        self.try_next()?.ok_or(Error::Exhausted)
    }

    /// Consume the rest of the sequence into a vector.
    pub fn to_vec(&mut self) -> Result<Vec<S::Item>, Error> {
        let mut out = Vec::new();
        while let Some(value) = self.try_next()? {
            out.push(value);
        }
        Ok(out)
    }

    /// Consume the rest of the sequence, counting elements.
    pub fn count(&mut self) -> Result<usize, Error> {
        let mut n = 0;
        while self.try_next()?.is_some() {
            n += 1;
        }
        Ok(n)
    }

    pub fn fold<B, F>(&mut self, init: B, mut f: F) -> Result<B, Error>
    where
        F: FnMut(B, S::Item) -> B,
    {
        let mut acc = init;
        while let Some(value) = self.try_next()? {
            acc = f(acc, value);
        }
        Ok(acc)
    }

    /// Whether the rest of this sequence equals `other`, element by element.
    ///
    /// Stops consuming at the first difference.
    pub fn elements_eq<I>(&mut self, other: I) -> Result<bool, Error>
    where
        I: IntoIterator,
        S::Item: PartialEq<I::Item>,
    {
        let mut other = other.into_iter();
        loop {
            match (self.try_next()?, other.next()) {
                (None, None) => return Ok(true),
                (Some(a), Some(b)) if a == b => continue,
                _ => return Ok(false),
            }
        }
    }

    /// Borrowing iterator over the remaining elements.
    pub fn iter(&mut self) -> Iter<'_, S> {
        Iter {
            cursor: self,
            done: false,
        }
    }
}

impl<S> fmt::Debug for Enumerator<S>
where
    S: Source,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enumerator")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl<S> Source for Enumerator<S>
where
    S: Source,
{
    type Item = S::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        Step::from_result(self.try_next())
    }
}

/// Iterator over a borrowed cursor. Yields a failure once, then ends.
pub struct Iter<'a, S>
where
    S: Source,
{
    cursor: &'a mut Enumerator<S>,
    done: bool,
}

impl<S> Iterator for Iter<'_, S>
where
    S: Source,
{
    type Item = Result<S::Item, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.try_next() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Owning iterator over a cursor. Yields a failure once, then ends.
pub struct IntoIter<S>
where
    S: Source,
{
    cursor: Enumerator<S>,
    done: bool,
}

impl<S> IntoIter<S>
where
    S: Source,
{
    /// Give the cursor back, e.g. to inspect its status.
    pub fn into_inner(self) -> Enumerator<S> {
        self.cursor
    }
}

impl<S> Iterator for IntoIter<S>
where
    S: Source,
{
    type Item = Result<S::Item, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.try_next() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<S> IntoIterator for Enumerator<S>
where
    S: Source,
{
    type Item = Result<S::Item, Error>;
    type IntoIter = IntoIter<S>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            cursor: self,
            done: false,
        }
    }
}

impl<'a, S> IntoIterator for &'a mut Enumerator<S>
where
    S: Source,
{
    type Item = Result<S::Item, Error>;
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
