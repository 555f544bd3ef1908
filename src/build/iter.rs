use std::{iter::Fuse, marker::PhantomData};

use crate::{Done, Error, source::Source, step::Step};

/// A source over a standard iterator.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    iter: Fuse<I>,
}

/// Adapt any `IntoIterator` into a single-pass source.
///
/// ```rust
/// use enumerant::prelude::*;
///
/// let mut cursor = from_iter(vec!["a", "b"]).enumerator();
/// assert_eq!(cursor.next().unwrap(), "a");
/// ```
pub fn from_iter<I>(iter: I) -> IterSource<I::IntoIter>
where
    I: IntoIterator,
{
    IterSource {
        iter: iter.into_iter().fuse(),
    }
}

impl<I> Source for IterSource<I>
where
    I: Iterator,
{
    type Item = I::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        match self.iter.next() {
            Some(value) => Step::Yielded(value),
            None => Step::Complete(Ok(())),
        }
    }
}

/// A source over an iterator of `Result`s that fails on the first `Err`.
#[derive(Debug)]
pub struct TryIterSource<I> {
    iter: I,
    outcome: Option<Done>,
}

pub fn try_from_iter<I, T, E>(iter: I) -> TryIterSource<I::IntoIter>
where
    I: IntoIterator<Item = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    TryIterSource {
        iter: iter.into_iter(),
        outcome: None,
    }
}

impl<I, T, E> Source for TryIterSource<I>
where
    I: Iterator<Item = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = T;

    fn pull(&mut self) -> Step<T, Done> {
        if let Some(done) = &self.outcome {
            return Step::Complete(done.clone());
        }
        let done = match self.iter.next() {
            Some(Ok(value)) => return Step::Yielded(value),
            Some(Err(err)) => Err(Error::from_source(err)),
            None => Ok(()),
        };
        self.outcome = Some(done.clone());
        Step::Complete(done)
    }
}

/// A source driven by a closure that returns `None` at the end.
pub struct FromFn<F> {
    f: Option<F>,
}

pub fn from_fn<T, F>(f: F) -> FromFn<F>
where
    F: FnMut() -> Option<T>,
{
    FromFn { f: Some(f) }
}

impl<T, F> Source for FromFn<F>
where
    F: FnMut() -> Option<T>,
{
    type Item = T;

    fn pull(&mut self) -> Step<T, Done> {
        let Some(f) = self.f.as_mut() else {
            return Step::Complete(Ok(()));
        };
        match f() {
            Some(value) => Step::Yielded(value),
            None => {
                self.f = None;
                Step::Complete(Ok(()))
            }
        }
    }
}

/// A source with no elements.
#[derive(Debug, Clone, Copy)]
pub struct Empty<T>(PhantomData<fn() -> T>);

pub fn empty<T>() -> Empty<T> {
    Empty(PhantomData)
}

impl<T> Source for Empty<T> {
    type Item = T;

    fn pull(&mut self) -> Step<T, Done> {
        Step::Complete(Ok(()))
    }
}

/// A source with exactly one element.
#[derive(Debug, Clone)]
pub struct OnceValue<T>(Option<T>);

pub fn once_value<T>(value: T) -> OnceValue<T> {
    OnceValue(Some(value))
}

impl<T> Source for OnceValue<T> {
    type Item = T;

    fn pull(&mut self) -> Step<T, Done> {
        match self.0.take() {
            Some(value) => Step::Yielded(value),
            None => Step::Complete(Ok(())),
        }
    }
}

/// A source yielding clones of one value.
#[derive(Debug, Clone)]
pub struct Repeat<T> {
    value: Option<T>,
    remaining: usize,
}

/// `value` repeated `count` times.
///
/// ```rust
/// use enumerant::prelude::*;
///
/// assert_eq!(repeat("ab", 2).enumerator().to_vec().unwrap(), vec!["ab", "ab"]);
/// ```
pub fn repeat<T>(value: T, count: usize) -> Repeat<T>
where
    T: Clone,
{
    Repeat {
        value: Some(value),
        remaining: count,
    }
}

impl<T> Source for Repeat<T>
where
    T: Clone,
{
    type Item = T;

    fn pull(&mut self) -> Step<T, Done> {
        match self.remaining {
            0 => {
                self.value = None;
                Step::Complete(Ok(()))
            }
            1 => {
                self.remaining = 0;
                self.value.take().map_or(Step::Complete(Ok(())), Step::Yielded)
            }
            _ => {
                self.remaining -= 1;
                self.value.clone().map_or(Step::Complete(Ok(())), Step::Yielded)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceExt;

    #[derive(thiserror::Error, Debug)]
    #[error("read failed")]
    struct ReadFailed;

    #[test]
    fn test_from_fn_stops_calling_after_none() {
        let mut calls = 0;
        let mut src = from_fn(|| {
            calls += 1;
            (calls < 3).then_some(calls)
        });
        assert_eq!(src.pull().unwrap_yielded(), 1);
        assert_eq!(src.pull().unwrap_yielded(), 2);
        assert!(src.pull().is_complete());
        assert!(src.pull().is_complete());
        drop(src);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_try_from_iter_repeats_failure() {
        let mut src = try_from_iter(vec![Ok(1), Err(ReadFailed), Ok(2)]);
        assert_eq!(src.pull().unwrap_yielded(), 1);
        assert!(src.pull().is_failed());
        assert!(src.pull().is_failed());
    }

    #[test]
    fn test_once_value_yields_once() {
        assert_eq!(once_value('z').enumerator().to_vec().unwrap(), vec!['z']);
    }

    #[test]
    fn test_repeat_counts_down_then_stays_complete() {
        let mut src = repeat(String::from("x"), 2);
        assert_eq!(src.pull().unwrap_yielded(), "x");
        assert_eq!(src.pull().unwrap_yielded(), "x");
        assert!(src.pull().is_complete());
        assert!(src.pull().is_complete());
        assert!(repeat(1, 0).pull().is_complete());
    }

    #[test]
    fn test_empty_is_exhausted() {
        assert!(!empty::<u8>().enumerator().has_next().unwrap());
    }
}
