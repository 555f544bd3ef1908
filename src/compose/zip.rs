//! Lock-step combination of several sources.
//!
//! Every step pulls one element from each input that is still live. An input that
//! is exhausted contributes `None` from then on and is dropped, so it is never
//! pulled again. When to stop is decided by a [`ZipPolicy`].

use std::marker::PhantomData;

use crate::{Done, Error, source::Source, step::Step};

/// Decides what a zip step produces, and whether the zip is over.
///
/// `combine` is only called while at least one side produced an element;
/// returning `None` ends the zip.
pub trait ZipPolicy<A, B> {
    type Output;

    fn combine(left: Option<A>, right: Option<B>) -> Option<Self::Output>;
}

/// Continue until both sides are exhausted.
pub struct Any;

/// Stop as soon as either side is exhausted.
pub struct Both;

/// Stop when the left side is exhausted.
pub struct Left;

/// Stop when the right side is exhausted.
pub struct Right;

impl<A, B> ZipPolicy<A, B> for Any {
    type Output = (Option<A>, Option<B>);

    fn combine(left: Option<A>, right: Option<B>) -> Option<Self::Output> {
        Some((left, right))
    }
}

impl<A, B> ZipPolicy<A, B> for Both {
    type Output = (A, B);

    fn combine(left: Option<A>, right: Option<B>) -> Option<Self::Output> {
        left.zip(right)
    }
}

impl<A, B> ZipPolicy<A, B> for Left {
    type Output = (A, Option<B>);

    fn combine(left: Option<A>, right: Option<B>) -> Option<Self::Output> {
        left.map(|a| (a, right))
    }
}

impl<A, B> ZipPolicy<A, B> for Right {
    type Output = (Option<A>, B);

    fn combine(left: Option<A>, right: Option<B>) -> Option<Self::Output> {
        right.map(|b| (left, b))
    }
}

/// Pull from a side unless it is already exhausted; drop it once it is.
fn pull_side<S: Source>(side: &mut Option<S>) -> Result<Option<S::Item>, Error> {
    let Some(source) = side.as_mut() else {
        return Ok(None);
    };
    let value = source.pull().into_result()?;
    if value.is_none() {
        *side = None;
    }
    Ok(value)
}

/// Two sources zipped under policy `P`.
pub struct Zip<A, B, P> {
    left: Option<A>,
    right: Option<B>,
    outcome: Option<Done>,
    _policy: PhantomData<P>,
}

pub fn zip<A, B, P>(left: A, right: B) -> Zip<A, B, P>
where
    A: Source,
    B: Source,
    P: ZipPolicy<A::Item, B::Item>,
{
    Zip {
        left: Some(left),
        right: Some(right),
        outcome: None,
        _policy: PhantomData,
    }
}

impl<A, B, P> Zip<A, B, P>
where
    A: Source,
    B: Source,
    P: ZipPolicy<A::Item, B::Item>,
{
    fn step(&mut self) -> Result<Option<P::Output>, Error> {
        let left = pull_side(&mut self.left)?;
        let right = pull_side(&mut self.right)?;
        if left.is_none() && right.is_none() {
            return Ok(None);
        }
        Ok(P::combine(left, right))
    }
}

impl<A, B, P> Source for Zip<A, B, P>
where
    A: Source,
    B: Source,
    P: ZipPolicy<A::Item, B::Item>,
{
    type Item = P::Output;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        if let Some(done) = &self.outcome {
            return Step::Complete(done.clone());
        }
        match self.step() {
            Ok(Some(value)) => Step::Yielded(value),
            other => {
                let done = other.map(|_| ());
                self.left = None;
                self.right = None;
                self.outcome = Some(done.clone());
                Step::Complete(done)
            }
        }
    }
}

/// Any number of same-typed sources zipped until all of them are exhausted.
pub struct ZipAll<S> {
    sources: Vec<Option<S>>,
    outcome: Option<Done>,
}

/// Zip `sources` into rows of `Option`s, one slot per source.
///
/// Fails with [`Error::InvalidArgument`] when given no sources.
pub fn zip_all<S, I>(sources: I) -> Result<ZipAll<S>, Error>
where
    S: Source,
    I: IntoIterator<Item = S>,
{
    let sources: Vec<Option<S>> = sources.into_iter().map(Some).collect();
    if sources.is_empty() {
        return Err(Error::InvalidArgument("zip_all needs at least one source"));
    }
    Ok(ZipAll {
        sources,
        outcome: None,
    })
}

impl<S> ZipAll<S>
where
    S: Source,
{
    pub fn width(&self) -> usize {
        self.sources.len()
    }

    fn step(&mut self) -> Result<Option<Vec<Option<S::Item>>>, Error> {
        let row = self
            .sources
            .iter_mut()
            .map(pull_side)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(row.iter().any(Option::is_some).then_some(row))
    }
}

impl<S> Source for ZipAll<S>
where
    S: Source,
{
    type Item = Vec<Option<S::Item>>;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        if let Some(done) = &self.outcome {
            return Step::Complete(done.clone());
        }
        match self.step() {
            Ok(Some(row)) => Step::Yielded(row),
            other => {
                let done = other.map(|_| ());
                self.sources.clear();
                self.outcome = Some(done.clone());
                Step::Complete(done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{build::from_iter, source::SourceExt};

    fn short() -> impl Source<Item = i32> {
        from_iter([1, 2, 3])
    }

    fn long() -> impl Source<Item = i32> {
        from_iter([1, 2, 3, 4, 5])
    }

    #[test]
    fn test_zip_lengths_follow_policy() {
        assert_eq!(short().zip_any(long()).enumerator().count().unwrap(), 5);
        assert_eq!(short().zip_both(long()).enumerator().count().unwrap(), 3);
        assert_eq!(short().zip_left(long()).enumerator().count().unwrap(), 3);
        assert_eq!(short().zip_right(long()).enumerator().count().unwrap(), 5);
    }

    #[test]
    fn test_zip_any_pads_with_none() {
        let rows = from_iter([1, 2])
            .zip_any(from_iter(['a']))
            .enumerator()
            .to_vec()
            .unwrap();
        assert_eq!(rows, vec![(Some(1), Some('a')), (Some(2), None)]);
    }

    #[test]
    fn test_zip_right_keeps_right_values() {
        let rows = short().zip_right(long()).enumerator().to_vec().unwrap();
        assert_eq!(rows[2], (Some(3), 3));
        assert_eq!(rows[4], (None, 5));
    }

    #[test]
    fn test_exhausted_side_is_not_pulled_again() {
        let pulls = std::rc::Rc::new(std::cell::Cell::new(0));
        let p = pulls.clone();
        let left = from_iter([1]).inspect(move |_| p.set(p.get() + 1));
        let rows = left.zip_any(long()).enumerator().to_vec().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(pulls.get(), 1);
    }

    #[test]
    fn test_zip_all_runs_until_longest() {
        let rows = zip_all(vec![from_iter(vec![1]), from_iter(vec![1, 2, 3]), from_iter(vec![])])
            .unwrap()
            .enumerator()
            .to_vec()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![Some(1), Some(1), None]);
        assert_eq!(rows[2], vec![None, Some(3), None]);
    }

    #[test]
    fn test_zip_all_rejects_empty_input() {
        let sources: Vec<crate::build::Empty<i32>> = Vec::new();
        assert!(matches!(zip_all(sources), Err(Error::InvalidArgument(_))));
    }

    fn length<S: Source>(source: S) -> usize {
        source
            .enumerator()
            .count()
            .unwrap_or_else(|e| panic!("zip failed: {e}"))
    }

    proptest! {
        #[test]
        fn zip_lengths_follow_policy(a in 0usize..40, b in 0usize..40) {
            prop_assert_eq!(length(from_iter(0..a).zip_any(from_iter(0..b))), a.max(b));
            prop_assert_eq!(length(from_iter(0..a).zip_both(from_iter(0..b))), a.min(b));
            prop_assert_eq!(length(from_iter(0..a).zip_left(from_iter(0..b))), a);
            prop_assert_eq!(length(from_iter(0..a).zip_right(from_iter(0..b))), b);
        }
    }
}
