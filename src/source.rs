//! The single-pass pull contract.
//!
//! A [`Source`] produces its elements one [`pull`](Source::pull) at a time and
//! cannot be restarted. Everything else in the crate is either a source (cursors,
//! pipes, zips, sharing cursors) or turns sources into something else.
//!
//! [`SourceExt`] carries the combinator methods. Each stage combinator wraps the
//! receiver in a [`Pipe`], so a chain of them is driven by one outer pull.
//!
//! ```rust
//! use enumerant::prelude::*;
//!
//! let mut cursor = from_iter(1..=10)
//!     .map(|x| x * 3)
//!     .filter(|x| x % 2 == 0)
//!     .take(2)
//!     .enumerator();
//!
//! assert_eq!(cursor.to_vec().unwrap(), vec![6, 12]);
//! ```

use std::{cmp::Ordering, hash::Hash};

use either::Either;

use crate::{
    Done, Error,
    build::{IterSource, from_iter},
    compose::{Any, Both, Chain, Left, Right, Zip, chain, zip},
    cursor::Enumerator,
    enumerable::{Cached, Once},
    share::{ShareConfig, Shareable},
    stage::Pipe,
    stages::{
        Distinct, Filter, FlatMap, IndexedMap, Inspect, Map, RepeatEach, Reversed, Skip, SkipWhile,
        Sorted, Take, TakeWhile,
    },
    step::Step,
};

/// A single-pass, non-restartable producer of elements.
///
/// After `pull` returns [`Step::Complete`] every later pull must return an
/// equivalent `Complete`. Sources built by this crate uphold that; wrap a
/// hand-written source in an [`Enumerator`] if it does not.
pub trait Source {
    type Item;

    /// Produce the next element, or report exhaustion or failure.
    fn pull(&mut self) -> Step<Self::Item, Done>;
}

impl<S> Source for &'_ mut S
where
    S: Source + ?Sized,
{
    type Item = S::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        (**self).pull()
    }
}

impl<S> Source for Box<S>
where
    S: Source + ?Sized,
{
    type Item = S::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        (**self).pull()
    }
}

impl<L, R> Source for Either<L, R>
where
    L: Source,
    R: Source<Item = L::Item>,
{
    type Item = L::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        match self {
            Either::Left(l) => l.pull(),
            Either::Right(r) => r.pull(),
        }
    }
}

/// Combinators available on every [`Source`].
pub trait SourceExt: Source {
    /// Wrap in a cursor with `has_next`/`next` semantics.
    fn enumerator(self) -> Enumerator<Self>
    where
        Self: Sized,
    {
        Enumerator::new(self)
    }

    fn boxed(self) -> Box<dyn Source<Item = Self::Item>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }

    /// Borrow the source so that it can be partially consumed by a pipeline.
    fn by_ref(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self
    }

    fn map<O, F>(self, f: F) -> Pipe<Self, Map<F, O>>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> O,
    {
        Pipe::new(self, Map::new(f))
    }

    /// Map with the zero-based position of each element.
    fn indexed_map<O, F>(self, f: F) -> Pipe<Self, IndexedMap<F, O>>
    where
        Self: Sized,
        F: FnMut(Self::Item, usize) -> O,
    {
        Pipe::new(self, IndexedMap::new(f))
    }

    /// Observe every element as it passes through.
    fn inspect<F>(self, f: F) -> Pipe<Self, Inspect<F, Self::Item>>
    where
        Self: Sized,
        F: FnMut(&Self::Item),
    {
        Pipe::new(self, Inspect::new(f))
    }

    /// Keep the elements matching `predicate`.
    ///
    /// Filtering a pipe whose outermost stage is already a filter does not add a
    /// stage: the predicate is appended to that filter instead (see
    /// [`Pipe::filter`](crate::stage::Pipe::filter)).
    fn filter<F>(self, predicate: F) -> Pipe<Self, Filter<Self::Item, F>>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> bool,
    {
        Pipe::new(self, Filter::new(predicate))
    }

    /// Replace every element with the elements of the source `f` returns for it.
    fn flat_map<J, F>(self, f: F) -> Pipe<Self, FlatMap<F, J>>
    where
        Self: Sized,
        J: Source,
        F: FnMut(Self::Item) -> J,
    {
        Pipe::new(self, FlatMap::new(f))
    }

    /// Yield every element `count` times in a row.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let out = from_iter([1, 2]).repeat_each(2).enumerator().to_vec().unwrap();
    /// assert_eq!(out, vec![1, 1, 2, 2]);
    /// ```
    fn repeat_each(self, count: usize) -> Pipe<Self, RepeatEach<Self::Item>>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        Pipe::new(self, RepeatEach::new(count))
    }

    /// Yield at most `n` elements. Upstream is never pulled past the `n`th.
    fn take(self, n: usize) -> Pipe<Self, Take<Self::Item>>
    where
        Self: Sized,
    {
        Pipe::new(self, Take::new(n))
    }

    /// Yield elements while `predicate` holds. The first element failing it is
    /// dropped and nothing after it is pulled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let small = from_iter([1, 2, 7, 3]).take_while(|x| *x < 5).enumerator().to_vec();
    /// assert_eq!(small.unwrap(), vec![1, 2]);
    /// ```
    fn take_while<F>(self, predicate: F) -> Pipe<Self, TakeWhile<F, Self::Item>>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> bool,
    {
        Pipe::new(self, TakeWhile::new(predicate))
    }

    /// Drop the first `n` elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// assert_eq!(from_iter(0..5).skip(3).enumerator().to_vec().unwrap(), vec![3, 4]);
    /// ```
    fn skip(self, n: usize) -> Pipe<Self, Skip<Self::Item>>
    where
        Self: Sized,
    {
        Pipe::new(self, Skip::new(n))
    }

    /// Drop elements while `predicate` holds, then pass everything through.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let rest = from_iter([1, 2, 7, 3]).skip_while(|x| *x < 5).enumerator().to_vec();
    /// assert_eq!(rest.unwrap(), vec![7, 3]);
    /// ```
    fn skip_while<F>(self, predicate: F) -> Pipe<Self, SkipWhile<F, Self::Item>>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> bool,
    {
        Pipe::new(self, SkipWhile::new(predicate))
    }

    /// Sort in ascending order. Drains upstream on the first pull.
    fn sorted(self) -> Pipe<Self, Sorted<Self::Item, fn(&Self::Item, &Self::Item) -> Ordering>>
    where
        Self: Sized,
        Self::Item: Ord,
    {
        Pipe::new(
            self,
            Sorted::by(<Self::Item as Ord>::cmp as fn(&Self::Item, &Self::Item) -> Ordering),
        )
    }

    /// Stable sort with a comparator. Drains upstream on the first pull.
    fn sorted_by<C>(self, compare: C) -> Pipe<Self, Sorted<Self::Item, C>>
    where
        Self: Sized,
        C: FnMut(&Self::Item, &Self::Item) -> Ordering,
    {
        Pipe::new(self, Sorted::by(compare))
    }

    /// Stable sort by an extracted key. Drains upstream on the first pull.
    fn sorted_by_key<K, F>(
        self,
        mut key: F,
    ) -> Pipe<Self, Sorted<Self::Item, impl FnMut(&Self::Item, &Self::Item) -> Ordering>>
    where
        Self: Sized,
        K: Ord,
        F: FnMut(&Self::Item) -> K,
    {
        self.sorted_by(move |a, b| {
            let ka = key(a);
            let kb = key(b);
            ka.cmp(&kb)
        })
    }

    /// Yield the elements in reverse order. Drains upstream on the first pull.
    fn reversed(self) -> Pipe<Self, Reversed<Self::Item>>
    where
        Self: Sized,
    {
        Pipe::new(self, Reversed::new())
    }

    /// Drop repeated elements, keeping first occurrences in order.
    /// Drains upstream on the first pull.
    fn distinct(self) -> Pipe<Self, Distinct<Self::Item>>
    where
        Self: Sized,
        Self::Item: Eq + Hash,
    {
        Pipe::new(self, Distinct::new())
    }

    /// Elements of `self` followed by those of `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let both = from_iter([1, 2]).concat(from_iter([3])).enumerator().to_vec();
    /// assert_eq!(both.unwrap(), vec![1, 2, 3]);
    /// ```
    fn concat<R>(self, other: R) -> Chain<Self, R>
    where
        Self: Sized,
        R: Source<Item = Self::Item>,
    {
        chain(self, other)
    }

    /// Elements of `self` followed by those of `other`, each distinct value once.
    fn union<R>(self, other: R) -> Pipe<Chain<Self, R>, Distinct<Self::Item>>
    where
        Self: Sized,
        R: Source<Item = Self::Item>,
        Self::Item: Eq + Hash,
    {
        self.concat(other).distinct()
    }

    /// Elements of `self` followed by `elements`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let out = from_iter([1, 2]).append([3, 4]).enumerator().to_vec().unwrap();
    /// assert_eq!(out, vec![1, 2, 3, 4]);
    /// ```
    fn append<I>(self, elements: I) -> Chain<Self, IterSource<I::IntoIter>>
    where
        Self: Sized,
        I: IntoIterator<Item = Self::Item>,
    {
        chain(self, from_iter(elements))
    }

    /// `elements` followed by the elements of `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let out = from_iter([3, 4]).prepend([1, 2]).enumerator().to_vec().unwrap();
    /// assert_eq!(out, vec![1, 2, 3, 4]);
    /// ```
    fn prepend<I>(self, elements: I) -> Chain<IterSource<I::IntoIter>, Self>
    where
        Self: Sized,
        I: IntoIterator<Item = Self::Item>,
    {
        chain(from_iter(elements), self)
    }

    /// Pair elements until both sides are exhausted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let pairs = from_iter([1, 2]).zip_any(from_iter(['a'])).enumerator().to_vec();
    /// assert_eq!(pairs.unwrap(), vec![(Some(1), Some('a')), (Some(2), None)]);
    /// ```
    fn zip_any<R>(self, other: R) -> Zip<Self, R, Any>
    where
        Self: Sized,
        R: Source,
    {
        zip(self, other)
    }

    /// Pair elements until either side is exhausted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let pairs = from_iter([1, 2]).zip_both(from_iter(['a'])).enumerator().to_vec();
    /// assert_eq!(pairs.unwrap(), vec![(1, 'a')]);
    /// ```
    fn zip_both<R>(self, other: R) -> Zip<Self, R, Both>
    where
        Self: Sized,
        R: Source,
    {
        zip(self, other)
    }

    /// Pair elements until `self` is exhausted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let pairs = from_iter([1, 2]).zip_left(from_iter(['a'])).enumerator().to_vec();
    /// assert_eq!(pairs.unwrap(), vec![(1, Some('a')), (2, None)]);
    /// ```
    fn zip_left<R>(self, other: R) -> Zip<Self, R, Left>
    where
        Self: Sized,
        R: Source,
    {
        zip(self, other)
    }

    /// Pair elements until `other` is exhausted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let pairs = from_iter([1]).zip_right(from_iter(['a', 'b'])).enumerator().to_vec();
    /// assert_eq!(pairs.unwrap(), vec![(Some(1), 'a'), (None, 'b')]);
    /// ```
    fn zip_right<R>(self, other: R) -> Zip<Self, R, Right>
    where
        Self: Sized,
        R: Source,
    {
        zip(self, other)
    }

    /// Hand the source to a sharing engine that can fan it out to many cursors.
    fn shareable(self) -> Shareable<Self>
    where
        Self: Sized,
    {
        Shareable::new(self)
    }

    /// Like [`shareable`](SourceExt::shareable), with a [`ShareConfig`]. Fails
    /// with [`Error::InvalidArgument`] when the configuration is invalid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let config = ShareConfig::default().with_max_span(16);
    /// let shareable = from_iter(0..100).shareable_with(config).unwrap();
    /// let mut cursors = shareable.fan_out(2).unwrap();
    /// assert_eq!(cursors[0].next().unwrap(), 0);
    /// assert!(from_iter(0..1).shareable_with(config.with_max_span(0)).is_err());
    /// ```
    fn shareable_with(self, config: ShareConfig) -> Result<Shareable<Self>, Error>
    where
        Self: Sized,
    {
        Shareable::with_config(self, config)
    }

    /// Turn the source into a multi-pass enumerable that replays recorded elements.
    fn cached(self) -> Cached<Self>
    where
        Self: Sized,
    {
        Cached::new(self)
    }

    /// Like [`cached`](SourceExt::cached), but recording stops after `limit` elements.
    fn cached_with_limit(self, limit: usize) -> Cached<Self>
    where
        Self: Sized,
    {
        Cached::with_limit(self, limit)
    }

    /// Turn the source into an enumerable that hands out exactly one cursor.
    fn into_once(self) -> Once<Self>
    where
        Self: Sized,
    {
        Once::new(self)
    }
}

impl<S: Source + ?Sized> SourceExt for S {}
