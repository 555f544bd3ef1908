//! Things that hand out cursors, some of them only once.
//!
//! [`Enumerable::once_only`] can be asked before any cursor is requested, so a
//! caller can tell up front whether enumerating twice is going to work.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::{
    Done, Error,
    cursor::Enumerator,
    share::{
        Mode, SharingCursor,
        state::{Pin, ReplayState, Shared},
    },
    source::Source,
    step::Step,
};

/// A producer of cursors.
pub trait Enumerable {
    type Source: Source;

    /// A fresh cursor over the sequence.
    fn enumerator(&self) -> Result<Enumerator<Self::Source>, Error>;

    /// `true` if at most one cursor will ever be handed out.
    fn once_only(&self) -> bool;

    /// `true` once a cursor has been handed out.
    fn enumerating(&self) -> bool;

    /// The whole sequence `count` times over, taking a fresh cursor per round.
    ///
    /// A once-only enumerable fails when the second round asks for its cursor.
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let rounds = from_iter([1, 2]).cached().repeat_all(2);
    /// assert_eq!(rounds.enumerator().to_vec().unwrap(), vec![1, 2, 1, 2]);
    /// ```
    fn repeat_all(self, count: usize) -> RepeatAll<Self>
    where
        Self: Sized,
    {
        RepeatAll {
            enumerable: self,
            remaining: count,
            current: None,
            done: None,
        }
    }
}

/// Source returned by [`Enumerable::repeat_all`].
pub struct RepeatAll<E>
where
    E: Enumerable,
{
    enumerable: E,
    remaining: usize,
    current: Option<Enumerator<E::Source>>,
    done: Option<Done>,
}

impl<E> Source for RepeatAll<E>
where
    E: Enumerable,
{
    type Item = <E::Source as Source>::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        loop {
            if let Some(done) = &self.done {
                return Step::Complete(done.clone());
            }
            if let Some(cursor) = self.current.as_mut() {
                match cursor.pull() {
                    Step::Yielded(value) => return Step::Yielded(value),
                    Step::Complete(Ok(())) => self.current = None,
                    Step::Complete(Err(err)) => {
                        self.done = Some(Err(err));
                        continue;
                    }
                }
            }
            if self.remaining == 0 {
                self.done = Some(Ok(()));
                continue;
            }
            self.remaining -= 1;
            match self.enumerable.enumerator() {
                Ok(cursor) => self.current = Some(cursor),
                Err(err) => {
                    debug!(
                        error = %err,
                        rounds_left = self.remaining,
                        "repeat could not start a round"
                    );
                    self.done = Some(Err(err));
                }
            }
        }
    }
}

/// Hands out its single source once. The second request fails with
/// [`Error::AlreadyEnumerated`].
///
/// ```rust
/// use enumerant::prelude::*;
///
/// let once = from_iter([1, 2]).into_once();
/// assert!(once.once_only());
/// assert_eq!(once.enumerator().unwrap().to_vec().unwrap(), vec![1, 2]);
/// assert!(matches!(once.enumerator(), Err(Error::AlreadyEnumerated)));
/// ```
pub struct Once<S> {
    source: Mutex<Option<S>>,
}

impl<S> Once<S> {
    pub fn new(source: S) -> Self {
        Once {
            source: Mutex::new(Some(source)),
        }
    }
}

impl<S> Enumerable for Once<S>
where
    S: Source,
{
    type Source = S;

    fn enumerator(&self) -> Result<Enumerator<S>, Error> {
        match self.source.lock().take() {
            Some(source) => Ok(Enumerator::new(source)),
            None => {
                debug!("once-only source requested again");
                Err(Error::AlreadyEnumerated)
            }
        }
    }

    fn once_only(&self) -> bool {
        true
    }

    fn enumerating(&self) -> bool {
        self.source.lock().is_none()
    }
}

/// Builds a new source for every cursor.
pub struct Supplied<F> {
    factory: F,
    enumerating: AtomicBool,
}

impl<F> Supplied<F> {
    pub fn new(factory: F) -> Self {
        Supplied {
            factory,
            enumerating: AtomicBool::new(false),
        }
    }
}

impl<S, F> Enumerable for Supplied<F>
where
    S: Source,
    F: Fn() -> S,
{
    type Source = S;

    fn enumerator(&self) -> Result<Enumerator<S>, Error> {
        self.enumerating.store(true, Ordering::Release);
        Ok(Enumerator::new((self.factory)()))
    }

    fn once_only(&self) -> bool {
        false
    }

    fn enumerating(&self) -> bool {
        self.enumerating.load(Ordering::Acquire)
    }
}

/// Multi-pass view of a single-pass source.
///
/// Every element pulled from the source is recorded, so each cursor replays the
/// sequence from the start while the source itself is pulled once per element.
/// With a limit, recording stops once more than `limit` elements have been
/// pulled: cursors already handed out keep going, further
/// [`enumerator`](Enumerable::enumerator) calls fail with
/// [`Error::CacheDisabled`].
///
/// ```rust
/// use enumerant::prelude::*;
///
/// let cached = from_iter("abc".chars()).cached();
/// let first = cached.enumerator().unwrap().to_vec().unwrap();
/// let second = cached.enumerator().unwrap().to_vec().unwrap();
/// assert_eq!(first, second);
/// ```
pub struct Cached<S>
where
    S: Source,
{
    shared: Arc<Shared<S>>,
}

impl<S> Cached<S>
where
    S: Source,
{
    pub fn new(source: S) -> Self {
        Self::pinned(source, None)
    }

    pub fn with_limit(source: S, limit: usize) -> Self {
        Self::pinned(source, Some(limit))
    }

    fn pinned(source: S, limit: Option<usize>) -> Self {
        Cached {
            shared: Shared::new(
                Mode::FanningOut,
                ReplayState::new(source, None, Pin::Held { limit }),
            ),
        }
    }

    /// Stop recording. Cursors already handed out are unaffected.
    pub fn disable(&self) {
        self.shared.state.lock().release_pin();
    }

    pub fn is_disabled(&self) -> bool {
        self.shared.state.lock().pin() == Pin::Released
    }

    /// Elements currently recorded.
    pub fn retained(&self) -> usize {
        self.shared.state.lock().retained()
    }
}

impl<S> Enumerable for Cached<S>
where
    S: Source,
    S::Item: Clone,
{
    type Source = SharingCursor<S>;

    fn enumerator(&self) -> Result<Enumerator<SharingCursor<S>>, Error> {
        let id = {
            let mut state = self.shared.state.lock();
            if state.pin() == Pin::Released {
                return Err(Error::CacheDisabled);
            }
            state.register()
        };
        Ok(Enumerator::new(SharingCursor::attach(self.shared.clone(), id)))
    }

    fn once_only(&self) -> bool {
        false
    }

    fn enumerating(&self) -> bool {
        self.shared.mode.load() == Mode::FannedEnumerating
    }
}

/// An enumerable whose target is supplied after construction.
///
/// The target can be rebound freely until the first cursor is handed out.
pub struct LateBinding<E> {
    target: RwLock<Option<E>>,
    enumerating: AtomicBool,
}

impl<E> Default for LateBinding<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> LateBinding<E> {
    pub fn new() -> Self {
        LateBinding {
            target: RwLock::new(None),
            enumerating: AtomicBool::new(false),
        }
    }

    /// Set the enumerable to delegate to. Fails with
    /// [`Error::AlreadyEnumerated`] once a cursor has been handed out.
    pub fn bind(&self, target: E) -> Result<(), Error> {
        let mut slot = self.target.write();
        if self.enumerating.load(Ordering::Acquire) {
            return Err(Error::AlreadyEnumerated);
        }
        *slot = Some(target);
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.target.read().is_some()
    }
}

impl<E> Enumerable for LateBinding<E>
where
    E: Enumerable,
{
    type Source = E::Source;

    fn enumerator(&self) -> Result<Enumerator<E::Source>, Error> {
        let slot = self.target.read();
        let target = slot.as_ref().ok_or(Error::Unbound)?;
        self.enumerating.store(true, Ordering::Release);
        target.enumerator()
    }

    /// Unbound counts as once-only, since nothing can be promised yet.
    fn once_only(&self) -> bool {
        self.target.read().as_ref().is_none_or(E::once_only)
    }

    fn enumerating(&self) -> bool {
        self.enumerating.load(Ordering::Acquire)
    }
}
