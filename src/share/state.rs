use std::{mem, sync::Arc};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    Done, Error,
    replay::ReplayBuffer,
    share::{Mode, ModeCell},
    source::Source,
    step::Step,
};

enum Upstream<S> {
    Live(S),
    /// Moved out for direct enumeration.
    Detached,
    Ended(Done),
}

/// Whether the frontier is held at zero so that new readers can replay everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pin {
    Off,
    Held { limit: Option<usize> },
    Released,
}

/// Physical source, replay buffer and reader registry of one sharing engine.
pub(crate) struct ReplayState<S>
where
    S: Source,
{
    upstream: Upstream<S>,
    buffer: ReplayBuffer<S::Item>,
    /// Read position of every live reader, indexed by reader id. Dropped readers
    /// leave a `None` slot that the next registration reuses.
    readers: Vec<Option<usize>>,
    max_span: Option<usize>,
    /// Pulled but not yet buffered, because buffering it would exceed `max_span`.
    pending: Option<S::Item>,
    pin: Pin,
}

impl<S> ReplayState<S>
where
    S: Source,
{
    pub(crate) fn new(source: S, max_span: Option<usize>, pin: Pin) -> Self {
        ReplayState {
            upstream: Upstream::Live(source),
            buffer: ReplayBuffer::new(),
            readers: Vec::new(),
            max_span,
            pending: None,
            pin,
        }
    }

    pub(crate) fn pin(&self) -> Pin {
        self.pin
    }

    pub(crate) fn retained(&self) -> usize {
        self.buffer.retained()
    }

    pub(crate) fn live_readers(&self) -> usize {
        self.readers.iter().flatten().count()
    }

    /// Add a reader positioned at the frontier and return its id.
    pub(crate) fn register(&mut self) -> usize {
        let position = Some(self.buffer.frontier());
        let id = match self.readers.iter().position(Option::is_none) {
            Some(free) => {
                self.readers[free] = position;
                free
            }
            None => {
                self.readers.push(position);
                self.readers.len() - 1
            }
        };
        trace!(id, at = self.buffer.frontier(), "reader registered");
        id
    }

    pub(crate) fn deregister(&mut self, id: usize) {
        if let Some(slot) = self.readers.get_mut(id) {
            *slot = None;
            trace!(id, "reader deregistered");
            self.trim();
        }
    }

    /// Stop holding the frontier at zero.
    pub(crate) fn release_pin(&mut self) {
        if let Pin::Held { .. } = self.pin {
            debug!(retained = self.buffer.retained(), "cache disabled");
            self.pin = Pin::Released;
            self.trim();
        }
    }

    /// Take the physical source out for direct enumeration.
    pub(crate) fn detach(&mut self) -> Result<S, Error> {
        match mem::replace(&mut self.upstream, Upstream::Detached) {
            Upstream::Live(source) => Ok(source),
            other => {
                self.upstream = other;
                Err(Error::IllegalMode {
                    requested: Mode::Direct,
                    current: Mode::FannedEnumerating,
                })
            }
        }
    }

    /// Next element for reader `id`, pulling the physical source when the reader
    /// is at the end of the buffer.
    pub(crate) fn read(&mut self, id: usize) -> Result<Option<S::Item>, Error>
    where
        S::Item: Clone,
    {
        let position = self
            .readers
            .get(id)
            .copied()
            .flatten()
            .ok_or(Error::InvalidArgument("reader is not registered"))?;
        if position == self.buffer.end() && !self.fill()? {
            return Ok(None);
        }
        let value = self.buffer.read_at(position)?.clone();
        self.readers[id] = Some(position + 1);
        self.trim();
        Ok(Some(value))
    }

    /// Pull one element into the buffer. `false` when the source is exhausted.
    ///
    /// An element that would push the buffer past `max_span` is held back in
    /// `pending` and appended by the next fill that has room for it.
    fn fill(&mut self) -> Result<bool, Error> {
        let value = match self.pending.take() {
            Some(value) => value,
            None => {
                let source = match &mut self.upstream {
                    Upstream::Live(source) => source,
                    Upstream::Ended(done) => return done.clone().map(|()| false),
                    Upstream::Detached => {
                        return Err(Error::IllegalMode {
                            requested: Mode::FannedEnumerating,
                            current: Mode::Direct,
                        });
                    }
                };
                match source.pull() {
                    Step::Yielded(value) => value,
                    Step::Complete(done) => {
                        if let Err(err) = &done {
                            debug!(error = %err, "shared source failed");
                        }
                        self.upstream = Upstream::Ended(done.clone());
                        return done.map(|()| false);
                    }
                }
            }
        };
        if let Some(max) = self.max_span {
            let span = self.buffer.end() + 1 - self.buffer.frontier();
            if span > max {
                warn!(span, max, "sharing cursor ran too far ahead");
                self.pending = Some(value);
                return Err(Error::SpanExceeded { span, max });
            }
        }
        self.buffer.append(value);
        if let Pin::Held { limit: Some(limit) } = self.pin {
            if self.buffer.end() > limit {
                self.release_pin();
            }
        }
        Ok(true)
    }

    fn trim(&mut self) {
        if let Pin::Held { .. } = self.pin {
            return;
        }
        let lowest = self
            .readers
            .iter()
            .flatten()
            .min()
            .copied()
            .unwrap_or(self.buffer.end());
        self.buffer.advance_frontier(lowest);
    }
}

/// State shared by a sharing engine and the cursors it handed out.
pub(crate) struct Shared<S>
where
    S: Source,
{
    pub(crate) mode: ModeCell,
    pub(crate) state: Mutex<ReplayState<S>>,
}

impl<S> Shared<S>
where
    S: Source,
{
    pub(crate) fn new(mode: Mode, state: ReplayState<S>) -> Arc<Self> {
        Arc::new(Shared {
            mode: ModeCell::new(mode),
            state: Mutex::new(state),
        })
    }
}

/// An independently paced reader over a shared replay buffer.
///
/// Holds only a position. Dropping it releases that position so the buffer can
/// be trimmed past it.
pub struct SharingCursor<S>
where
    S: Source,
{
    shared: Arc<Shared<S>>,
    /// Reader id while registered; the failure that ended it otherwise.
    reader: Result<usize, Error>,
}

impl<S> SharingCursor<S>
where
    S: Source,
{
    pub(crate) fn attach(shared: Arc<Shared<S>>, id: usize) -> Self {
        SharingCursor {
            shared,
            reader: Ok(id),
        }
    }
}

impl<S> Source for SharingCursor<S>
where
    S: Source,
    S::Item: Clone,
{
    type Item = S::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        let id = match &self.reader {
            Ok(id) => *id,
            Err(err) => return Step::Complete(Err(err.clone())),
        };
        let mut state = self.shared.state.lock();
        let read = self
            .shared
            .mode
            .commit(Mode::FanningOut, Mode::FannedEnumerating)
            .and_then(|()| state.read(id));
        // A failed reader stops holding back the frontier.
        if let Err(err) = &read {
            state.deregister(id);
            self.reader = Err(err.clone());
        }
        Step::from_result(read)
    }
}

impl<S> Drop for SharingCursor<S>
where
    S: Source,
{
    fn drop(&mut self) {
        if let Ok(id) = self.reader {
            self.shared.state.lock().deregister(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{from_iter, try_from_iter};

    #[derive(thiserror::Error, Debug)]
    #[error("sensor offline")]
    struct Offline;

    #[test]
    fn test_frontier_follows_slowest_reader() {
        let mut state = ReplayState::new(from_iter(0..10), None, Pin::Off);
        let a = state.register();
        let b = state.register();
        for _ in 0..4 {
            state.read(a).unwrap();
        }
        assert_eq!(state.retained(), 4);
        state.read(b).unwrap();
        assert_eq!(state.retained(), 3);
        state.deregister(b);
        assert_eq!(state.retained(), 0);
    }

    #[test]
    fn test_freed_slot_is_reused() {
        let mut state = ReplayState::new(from_iter(0..3), None, Pin::Off);
        let a = state.register();
        let b = state.register();
        state.deregister(a);
        assert_eq!(state.register(), a);
        assert_eq!(state.live_readers(), 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_pin_keeps_everything_until_limit() {
        let mut state = ReplayState::new(from_iter(0..10), None, Pin::Held { limit: Some(3) });
        let a = state.register();
        for _ in 0..3 {
            state.read(a).unwrap();
        }
        assert_eq!(state.retained(), 3);
        state.read(a).unwrap();
        assert_eq!(state.pin(), Pin::Released);
        assert_eq!(state.retained(), 0);
    }

    #[test]
    fn test_span_limit_fails_leader_only() {
        let mut state = ReplayState::new(from_iter(0..10), Some(2), Pin::Off);
        let lead = state.register();
        let tail = state.register();
        assert_eq!(state.read(lead).unwrap(), Some(0));
        assert_eq!(state.read(lead).unwrap(), Some(1));
        assert!(matches!(
            state.read(lead),
            Err(Error::SpanExceeded { span: 3, max: 2 })
        ));
        assert_eq!(state.read(tail).unwrap(), Some(0));
        assert_eq!(state.read(lead).unwrap(), Some(2));
        assert_eq!(state.retained(), 2);
    }

    #[test]
    fn test_span_limit_does_not_hide_the_end() {
        let mut state = ReplayState::new(from_iter(0..2), Some(2), Pin::Off);
        let lead = state.register();
        let _tail = state.register();
        assert_eq!(state.read(lead).unwrap(), Some(0));
        assert_eq!(state.read(lead).unwrap(), Some(1));
        assert_eq!(state.read(lead).unwrap(), None);
        assert_eq!(state.read(lead).unwrap(), None);
    }

    #[test]
    fn test_source_failure_reaches_every_reader() {
        let mut state = ReplayState::new(try_from_iter(vec![Ok(1), Err(Offline)]), None, Pin::Off);
        let a = state.register();
        let b = state.register();
        assert_eq!(state.read(a).unwrap(), Some(1));
        assert!(matches!(state.read(a), Err(Error::Source(_))));
        assert_eq!(state.read(b).unwrap(), Some(1));
        assert!(matches!(state.read(b), Err(Error::Source(_))));
    }

    #[test]
    fn test_source_is_detached_once() {
        let mut state = ReplayState::new(from_iter(0..2), None, Pin::Off);
        let a = state.register();
        state.detach().unwrap();
        assert!(state.detach().unwrap_err().is_illegal_mode());
        assert!(state.read(a).unwrap_err().is_illegal_mode());
    }
}
