use std::sync::Arc;

use crate::{
    Done, Error,
    cursor::Enumerator,
    share::{
        Mode, ShareConfig,
        state::{Pin, ReplayState, Shared, SharingCursor},
    },
    source::Source,
    step::Step,
};

/// Turns one single-pass source into any number of independently paced cursors.
///
/// The engine is used in exactly one of two ways for its whole life:
///
/// - [`fan_out`](Shareable::fan_out) hands out cursors that read through a shared
///   replay buffer. The physical source is pulled once per element no matter how
///   many cursors read it, and buffer entries are dropped once every live cursor
///   has passed them.
/// - [`has_next`](Shareable::has_next)/[`next`](Shareable::next) enumerate the
///   source straight through, without a buffer.
///
/// Asking for the other one afterwards fails with [`Error::IllegalMode`].
///
/// ```rust
/// use enumerant::prelude::*;
///
/// let shareable = from_iter(1..=3).shareable();
/// let mut cursors = shareable.fan_out(2).unwrap();
/// let second = cursors.pop().unwrap();
/// let first = cursors.pop().unwrap();
///
/// let zipped = first.zip_both(second).enumerator().to_vec().unwrap();
/// assert_eq!(zipped, vec![(1, 1), (2, 2), (3, 3)]);
/// ```
pub struct Shareable<S>
where
    S: Source,
{
    shared: Arc<Shared<S>>,
    direct: Option<Enumerator<S>>,
    config: ShareConfig,
}

impl<S> Shareable<S>
where
    S: Source,
{
    pub fn new(source: S) -> Self {
        Shareable {
            shared: Shared::new(Mode::Unbound, ReplayState::new(source, None, Pin::Off)),
            direct: None,
            config: ShareConfig::default(),
        }
    }

    pub fn with_config(source: S, config: ShareConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Shareable {
            shared: Shared::new(
                Mode::Unbound,
                ReplayState::new(source, config.max_span, Pin::Off),
            ),
            direct: None,
            config,
        })
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.shared.mode.load()
    }

    /// Entries currently held by the replay buffer.
    pub fn retained(&self) -> usize {
        self.shared.state.lock().retained()
    }

    /// Cursors handed out by [`fan_out`](Shareable::fan_out) that are still alive.
    pub fn live_cursors(&self) -> usize {
        self.shared.state.lock().live_readers()
    }

    /// Hand out `n` cursors that each see the whole sequence.
    ///
    /// Can be called repeatedly until one of the cursors pulls. Fails with
    /// [`Error::IllegalMode`] after that, and once direct enumeration has begun.
    pub fn fan_out(&self, n: usize) -> Result<Vec<Enumerator<SharingCursor<S>>>, Error>
    where
        S::Item: Clone,
    {
        let ids: Vec<usize> = {
            let mut state = self.shared.state.lock();
            self.shared.mode.commit(Mode::Unbound, Mode::FanningOut)?;
            (0..n).map(|_| state.register()).collect()
        };
        Ok(ids
            .into_iter()
            .map(|id| Enumerator::new(SharingCursor::attach(self.shared.clone(), id)))
            .collect())
    }

    /// A single shared cursor.
    pub fn share(&self) -> Result<Enumerator<SharingCursor<S>>, Error>
    where
        S::Item: Clone,
    {
        let id = {
            let mut state = self.shared.state.lock();
            self.shared.mode.commit(Mode::Unbound, Mode::FanningOut)?;
            state.register()
        };
        Ok(Enumerator::new(SharingCursor::attach(self.shared.clone(), id)))
    }

    fn direct(&mut self) -> Result<&mut Enumerator<S>, Error> {
        match self.direct {
            Some(ref mut cursor) => Ok(cursor),
            None => {
                let source = {
                    let mut state = self.shared.state.lock();
                    self.shared.mode.commit(Mode::Unbound, Mode::Direct)?;
                    state.detach()?
                };
                Ok(self.direct.insert(Enumerator::new(source)))
            }
        }
    }

    /// Whether direct enumeration has another element.
    pub fn has_next(&mut self) -> Result<bool, Error> {
        self.direct()?.has_next()
    }

    /// Next element of direct enumeration.
    pub fn next(&mut self) -> Result<S::Item, Error> {
        self.direct()?.next()
    }

    pub fn try_next(&mut self) -> Result<Option<S::Item>, Error> {
        self.direct()?.try_next()
    }
}

impl<S> Source for Shareable<S>
where
    S: Source,
{
    type Item = S::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        match self.direct() {
            Ok(cursor) => cursor.pull(),
            Err(err) => Step::Complete(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        rc::Rc,
        sync::atomic::{AtomicUsize, Ordering},
        thread,
    };

    use proptest::prelude::*;

    use super::*;
    use crate::{build::from_iter, source::SourceExt};

    fn counted(n: i32) -> (Rc<Cell<usize>>, impl Source<Item = i32>) {
        let pulls = Rc::new(Cell::new(0));
        let counter = pulls.clone();
        let source = from_iter(0..n).inspect(move |_| counter.set(counter.get() + 1));
        (pulls, source)
    }

    #[test]
    fn test_fanned_cursors_pull_source_once_per_element() {
        let (pulls, source) = counted(5);
        let shareable = source.shareable();
        let mut cursors = shareable.fan_out(3).unwrap();

        let first = cursors[0].to_vec().unwrap();
        let second = cursors[1].to_vec().unwrap();
        let third = cursors[2].to_vec().unwrap();

        assert_eq!(first, vec![0, 1, 2, 3, 4]);
        assert_eq!(second, first);
        assert_eq!(third, first);
        assert_eq!(pulls.get(), 5);
        assert_eq!(shareable.mode(), Mode::FannedEnumerating);
    }

    #[test]
    fn test_buffer_holds_only_active_span() {
        let shareable = from_iter(0..100).shareable();
        let mut cursors = shareable.fan_out(2).unwrap();
        for _ in 0..10 {
            cursors[0].next().unwrap();
        }
        assert_eq!(shareable.retained(), 10);
        for _ in 0..7 {
            cursors[1].next().unwrap();
        }
        assert_eq!(shareable.retained(), 3);
    }

    #[test]
    fn test_dropping_a_laggard_releases_its_entries() {
        let shareable = from_iter(0..50).shareable();
        let mut cursors = shareable.fan_out(2).unwrap();
        for _ in 0..20 {
            cursors[0].next().unwrap();
        }
        assert_eq!(shareable.retained(), 20);
        cursors.truncate(1);
        assert_eq!(shareable.retained(), 0);
        assert_eq!(shareable.live_cursors(), 1);
        assert_eq!(cursors[0].next().unwrap(), 20);
    }

    #[test]
    fn test_fan_out_allowed_until_first_pull() {
        let shareable = from_iter(0..3).shareable();
        let mut early = shareable.fan_out(1).unwrap();
        let mut late = shareable.share().unwrap();
        assert_eq!(shareable.mode(), Mode::FanningOut);

        assert_eq!(early[0].next().unwrap(), 0);
        assert!(matches!(
            shareable.fan_out(1),
            Err(Error::IllegalMode {
                requested: Mode::FanningOut,
                current: Mode::FannedEnumerating
            })
        ));
        assert_eq!(late.to_vec().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_direct_enumeration_excludes_fan_out() {
        let mut shareable = from_iter(0..3).shareable();
        assert!(shareable.has_next().unwrap());
        assert_eq!(shareable.next().unwrap(), 0);
        assert_eq!(shareable.mode(), Mode::Direct);
        assert!(shareable.fan_out(2).unwrap_err().is_illegal_mode());
        assert_eq!(shareable.enumerator().to_vec().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_fan_out_excludes_direct_enumeration() {
        let mut shareable = from_iter(0..3).shareable();
        let _cursors = shareable.fan_out(0).unwrap();
        assert!(matches!(
            shareable.has_next(),
            Err(Error::IllegalMode {
                requested: Mode::Direct,
                current: Mode::FanningOut
            })
        ));
        assert!(shareable.pull().is_failed());
    }

    #[test]
    fn test_max_span_must_be_positive() {
        let config = ShareConfig::default().with_max_span(0);
        assert!(matches!(
            from_iter(0..1).shareable_with(config),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_leader_past_max_span_fails() {
        let shareable = from_iter(0..10)
            .shareable_with(ShareConfig::default().with_max_span(2))
            .unwrap();
        let mut cursors = shareable.fan_out(2).unwrap();
        cursors[0].next().unwrap();
        cursors[0].next().unwrap();
        assert!(matches!(
            cursors[0].next(),
            Err(Error::SpanExceeded { span: 3, max: 2 })
        ));
        assert_eq!(cursors[1].to_vec().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_capped_leader_reaches_the_end() {
        let shareable = from_iter(0..2)
            .shareable_with(ShareConfig::default().with_max_span(2))
            .unwrap();
        let mut cursors = shareable.fan_out(2).unwrap();
        assert_eq!(cursors[0].next().unwrap(), 0);
        assert_eq!(cursors[0].next().unwrap(), 1);
        assert!(!cursors[0].has_next().unwrap());
        assert!(cursors[0].next().unwrap_err().is_exhausted());
        assert_eq!(cursors[1].to_vec().unwrap(), vec![0, 1]);
        assert_eq!(shareable.retained(), 0);
    }

    #[test]
    fn test_cursors_advance_on_separate_threads() {
        let pulls = Arc::new(AtomicUsize::new(0));
        let counter = pulls.clone();
        let shareable = from_iter(0..1000u32)
            .inspect(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .shareable();
        let cursors = shareable.fan_out(4).unwrap();

        let sums: Vec<u32> = cursors
            .into_iter()
            .map(|mut cursor| thread::spawn(move || cursor.fold(0, |a, b| a + b).unwrap()))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert_eq!(sums, vec![499_500; 4]);
        assert_eq!(pulls.load(Ordering::Relaxed), 1000);
        assert_eq!(shareable.retained(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn fan_out_pulls_each_element_once(
            len in 0usize..40,
            n in 1usize..5,
            schedule in prop::collection::vec(any::<prop::sample::Index>(), 0..200),
        ) {
            let (pulls, source) = counted(len as i32);
            let shareable = source.shareable();
            let mut cursors = shareable
                .fan_out(n)
                .unwrap_or_else(|e| panic!("fan_out failed: {e}"));

            let mut seen = vec![Vec::new(); n];
            for pick in schedule {
                let i = pick.index(n);
                if let Some(value) = cursors[i]
                    .try_next()
                    .unwrap_or_else(|e| panic!("cursor failed: {e}"))
                {
                    seen[i].push(value);
                }
            }
            for (cursor, seen) in cursors.iter_mut().zip(seen.iter_mut()) {
                seen.extend(cursor.to_vec().unwrap_or_else(|e| panic!("cursor failed: {e}")));
            }

            let expected: Vec<i32> = (0..len as i32).collect();
            for seen in &seen {
                prop_assert_eq!(seen, &expected);
            }
            prop_assert_eq!(pulls.get(), len);
        }

        #[test]
        fn bounded_divergence_keeps_buffer_bounded(len in 0usize..300, k in 1usize..8) {
            let shareable = from_iter(0..len)
                .shareable_with(ShareConfig::default().with_max_span(k))
                .unwrap_or_else(|e| panic!("bad config: {e}"));
            let mut cursors = shareable
                .fan_out(2)
                .unwrap_or_else(|e| panic!("fan_out failed: {e}"));

            let mut max_retained = 0;
            loop {
                let mut progressed = false;
                for i in 0..2 {
                    for _ in 0..k {
                        let value = cursors[i]
                            .try_next()
                            .unwrap_or_else(|e| panic!("cursor failed: {e}"));
                        progressed |= value.is_some();
                        max_retained = max_retained.max(shareable.retained());
                    }
                }
                if !progressed {
                    break;
                }
            }
            prop_assert!(max_retained <= k);
        }
    }
}
