//! The stage protocol and the fusion engine that drives it.
//!
//! A [`Stage`] is one step of a pipeline. It is fed one upstream element at a time
//! and holds at most one produced element, so a pipeline of `n` stages buffers at
//! most `n` elements. The draining stages (sorted, reversed, distinct) are the
//! exception: they hold the whole upstream until it is exhausted.
//!
//! [`Pipe`] couples an upstream [`Source`] with a stage and is itself a source,
//! so pipes nest: `from_iter(..).map(f).filter(p)` is
//! `Pipe<Pipe<IterSource<_>, Map<_>>, Filter<_>>`. Pulling the outer pipe pulls
//! the inner one as many times as needed, down to the physical source, without
//! materializing anything in between.

use tracing::debug;

use crate::{
    Done, Error,
    source::Source,
    stages::{And, Filter, Predicate},
    step::Step,
};

/// One step of a pipeline.
pub trait Stage<I> {
    type Output;

    /// Accept one upstream element.
    fn feed(&mut self, input: I) -> Result<(), Error>;

    /// `true` while the stage has nothing ready and can still make use of input.
    fn needs_input(&self) -> bool;

    /// `true` when an element is ready for [`take_output`](Stage::take_output).
    ///
    /// May do deferred work (evaluate a predicate, pull a sub-sequence), which is
    /// why it takes `&mut self`. Calling it repeatedly without taking the output
    /// does that work once.
    fn has_output(&mut self) -> Result<bool, Error>;

    /// Remove the ready element.
    fn take_output(&mut self) -> Option<Self::Output>;

    /// `true` once the stage will never produce again, whatever it is fed.
    fn is_terminal(&self) -> bool;

    /// Upstream is exhausted. Draining stages release their buffered output here.
    fn end_input(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

enum PipeState {
    Running,
    /// Upstream reported exhaustion; only buffered stage output remains.
    Drained,
    Finished,
    Failed(Error),
}

/// A source made of an upstream source and one stage.
pub struct Pipe<U, S> {
    upstream: U,
    stage: S,
    state: PipeState,
}

impl<U, S> Pipe<U, S>
where
    U: Source,
    S: Stage<U::Item>,
{
    pub fn new(upstream: U, stage: S) -> Self {
        Pipe {
            upstream,
            stage,
            state: PipeState::Running,
        }
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Split the pipe back into its upstream and stage.
    pub fn into_parts(self) -> (U, S) {
        (self.upstream, self.stage)
    }

    fn drive(&mut self) -> Result<Option<S::Output>, Error> {
        loop {
            if self.stage.has_output()? {
                if let Some(value) = self.stage.take_output() {
                    return Ok(Some(value));
                }
            }
            if self.stage.is_terminal() || !self.stage.needs_input() {
                return Ok(None);
            }
            if let PipeState::Drained = self.state {
                return Ok(None);
            }
            match self.upstream.pull().into_result()? {
                Some(value) => self.stage.feed(value)?,
                None => {
                    self.state = PipeState::Drained;
                    self.stage.end_input()?;
                }
            }
        }
    }
}

impl<U, S> Source for Pipe<U, S>
where
    U: Source,
    S: Stage<U::Item>,
{
    type Item = S::Output;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        match &self.state {
            PipeState::Finished => return Step::Complete(Ok(())),
            PipeState::Failed(err) => return Step::Complete(Err(err.clone())),
            PipeState::Running | PipeState::Drained => {}
        }
        match self.drive() {
            Ok(Some(value)) => Step::Yielded(value),
            Ok(None) => {
                self.state = PipeState::Finished;
                Step::Complete(Ok(()))
            }
            Err(err) => {
                debug!(error = %err, "pipeline failed");
                self.state = PipeState::Failed(err.clone());
                Step::Complete(Err(err))
            }
        }
    }
}

impl<U, P> Pipe<U, Filter<U::Item, P>>
where
    U: Source,
    P: Predicate<U::Item>,
{
    /// Append `predicate` to the outermost filter instead of stacking a new stage.
    ///
    /// An element passes when every predicate holds; predicates run in the order
    /// they were added and stop at the first rejection.
    ///
    /// ```rust
    /// use enumerant::prelude::*;
    ///
    /// let out = from_iter(1..=20)
    ///     .filter(|x| x % 2 == 0)
    ///     .filter(|x| x % 3 == 0)
    ///     .enumerator()
    ///     .to_vec()
    ///     .unwrap();
    /// assert_eq!(out, vec![6, 12, 18]);
    /// ```
    pub fn filter<F>(self, predicate: F) -> Pipe<U, Filter<U::Item, And<P, F>>>
    where
        F: FnMut(&U::Item) -> bool,
    {
        Pipe {
            upstream: self.upstream,
            stage: self.stage.and(predicate),
            state: self.state,
        }
    }

    /// Like [`filter`](Pipe::filter), but the new predicate runs before the existing ones.
    pub fn filter_first<F>(self, predicate: F) -> Pipe<U, Filter<U::Item, And<F, P>>>
    where
        F: FnMut(&U::Item) -> bool,
    {
        Pipe {
            upstream: self.upstream,
            stage: self.stage.push_front(predicate),
            state: self.state,
        }
    }
}
