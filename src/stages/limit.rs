//! Stages that cut a sequence short or skip its head.

use crate::{Error, stage::Stage};

/// Passes at most `n` elements, then turns terminal without pulling further.
pub struct Take<T> {
    remaining: usize,
    slot: Option<T>,
}

impl<T> Take<T> {
    pub fn new(n: usize) -> Self {
        Take {
            remaining: n,
            slot: None,
        }
    }
}

impl<T> Stage<T> for Take<T> {
    type Output = T;

    fn feed(&mut self, input: T) -> Result<(), Error> {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.slot = Some(input);
        }
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.slot.is_none() && self.remaining > 0
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        Ok(self.slot.is_some())
    }

    fn take_output(&mut self) -> Option<T> {
        self.slot.take()
    }

    fn is_terminal(&self) -> bool {
        self.remaining == 0 && self.slot.is_none()
    }
}

/// Passes elements while the predicate holds; the first failure ends the stage.
pub struct TakeWhile<F, T> {
    predicate: F,
    slot: Option<T>,
    stopped: bool,
}

impl<F, T> TakeWhile<F, T> {
    pub fn new(predicate: F) -> Self {
        TakeWhile {
            predicate,
            slot: None,
            stopped: false,
        }
    }
}

impl<T, F> Stage<T> for TakeWhile<F, T>
where
    F: FnMut(&T) -> bool,
{
    type Output = T;

    fn feed(&mut self, input: T) -> Result<(), Error> {
        if self.stopped {
            return Ok(());
        }
        if (self.predicate)(&input) {
            self.slot = Some(input);
        } else {
            self.stopped = true;
        }
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.slot.is_none() && !self.stopped
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        Ok(self.slot.is_some())
    }

    fn take_output(&mut self) -> Option<T> {
        self.slot.take()
    }

    fn is_terminal(&self) -> bool {
        self.stopped && self.slot.is_none()
    }
}

/// Drops the first `n` elements.
pub struct Skip<T> {
    remaining: usize,
    slot: Option<T>,
}

impl<T> Skip<T> {
    pub fn new(n: usize) -> Self {
        Skip {
            remaining: n,
            slot: None,
        }
    }
}

impl<T> Stage<T> for Skip<T> {
    type Output = T;

    fn feed(&mut self, input: T) -> Result<(), Error> {
        if self.remaining > 0 {
            self.remaining -= 1;
        } else {
            self.slot = Some(input);
        }
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.slot.is_none()
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        Ok(self.slot.is_some())
    }

    fn take_output(&mut self) -> Option<T> {
        self.slot.take()
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

/// Drops elements while the predicate holds, then passes everything.
pub struct SkipWhile<F, T> {
    // None once the first non-matching element has been seen.
    predicate: Option<F>,
    slot: Option<T>,
}

impl<F, T> SkipWhile<F, T> {
    pub fn new(predicate: F) -> Self {
        SkipWhile {
            predicate: Some(predicate),
            slot: None,
        }
    }
}

impl<T, F> Stage<T> for SkipWhile<F, T>
where
    F: FnMut(&T) -> bool,
{
    type Output = T;

    fn feed(&mut self, input: T) -> Result<(), Error> {
        if let Some(predicate) = self.predicate.as_mut() {
            if predicate(&input) {
                return Ok(());
            }
            self.predicate = None;
        }
        self.slot = Some(input);
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.slot.is_none()
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        Ok(self.slot.is_some())
    }

    fn take_output(&mut self) -> Option<T> {
        self.slot.take()
    }

    fn is_terminal(&self) -> bool {
        false
    }
}
