use crate::{Error, stage::Stage};

/// Applies a function to every element, exactly once per element.
pub struct Map<F, O> {
    f: F,
    slot: Option<O>,
}

impl<F, O> Map<F, O> {
    pub fn new(f: F) -> Self {
        Map { f, slot: None }
    }
}

impl<I, O, F> Stage<I> for Map<F, O>
where
    F: FnMut(I) -> O,
{
    type Output = O;

    fn feed(&mut self, input: I) -> Result<(), Error> {
        self.slot = Some((self.f)(input));
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.slot.is_none()
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        Ok(self.slot.is_some())
    }

    fn take_output(&mut self) -> Option<O> {
        self.slot.take()
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

/// Like [`Map`], but the function also receives the element's position.
pub struct IndexedMap<F, O> {
    f: F,
    index: usize,
    slot: Option<O>,
}

impl<F, O> IndexedMap<F, O> {
    pub fn new(f: F) -> Self {
        IndexedMap {
            f,
            index: 0,
            slot: None,
        }
    }
}

impl<I, O, F> Stage<I> for IndexedMap<F, O>
where
    F: FnMut(I, usize) -> O,
{
    type Output = O;

    fn feed(&mut self, input: I) -> Result<(), Error> {
        self.slot = Some((self.f)(input, self.index));
        self.index += 1;
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.slot.is_none()
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        Ok(self.slot.is_some())
    }

    fn take_output(&mut self) -> Option<O> {
        self.slot.take()
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

/// Passes elements through unchanged after showing each one to a callback.
pub struct Inspect<F, T> {
    f: F,
    slot: Option<T>,
}

impl<F, T> Inspect<F, T> {
    pub fn new(f: F) -> Self {
        Inspect { f, slot: None }
    }
}

impl<T, F> Stage<T> for Inspect<F, T>
where
    F: FnMut(&T),
{
    type Output = T;

    fn feed(&mut self, input: T) -> Result<(), Error> {
        (self.f)(&input);
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
