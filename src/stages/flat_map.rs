use crate::{Error, source::Source, stage::Stage, step::Step};

/// Replaces each element with the elements of a sub-source.
///
/// The sub-source is drained one element per `has_output`/`take_output` round;
/// once it is exhausted the stage asks for the next outer element. Generic over
/// the sub-source type, so numeric sub-sequences stay unboxed.
pub struct FlatMap<F, J>
where
    J: Source,
{
    f: F,
    sub: Option<J>,
    slot: Option<J::Item>,
}

impl<F, J> FlatMap<F, J>
where
    J: Source,
{
    pub fn new(f: F) -> Self {
        FlatMap {
            f,
            sub: None,
            slot: None,
        }
    }
}

impl<I, F, J> Stage<I> for FlatMap<F, J>
where
    J: Source,
    F: FnMut(I) -> J,
{
    type Output = J::Item;

    fn feed(&mut self, input: I) -> Result<(), Error> {
        self.sub = Some((self.f)(input));
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.slot.is_none() && self.sub.is_none()
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        if self.slot.is_some() {
            return Ok(true);
        }
        let Some(sub) = self.sub.as_mut() else {
            return Ok(false);
        };
        match sub.pull() {
            Step::Yielded(value) => {
                self.slot = Some(value);
                Ok(true)
            }
            Step::Complete(done) => {
                self.sub = None;
                done.map(|()| false)
            }
        }
    }

    fn take_output(&mut self) -> Option<J::Item> {
        self.slot.take()
    }

    fn is_terminal(&self) -> bool {
        false
    }
}
