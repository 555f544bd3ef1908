use crate::{Done, Error, source::Source, step::Step};

/// Interleaves several sources, letting a caller-supplied index pick the next one.
///
/// Each pull asks `index` for a starting position and pulls from that source.
/// When the chosen source is exhausted, `alternative` names the next position to
/// try, up to one attempt per source. Exhausted sources are dropped.
pub struct Choice<S, I, A> {
    sources: Vec<Option<S>>,
    index: I,
    alternative: A,
    outcome: Option<Done>,
}

/// Interleave `sources`, falling back to the following source (round-robin) when
/// the chosen one is exhausted.
pub fn choice<S, I>(
    index: I,
    sources: Vec<S>,
) -> Result<Choice<S, I, impl FnMut(usize) -> usize>, Error>
where
    S: Source,
    I: FnMut() -> usize,
{
    let width = sources.len();
    choice_with(index, move |i| (i + 1) % width.max(1), sources)
}

/// Interleave `sources` with an explicit fallback order.
///
/// Fails with [`Error::InvalidArgument`] for fewer than two sources.
pub fn choice_with<S, I, A>(
    index: I,
    alternative: A,
    sources: Vec<S>,
) -> Result<Choice<S, I, A>, Error>
where
    S: Source,
    I: FnMut() -> usize,
    A: FnMut(usize) -> usize,
{
    if sources.len() < 2 {
        return Err(Error::InvalidArgument("choice needs at least two sources"));
    }
    Ok(Choice {
        sources: sources.into_iter().map(Some).collect(),
        index,
        alternative,
        outcome: None,
    })
}

impl<S, I, A> Choice<S, I, A>
where
    S: Source,
    I: FnMut() -> usize,
    A: FnMut(usize) -> usize,
{
    fn step(&mut self) -> Result<Option<S::Item>, Error> {
        let width = self.sources.len();
        let mut position = (self.index)() % width;
        for _ in 0..width {
            if let Some(source) = self.sources[position].as_mut() {
                match source.pull().into_result()? {
                    Some(value) => return Ok(Some(value)),
                    None => self.sources[position] = None,
                }
            }
            position = (self.alternative)(position) % width;
        }
        Ok(None)
    }
}

impl<S, I, A> Source for Choice<S, I, A>
where
    S: Source,
    I: FnMut() -> usize,
    A: FnMut(usize) -> usize,
{
    type Item = S::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        if let Some(done) = &self.outcome {
            return Step::Complete(done.clone());
        }
        match self.step() {
            Ok(Some(value)) => Step::Yielded(value),
            other => {
                let done = other.map(|_| ());
                self.outcome = Some(done.clone());
                Step::Complete(done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build::from_iter, source::SourceExt};

    #[test]
    fn test_choice_alternates_then_drains_longer_source() {
        let mut turn = 0;
        let out = choice(
            move || {
                turn += 1;
                turn
            },
            vec![from_iter(vec![0, 2, 4]), from_iter(vec![1, 3, 5, 7, 9])],
        )
        .unwrap()
        .enumerator()
        .to_vec()
        .unwrap();
        assert_eq!(out, vec![1, 0, 3, 2, 5, 4, 7, 9]);
    }

    #[test]
    fn test_choice_with_fixed_index_concatenates() {
        let out = choice_with(
            || 0,
            |i| i + 1,
            vec![from_iter(vec!['a', 'b']), from_iter(vec!['c']), from_iter(vec!['d'])],
        )
        .unwrap()
        .enumerator()
        .to_vec()
        .unwrap();
        assert_eq!(out, vec!['a', 'b', 'c', 'd']);
    }

    #[test]
    fn test_choice_rejects_single_source() {
        assert!(matches!(
            choice(|| 0, vec![from_iter(vec![1])]),
            Err(Error::InvalidArgument(_))
        ));
    }
}
