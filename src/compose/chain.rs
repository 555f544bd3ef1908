use crate::{Done, source::Source, step::Step};

/// Run the first source to exhaustion, then continue with the second.
///
/// A failure of the first source is reported and the second is never started.
pub fn chain<L, R>(l: L, r: R) -> Chain<L, R>
where
    L: Source,
    R: Source<Item = L::Item>,
{
    Chain(Some(l), r)
}

/// Concatenation of two sources.
///
/// Created via [`chain`] or [`SourceExt::concat`](crate::SourceExt::concat). The
/// first source is dropped once it is exhausted.
pub struct Chain<L, R>(Option<L>, R);

impl<L, R> Source for Chain<L, R>
where
    L: Source,
    R: Source<Item = L::Item>,
{
    type Item = L::Item;

    fn pull(&mut self) -> Step<Self::Item, Done> {
        if let Some(ref mut l) = self.0 {
            match l.pull() {
                Step::Complete(Ok(())) => {
                    self.0 = None; // drop the exhausted source
                }
                step => return step,
            }
        }
        self.1.pull()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error,
        build::{from_iter, try_from_iter},
        source::SourceExt,
    };

    #[derive(thiserror::Error, Debug)]
    #[error("first half failed")]
    struct Half;

    #[test]
    fn test_chain_switches_to_second_source_after_first_done() {
        let out = chain(from_iter([1, 2]), from_iter([3]))
            .enumerator()
            .to_vec()
            .unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_concat_with_empty_sides() {
        let out = from_iter(Vec::<u8>::new())
            .concat(from_iter([7]))
            .concat(from_iter(Vec::new()))
            .enumerator()
            .to_vec()
            .unwrap();
        assert_eq!(out, vec![7]);
    }

    #[test]
    fn test_chain_does_not_start_second_after_failure() {
        let mut cursor = chain(
            try_from_iter(vec![Ok(1), Err(Half)]),
            from_iter([2]).inspect(|_| panic!("second source must not run")),
        )
        .enumerator();
        assert_eq!(cursor.next().unwrap(), 1);
        assert!(matches!(cursor.next(), Err(Error::Source(_))));
    }
}
