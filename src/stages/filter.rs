use crate::{Error, stage::Stage};

/// A conjunction of one or more predicates over `&T`.
///
/// Closures are predicates; [`And`] joins two of them. A [`Filter`] holds a single
/// `Predicate`, and fusing another filter into it grows the `And` chain rather than
/// the pipeline.
pub trait Predicate<T> {
    fn test(&mut self, value: &T) -> bool;

    /// Number of conjoined predicates.
    fn count(&self) -> usize {
        1
    }
}

impl<T, F> Predicate<T> for F
where
    F: FnMut(&T) -> bool,
{
    fn test(&mut self, value: &T) -> bool {
        self(value)
    }
}

/// Both predicates must hold. `A` is tested first.
pub struct And<A, B>(A, B);

impl<T, A, B> Predicate<T> for And<A, B>
where
    A: Predicate<T>,
    B: Predicate<T>,
{
    fn test(&mut self, value: &T) -> bool {
        self.0.test(value) && self.1.test(value)
    }

    fn count(&self) -> usize {
        self.0.count() + self.1.count()
    }
}

/// Keeps the elements for which its predicate holds.
///
/// The candidate is stored on `feed` and tested lazily on the first
/// `has_output` after it.
pub struct Filter<T, P> {
    predicate: P,
    candidate: Option<T>,
    tested: bool,
}

impl<T, P> Filter<T, P>
where
    P: Predicate<T>,
{
    pub fn new(predicate: P) -> Self {
        Filter {
            predicate,
            candidate: None,
            tested: false,
        }
    }

    /// Add a predicate that runs after the existing ones.
    pub fn and<Q>(self, predicate: Q) -> Filter<T, And<P, Q>>
    where
        Q: Predicate<T>,
    {
        Filter {
            predicate: And(self.predicate, predicate),
            candidate: self.candidate,
            tested: self.tested,
        }
    }

    /// Add a predicate that runs before the existing ones.
    pub fn push_front<Q>(self, predicate: Q) -> Filter<T, And<Q, P>>
    where
        Q: Predicate<T>,
    {
        Filter {
            predicate: And(predicate, self.predicate),
            candidate: self.candidate,
            tested: self.tested,
        }
    }

    pub fn predicate_count(&self) -> usize {
        self.predicate.count()
    }
}

impl<T, P> Stage<T> for Filter<T, P>
where
    P: Predicate<T>,
{
    type Output = T;

    fn feed(&mut self, input: T) -> Result<(), Error> {
        self.candidate = Some(input);
        self.tested = false;
        Ok(())
    }

    fn needs_input(&self) -> bool {
        self.candidate.is_none()
    }

    fn has_output(&mut self) -> Result<bool, Error> {
        if self.tested {
            return Ok(self.candidate.is_some());
        }
        let Some(candidate) = &self.candidate else {
            return Ok(false);
        };
        self.tested = true;
        if !self.predicate.test(candidate) {
            self.candidate = None;
        }
        Ok(self.candidate.is_some())
    }

    fn take_output(&mut self) -> Option<T> {
        self.tested = false;
        self.candidate.take()
    }

    fn is_terminal(&self) -> bool {
        false
    }
}
