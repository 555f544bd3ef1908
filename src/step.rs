/// Outcome of a single pull: either a produced element or the end of the sequence.
///
/// Every [`Source`](crate::Source) answers `pull()` with a `Step`. A source that is
/// exhausted completes with `Ok(())`, a source that failed completes with the error.
///
/// # Examples
///
/// ```rust
/// use enumerant::{Done, Step};
///
/// let produced: Step<i32, Done> = Step::Yielded(42);
/// let finished: Step<i32, Done> = Step::Complete(Ok(()));
///
/// assert_eq!(produced.into_result().unwrap(), Some(42));
/// assert!(finished.is_complete());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step<Y, D> {
    /// One element was produced
    Yielded(Y),
    /// No element was produced and none will follow
    Complete(D),
}

impl<Y, D> Step<Y, D> {
    /// Returns `true` if the step is `Yielded`.
    #[inline]
    pub const fn is_yielded(&self) -> bool {
        matches!(self, Step::Yielded(_))
    }

    /// Returns `true` if the step is `Complete`.
    #[inline]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Step::Complete(_))
    }

    /// Returns the yielded value.
    ///
    /// # Panics
    ///
    /// Panics if the step is `Complete`.
    #[inline]
    #[track_caller]
    pub fn unwrap_yielded(self) -> Y {
        match self {
            Step::Yielded(y) => y,
            Step::Complete(_) => panic!("called `Step::unwrap_yielded()` on a `Complete` value"),
        }
    }
}

impl<Y, E> Step<Y, Result<(), E>> {
    /// Flattens a pull outcome into the `Result<Option<_>>` shape that `?` understands.
    ///
    /// ```rust
    /// use enumerant::{Done, Step};
    ///
    /// let s: Step<i32, Done> = Step::Yielded(1);
    /// assert_eq!(s.into_result().unwrap(), Some(1));
    ///
    /// let s: Step<i32, Done> = Step::Complete(Ok(()));
    /// assert_eq!(s.into_result().unwrap(), None);
    /// ```
    #[inline]
    pub fn into_result(self) -> Result<Option<Y>, E> {
        match self {
            Step::Yielded(y) => Ok(Some(y)),
            Step::Complete(Ok(())) => Ok(None),
            Step::Complete(Err(e)) => Err(e),
        }
    }

    /// Inverse of [`into_result`](Step::into_result).
    #[inline]
    pub fn from_result(result: Result<Option<Y>, E>) -> Self {
        match result {
            Ok(Some(y)) => Step::Yielded(y),
            Ok(None) => Step::Complete(Ok(())),
            Err(e) => Step::Complete(Err(e)),
        }
    }

    /// Returns `true` if the step completed with an error.
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, Step::Complete(Err(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yielded_and_complete() {
        let y: Step<i32, &str> = Step::Yielded(1);
        let c: Step<i32, &str> = Step::Complete("x");
        assert!(y.is_yielded());
        assert!(!y.is_complete());
        assert!(c.is_complete());
        assert!(!c.is_yielded());
    }

    #[test]
    fn test_result_conversion_keeps_error() {
        let s: Step<i32, Result<(), &str>> = Step::Complete(Err("boom"));
        assert!(s.is_failed());
        assert_eq!(s.into_result(), Err("boom"));
        assert_eq!(
            Step::<i32, Result<(), &str>>::from_result(Err("boom")),
            Step::Complete(Err("boom"))
        );
    }

    #[test]
    #[should_panic(expected = "called `Step::unwrap_yielded()` on a `Complete` value")]
    fn test_unwrap_yielded_panics_on_complete() {
        let s: Step<i32, ()> = Step::Complete(());
        s.unwrap_yielded();
    }
}
