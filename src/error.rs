use std::sync::Arc;

use thiserror::Error;

use crate::share::Mode;

/// Completion payload of a pull: `Ok(())` when exhausted, `Err` when failed.
pub type Done = Result<(), Error>;

/// Errors raised by cursors, pipelines, and the sharing engine.
///
/// All of them are local and final: a pipeline that reports one keeps reporting it.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("sequence is exhausted")]
    Exhausted,

    #[error("cannot enter {requested:?} mode while in {current:?} mode")]
    IllegalMode { requested: Mode, current: Mode },

    #[error("once-only enumerable was already enumerated")]
    AlreadyEnumerated,

    #[error("replay index {index} is below the trim frontier {frontier}")]
    IndexDiscarded { index: usize, frontier: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("sharing span of {span} entries exceeds the maximum of {max}")]
    SpanExceeded { span: usize, max: usize },

    #[error("late-binding enumerable has no source bound")]
    Unbound,

    #[error("cache was disabled; no new enumerators can replay it")]
    CacheDisabled,

    #[error("source failed: {0}")]
    Source(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a failure raised by a physical source or a user callable.
    pub fn from_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Source(Arc::new(err))
    }

    /// Returns `true` for the end-of-sequence condition.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::Exhausted)
    }

    /// Returns `true` for mode violations, including a second use of a once-only source.
    pub fn is_illegal_mode(&self) -> bool {
        matches!(
            self,
            Error::IllegalMode { .. } | Error::AlreadyEnumerated | Error::CacheDisabled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, Debug)]
    #[error("disk on fire")]
    struct Fire;

    #[test]
    fn test_source_error_message_is_preserved() {
        let err = Error::from_source(Fire);
        assert_eq!(err.to_string(), "source failed: disk on fire");
        let cloned = err.clone();
        assert!(matches!(cloned, Error::Source(_)));
    }

    #[test]
    fn test_illegal_mode_names_both_modes() {
        let err = Error::IllegalMode {
            requested: Mode::Direct,
            current: Mode::FanningOut,
        };
        assert_eq!(
            err.to_string(),
            "cannot enter Direct mode while in FanningOut mode"
        );
    }
}
