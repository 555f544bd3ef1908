use crate::Error;

/// Tuning for a sharing engine.
///
/// ```rust
/// use enumerant::prelude::*;
///
/// let config = ShareConfig::default().with_max_span(64);
/// let shareable = from_iter(0..10).shareable_with(config).unwrap();
/// assert_eq!(shareable.config().max_span, Some(64));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShareConfig {
    /// Most entries the replay buffer may hold between the slowest and the
    /// fastest live cursor. A cursor that would grow the buffer past it fails
    /// with [`Error::SpanExceeded`]. `None` never fails.
    pub max_span: Option<usize>,
}

impl ShareConfig {
    pub fn with_max_span(mut self, max_span: usize) -> Self {
        self.max_span = Some(max_span);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        match self.max_span {
            Some(0) => Err(Error::InvalidArgument("max_span must be at least 1")),
            _ => Ok(()),
        }
    }
}
