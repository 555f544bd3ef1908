//! Sharing one single-pass source between many cursors.
//!
//! A [`Shareable`] owns the physical source, a [`ReplayBuffer`](crate::ReplayBuffer)
//! and a registry of live reader positions, all behind one mutex. Each
//! [`SharingCursor`] is nothing but a reader id. Reading at the end of the buffer
//! pulls the physical source and records the element; every read then moves the
//! trim frontier up to the slowest live reader.
//!
//! The engine's [`Mode`] is committed with a compare-and-exchange, so concurrent
//! first use from several threads picks exactly one winner.
//!
//! Divergence between cursors is unbounded by default. [`ShareConfig::max_span`]
//! caps it: a cursor whose read would grow the buffer past the cap fails with
//! [`Error::SpanExceeded`](crate::Error::SpanExceeded) and the others go on.

mod config;
mod engine;
mod mode;
pub(crate) mod state;

pub use config::ShareConfig;
pub use engine::Shareable;
pub use mode::Mode;
pub(crate) use mode::ModeCell;
pub use state::SharingCursor;
