//! # Enumerant: lazy, fusable, shareable sequences
//!
//! Pull-based sequence processing over single-pass sources.
//!
//! ## Core Traits
//!
//! - **[`Source`]**: a single-pass producer answering each [`pull`](Source::pull) with a [`Step`]
//! - **[`Stage`]**: one pipeline step, driven by a [`Pipe`]
//! - **[`Enumerable`]**: something that hands out cursors, possibly only once
//!
//! ## Key Features
//!
//! - **Fused**: a chain of stages runs inside one outer pull, with no intermediate collections
//! - **Shareable**: [`Shareable::fan_out`] gives many independently paced cursors over one
//!   source, pulling it once per element
//! - **Cached**: [`SourceExt::cached`] turns a single-pass source into a multi-pass one
//!
//! ## Example
//!
//! ```
//! use enumerant::prelude::*;
//!
//! let mut evens = from_iter(1..=10)
//!     .map(|x| x * x)
//!     .filter(|x| x % 2 == 0)
//!     .enumerator();
//!
//! assert_eq!(evens.to_vec().unwrap(), vec![4, 16, 36, 64, 100]);
//! ```
//!
//! ## Common Functions
//!
//! **Building Sources:**
//! - [`from_iter(iter)`](build::from_iter) - Any Rust iterator
//! - [`try_from_iter(iter)`](build::try_from_iter) - An iterator of `Result`s, failing on the first `Err`
//! - [`from_fn(f)`](build::from_fn) - A closure returning `None` at the end
//!
//! **Consuming:**
//! - [`Enumerator::has_next`] / [`Enumerator::next`] - Cursor-style access
//! - [`Enumerator::to_vec`], [`Enumerator::fold`] - Drain the rest

pub mod build;
pub mod compose;
mod cursor;
mod enumerable;
mod error;
pub mod prelude;
mod replay;
pub mod share;
mod source;
mod stage;
pub mod stages;
mod step;

pub use cursor::*;
pub use enumerable::*;
pub use error::*;
pub use replay::*;
pub use share::{Mode, ShareConfig, Shareable, SharingCursor};
pub use source::*;
pub use stage::*;
pub use step::*;
