//! Constructors for physical sources
//!
//! These adapt ordinary Rust iterators and closures to the [`Source`](crate::Source)
//! contract. Each of them keeps answering `Complete` once it has completed.

mod iter;

pub use iter::{
    Empty, FromFn, IterSource, OnceValue, Repeat, TryIterSource, empty, from_fn, from_iter,
    once_value, repeat, try_from_iter,
};
