//! The stage variants a pipeline is built from.
//!
//! Each one implements [`Stage`](crate::Stage). The one-to-one stages (map,
//! inspect, take, skip, ...) hold at most one element, and so does
//! [`RepeatEach`]; [`FlatMap`] holds one
//! element plus the sub-source it is draining; [`Sorted`], [`Reversed`] and
//! [`Distinct`] hold the whole upstream.

mod drain;
mod filter;
mod flat_map;
mod limit;
mod map;
mod repeat;

pub use drain::{Dedup, Distinct, Drain, Reorder, Reverse, Reversed, SortBy, Sorted};
pub use filter::{And, Filter, Predicate};
pub use flat_map::FlatMap;
pub use limit::{Skip, SkipWhile, Take, TakeWhile};
pub use map::{IndexedMap, Inspect, Map};
pub use repeat::RepeatEach;
