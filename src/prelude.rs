//! Commonly used imports
//!
//! Use `use enumerant::prelude::*;` for quick access to the most common types and functions.

// Core types
pub use crate::{Done, Enumerator, Error, Step};

// Traits
pub use crate::{Enumerable, Source, SourceExt, Stage};

// Most common constructors
pub use crate::build::{empty, from_fn, from_iter, once_value, repeat, try_from_iter};

// Composition
pub use crate::compose::{chain, choice, zip_all};

// Sharing and replay
pub use crate::{Cached, Mode, Once, ShareConfig, Shareable};
