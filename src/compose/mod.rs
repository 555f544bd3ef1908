//! Combining several sources into one.

mod chain;
mod choice;
mod zip;

pub use chain::{Chain, chain};
pub use choice::{Choice, choice, choice_with};
pub use zip::{Any, Both, Left, Right, Zip, ZipAll, ZipPolicy, zip, zip_all};
