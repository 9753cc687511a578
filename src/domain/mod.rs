//! Pure listing data types. No I/O, no session logic.

pub mod common;
pub mod listing;
pub mod poi;

pub use common::*;
pub use listing::*;
pub use poi::*;
