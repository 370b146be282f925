//! Domain models for the health tracker.

mod history;
mod patient;
mod report;
mod test_result;

pub use history::*;
pub use patient::*;
pub use report::*;
pub use test_result::*;
