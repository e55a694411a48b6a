//! Report module - tables, charts, exports, and the run summary

pub mod charts;
pub mod export;
pub mod summary;
pub mod tables;

pub use charts::*;
pub use export::*;
pub use summary::RunSummary;
pub use tables::*;
