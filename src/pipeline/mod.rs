//! Pipeline module - load, clean, explore, aggregate, split

pub mod aggregate;
pub mod clean;
pub mod explore;
pub mod loader;
pub mod split;

pub use aggregate::*;
pub use clean::*;
pub use explore::*;
pub use loader::*;
pub use split::*;
