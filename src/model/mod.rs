//! Model module - feature recipes, least squares, cross-validated comparison

pub mod evaluate;
pub mod ols;
pub mod recipe;

pub use evaluate::*;
pub use ols::*;
pub use recipe::*;
