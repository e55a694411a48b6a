//! Velostat: Bike-Share Demand Analysis Library
//!
//! A library for cleaning and aggregating hourly bike-rental logs,
//! exploring them, and comparing linear-regression feature recipes
//! via cross-validation.

pub mod cli;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod utils;
