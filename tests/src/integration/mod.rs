//! Integration suites

pub mod persistence;
pub mod scenario;
