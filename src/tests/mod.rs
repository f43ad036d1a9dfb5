//! Crate-level test suites
//!
//! Everything here runs against the fakes in [`fakes`]; no API key or network
//! access is needed.

pub mod pipeline_tests;
