//! Integration tests for the halofit-rs library
//!
//! These tests run the library as a whole, from catalog text to compared
//! result tables.

// SPARC tables to result tables
pub mod sparc;

// Batches, scans and configuration files
pub mod batch;

// JSON round trips of configurations and results
pub mod serialization;

// The optimizer on plain least-squares problems
pub mod lm_optimization;
