//! Per-galaxy fit tests
//!
//! Parameter recovery, fit statistics, the check routines and the wave models.

pub mod recovery;
pub mod routines;
pub mod statistics;
pub mod wave;
