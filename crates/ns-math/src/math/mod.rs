//! Core math modules.

pub mod autofilt;
pub mod pnn;
pub mod tailprob;
