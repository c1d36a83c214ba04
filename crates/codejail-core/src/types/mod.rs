//! Core types for codejail.

mod identifiers;

pub use identifiers::*;
