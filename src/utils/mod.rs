//! Shared helpers for sequence validation and manipulation.

pub mod nucleotide;
pub mod validation;
