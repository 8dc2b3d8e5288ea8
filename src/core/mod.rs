//! Core data types for resistance determinant detection.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Contig`], [`Genome`]: The query assembly
//! - [`ReferenceAllele`]: A curated determinant sequence and its metadata
//! - [`Alignment`], [`Hit`]: Matcher output before and after threshold filtering
//! - [`ResolvedCall`], [`ResistanceProfile`], [`GenomeReport`]: Pipeline results
//! - [`MutationTarget`], [`PointMutation`]: Chromosomal point mutations
//! - [`AlleleId`], [`ResistanceClass`], [`Strand`]: Identifiers and taxonomy
//!
//! ## Coordinates
//!
//! All coordinates are zero-based and half-open. Query coordinates refer to
//! the forward strand of the contig even for reverse-strand hits.
//!
//! [`Contig`]: contig::Contig
//! [`Genome`]: contig::Genome
//! [`ReferenceAllele`]: allele::ReferenceAllele
//! [`Alignment`]: alignment::Alignment
//! [`Hit`]: alignment::Hit
//! [`ResolvedCall`]: report::ResolvedCall
//! [`ResistanceProfile`]: report::ResistanceProfile
//! [`GenomeReport`]: report::GenomeReport
//! [`MutationTarget`]: mutation::MutationTarget
//! [`PointMutation`]: report::PointMutation
//! [`AlleleId`]: types::AlleleId
//! [`ResistanceClass`]: types::ResistanceClass
//! [`Strand`]: types::Strand

pub mod alignment;
pub mod allele;
pub mod contig;
pub mod mutation;
pub mod report;
pub mod types;
