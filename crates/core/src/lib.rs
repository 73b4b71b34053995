//! Core business logic for Vatrec.
//!
//! This crate contains pure business logic with ZERO web dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `vat` - Validation and aggregation of transaction batches
//! - `import` - Turning JSON, CSV and normalized payloads into rows

pub mod import;
pub mod vat;
