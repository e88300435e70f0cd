//! Domain model for tracked technologies.
//!
//! # Responsibility
//! - Define the canonical technology record and its lifecycle status.
//! - Own field-level validation rules shared by create/update/import paths.
//!
//! # Invariants
//! - Every record is identified by a stable integer `TechId`.
//! - `status` is always one of the three lifecycle values.

pub mod technology;
pub mod validation;
