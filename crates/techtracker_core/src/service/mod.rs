//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate key-value persistence into use-case level APIs.
//! - Keep front ends decoupled from storage details.

pub mod preferences;
pub mod record_store;
pub mod stats;
pub mod transfer;
