//! Domain models for UKM.
//!
//! These are the core types shared across all crates.

pub mod identity;
pub mod member;
pub mod organization;
