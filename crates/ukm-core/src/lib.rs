//! UKM Core — domain models, error taxonomy and the collaborator traits
//! that the provisioning workflows are written against.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{UkmError, UkmResult};
