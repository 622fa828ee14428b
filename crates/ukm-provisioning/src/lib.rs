//! UKM Provisioning — the organization workflows.
//!
//! - [`ProvisioningService::create_organization`]: organization plus up to
//!   three role accounts, as a two-phase write.
//! - [`ProvisioningService::edit_organization`]: descriptive fields plus
//!   per-role email/password changes, failures isolated per role.
//! - [`RegistrationService::register`]: student self-registration with a
//!   best-effort member counter increment.
//!
//! None of these are transactional. The identity service and the document
//! store are separate systems, so every outcome type exposes the partial
//! state a failure leaves behind.

pub mod config;
pub mod create;
pub mod edit;
pub mod error;
pub mod registration;
pub mod service;

pub use config::{Faculty, RegistrationCatalog};
pub use create::{
    CreateOrganizationRequest, ProvisionReport, ProvisionedRole, ProvisioningOutcome,
    RoleAccountRequest,
};
pub use edit::{EditOrganizationRequest, EditOutcome, RoleEdit, RoleUpdateReport};
pub use error::{Collaborator, ProvisioningError, RoleFailure, RoleUpdateFailure, Step};
pub use registration::{
    CounterUpdate, Registration, RegistrationForm, RegistrationInput, RegistrationService,
};
pub use service::ProvisioningService;
