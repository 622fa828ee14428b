//! Workflow error taxonomy.
//!
//! Collaborators report [`UkmError`]; the workflows classify those into
//! [`ProvisioningError`] together with the role and step that failed.

use std::fmt;

use thiserror::Error;
use ukm_core::error::UkmError;
use ukm_core::models::organization::SlotRole;
use uuid::Uuid;

/// External collaborator a call was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    IdentityService,
    DocumentStore,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IdentityService => "identity service",
            Self::DocumentStore => "document store",
        })
    }
}

/// Individual external call within a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Validate,
    LoadMemberAccount,
    CreateAccount,
    SendVerification,
    CreateMemberRecord,
    UpdateEmail,
    UpdatePassword,
    UpdateMemberRecord,
    UpdateContactEmail,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validate => "validate input",
            Self::LoadMemberAccount => "load member account",
            Self::CreateAccount => "create identity account",
            Self::SendVerification => "send verification email",
            Self::CreateMemberRecord => "create member account",
            Self::UpdateEmail => "update email",
            Self::UpdatePassword => "update password",
            Self::UpdateMemberRecord => "update member account",
            Self::UpdateContactEmail => "update slot contact email",
        })
    }
}

#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// Bad input, detected before any external call for the affected
    /// role or workflow.
    #[error("validation failed: {message}")]
    Validation {
        role: Option<SlotRole>,
        message: String,
    },

    #[error("email {email} is already registered")]
    DuplicateAccount { email: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// Creation stopped at `failed_role`; roles in `completed` remain
    /// provisioned and linked.
    #[error(
        "provisioning of organization {organization_id} stopped at {failed_role} \
         ({step}) after {} role(s): {cause}",
        completed.len()
    )]
    PartialProvisioning {
        organization_id: Uuid,
        completed: Vec<SlotRole>,
        failed_role: SlotRole,
        step: Step,
        cause: Box<ProvisioningError>,
    },

    /// Accounts were provisioned but could not be linked to the
    /// organization document.
    #[error("organization {organization_id} left without its role links: {cause}")]
    RolesNotLinked {
        organization_id: Uuid,
        accounts: Vec<Uuid>,
        cause: Box<ProvisioningError>,
    },

    /// Edit: one or more per-role updates failed while the rest applied.
    #[error("{} role update(s) failed for organization {organization_id}", failures.len())]
    PartialUpdate {
        organization_id: Uuid,
        failures: Vec<RoleUpdateFailure>,
    },

    #[error("{collaborator} error: {message}")]
    ExternalService {
        collaborator: Collaborator,
        message: String,
    },
}

impl ProvisioningError {
    pub(crate) fn validation(role: Option<SlotRole>, message: impl Into<String>) -> Self {
        Self::Validation {
            role,
            message: message.into(),
        }
    }

    /// Classify a collaborator error. `email` is the address involved in
    /// the call, used to name a duplicate account.
    pub(crate) fn classify(err: UkmError, collaborator: Collaborator, email: Option<&str>) -> Self {
        match err {
            UkmError::AlreadyExists { entity } => match (collaborator, email) {
                (Collaborator::IdentityService, Some(email)) => Self::DuplicateAccount {
                    email: email.to_string(),
                },
                _ => Self::ExternalService {
                    collaborator,
                    message: format!("{entity} already exists"),
                },
            },
            UkmError::NotFound { entity, id } => Self::NotFound { entity, id },
            UkmError::Validation { message } => Self::Validation {
                role: None,
                message,
            },
            other => Self::ExternalService {
                collaborator,
                message: other.to_string(),
            },
        }
    }

    pub(crate) fn identity(err: UkmError, email: Option<&str>) -> Self {
        Self::classify(err, Collaborator::IdentityService, email)
    }

    pub(crate) fn store(err: UkmError) -> Self {
        Self::classify(err, Collaborator::DocumentStore, None)
    }

    pub fn is_duplicate_account(&self) -> bool {
        matches!(self, Self::DuplicateAccount { .. })
    }
}

/// A failed call attributed to one role slot.
#[derive(Debug)]
pub struct RoleFailure {
    pub role: SlotRole,
    pub step: Step,
    /// Identity account created before the failure, if any. Such an
    /// account exists in the identity service without a linked slot.
    pub orphaned_account: Option<Uuid>,
    pub cause: ProvisioningError,
}

impl fmt::Display for RoleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.role, self.step, self.cause)
    }
}

/// Edit: one role's update that did not apply.
#[derive(Debug)]
pub struct RoleUpdateFailure {
    pub role: SlotRole,
    pub step: Step,
    pub cause: ProvisioningError,
}

impl fmt::Display for RoleUpdateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.role, self.step, self.cause)
    }
}
