//! SurrealDB repository implementations.

mod member;
mod organization;

pub use member::SurrealMemberAccountRepository;
pub use organization::SurrealOrganizationRepository;
