//! Application layer: use-cases over the domain ports.
//!
//! Every operation takes the caller identity explicitly and runs the role
//! gate in [`access`] before touching a repository.

pub mod access;
pub mod identity;
pub mod organization;

pub use identity::{AuthResult, CredentialPolicy, UserService};
pub use organization::DepartmentService;
