//! Identity module: authentication and user management
//!
//! Contains the `UserService` which orchestrates all user-related
//! use-cases: login, account administration, profile updates, password changes.

pub mod service;

pub use service::{AuthResult, CredentialPolicy, UserService};
