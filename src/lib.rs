//! # HR Admin
//!
//! User, role and department administration service with a JWT-secured
//! REST API.
//!
//! ## Architecture
//!
//! - **domain**: entities, membership rules and repository ports
//! - **application**: use cases with role-based access checks
//! - **infrastructure**: SeaORM storage, migrations, password hashing and JWT
//! - **interfaces**: axum REST API with Swagger documentation
//! - **server**: process lifecycle shared by binaries

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

#[cfg(test)]
mod test_support;

pub use config::{default_config_path, resolve_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::http::{create_api_router, ApiContext};
