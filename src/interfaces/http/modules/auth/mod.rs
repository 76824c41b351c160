//! Authentication module: login, current identity, password change

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
