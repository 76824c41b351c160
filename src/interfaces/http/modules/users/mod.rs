//! Users module: account administration, profiles and the manager picker

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
