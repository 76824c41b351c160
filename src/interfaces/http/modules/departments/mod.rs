//! Departments module: department CRUD, rosters and status

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
