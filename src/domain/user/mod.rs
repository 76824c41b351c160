//! User aggregate
//!
//! Contains the User entity, DTOs, and repository interface.

pub mod model;
pub mod repository;

mod dto_create;
mod dto_get;
mod dto_update;

pub use model::{User, UserDetails, UserRef, UserRole, UserStatus};

pub use dto_create::{CreateUserDto, NewUser};
pub use dto_get::UserFilter;
pub use dto_update::{UpdateUserDto, UserChanges};

pub use repository::UserRepository;
