//! Domain layer: users, departments, membership rules and repository ports.

pub mod department;
pub mod identity;
pub mod repositories;
pub mod user;

pub use department::{
    CreateDepartmentDto, Department, DepartmentDetails, DepartmentRef, DepartmentRepository,
    DepartmentStatus, DepartmentUpdateOutcome, UpdateDepartmentDto,
};
pub use identity::CallerIdentity;
pub use repositories::{DomainResult, RepositoryProvider};
pub use user::{
    CreateUserDto, NewUser, UpdateUserDto, User, UserChanges, UserDetails, UserFilter, UserRef,
    UserRepository, UserRole, UserStatus,
};

pub use crate::shared::DomainError;
