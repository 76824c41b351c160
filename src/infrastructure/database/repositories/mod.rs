//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod department_repository;
pub mod repository_provider;
pub mod user_repository;

mod relations;

pub use department_repository::SeaOrmDepartmentRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use user_repository::SeaOrmUserRepository;
