//! Fixtures shared by the unit tests: a migrated in-memory database and
//! canned users.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use crate::domain::{NewUser, RepositoryProvider, User, UserRole};
use crate::infrastructure::crypto::password::hash_password;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

/// Lowest bcrypt cost; keeps hashing out of the test runtime.
pub const TEST_BCRYPT_COST: u32 = 4;

pub async fn memory_db() -> DatabaseConnection {
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub async fn memory_repos() -> Arc<dyn RepositoryProvider> {
    Arc::new(SeaOrmRepositoryProvider::new(memory_db().await))
}

/// A `NewUser` named after the local part of `email`, without a usable password.
pub fn new_user(email: &str, role: UserRole) -> NewUser {
    let name = email.split('@').next().unwrap_or(email).to_string();
    NewUser {
        first_name: name,
        last_name: "Test".to_string(),
        email: email.to_string(),
        password_hash: "!".to_string(),
        role,
        telephone: None,
        manager_id: None,
        department_ids: Vec::new(),
    }
}

/// Insert a user whose password is `password`.
pub async fn seed_user(
    repos: &dyn RepositoryProvider,
    email: &str,
    role: UserRole,
    password: &str,
) -> User {
    let mut new = new_user(email, role);
    new.password_hash = hash_password(password, TEST_BCRYPT_COST).expect("hash");
    repos.users().create_user(new).await.expect("seed user").user
}
