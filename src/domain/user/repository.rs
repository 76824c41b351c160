use async_trait::async_trait;

use super::{NewUser, User, UserChanges, UserDetails, UserFilter, UserRole};
use crate::domain::DomainResult;

/// Credential store and user side of the membership relations.
///
/// Every mutating method runs in a single database transaction.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and its initial memberships.
    ///
    /// Fails with `Conflict` on a duplicate email and `NotFound` when the
    /// supervising manager or a department does not exist.
    async fn create_user(&self, user: NewUser) -> DomainResult<UserDetails>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn find_details(&self, id: i32) -> DomainResult<Option<UserDetails>>;

    async fn list_users(&self, filter: UserFilter) -> DomainResult<Vec<UserDetails>>;
    async fn list_by_role(&self, role: UserRole) -> DomainResult<Vec<User>>;
    async fn count_users(&self) -> DomainResult<u64>;

    /// Apply column changes and, when present, replace member-of while
    /// keeping every managed department in it.
    async fn update_user(&self, id: i32, changes: UserChanges) -> DomainResult<UserDetails>;

    async fn update_password(&self, id: i32, password_hash: &str) -> DomainResult<()>;

    /// Remove the user and every membership edge referencing it.
    /// Supervised users lose their manager reference.
    async fn delete_user(&self, id: i32) -> DomainResult<()>;
}
