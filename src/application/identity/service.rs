//! User management service: login, profiles and account administration
//!
//! All user-related business logic lives here.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::access::{require_admin, require_self_or_admin};
use crate::domain::{
    CallerIdentity, CreateUserDto, DomainError, DomainResult, NewUser, RepositoryProvider,
    UpdateUserDto, User, UserChanges, UserDetails, UserFilter, UserRole,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::shared::{normalize_email, normalize_optional, validate_input};

/// Minimum length accepted by `change_password`.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub identity: CallerIdentity,
}

/// How passwords are hashed and what new accounts start with.
#[derive(Debug, Clone)]
pub struct CredentialPolicy {
    pub bcrypt_cost: u32,
    /// Initial password of administrator-created accounts.
    pub default_password: String,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            default_password: "Password123#".to_string(),
        }
    }
}

/// User service: orchestrates authentication and account administration.
pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    policy: CredentialPolicy,
}

impl UserService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        jwt_config: JwtConfig,
        policy: CredentialPolicy,
    ) -> Self {
        Self {
            repos,
            jwt_config,
            policy,
        }
    }

    fn hash(&self, password: &str) -> DomainResult<String> {
        hash_password(password, self.policy.bcrypt_cost)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check credentials and return the stored identity.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<CallerIdentity> {
        let email = normalize_email(email);
        let outcome = self.check_credentials(&email, password).await;
        let label = match &outcome {
            Ok(_) => "success",
            Err(DomainError::NotFound { .. }) => "unknown_email",
            Err(DomainError::Forbidden(_)) => "rejected",
            Err(_) => "error",
        };
        metrics::counter!("auth_attempts_total", "outcome" => label).increment(1);
        outcome
    }

    async fn check_credentials(&self, email: &str, password: &str) -> DomainResult<CallerIdentity> {
        let Some(user) = self.repos.users().find_by_email(email).await? else {
            debug!(email, "Login for unknown email");
            return Err(DomainError::not_found("User", "email", email));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            warn!(user_id = user.id, "Login with incorrect password");
            return Err(DomainError::Forbidden("Incorrect password".into()));
        }

        if !user.is_active() {
            warn!(user_id = user.id, "Login to inactive account");
            return Err(DomainError::Forbidden("Account is inactive".into()));
        }

        Ok(CallerIdentity::from(&user))
    }

    /// Authenticate by email + password and return a signed bearer token.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let identity = self.authenticate(email, password).await?;

        let token = create_token(&identity, &self.jwt_config)
            .map_err(|e| DomainError::Storage(format!("Failed to create token: {}", e)))?;

        info!(user_id = identity.id, role = identity.role.as_str(), "User logged in");
        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            identity,
        })
    }

    // ── Queries ─────────────────────────────────────────────────

    /// The caller's own profile.
    pub async fn me(&self, caller: &CallerIdentity) -> DomainResult<UserDetails> {
        self.repos
            .users()
            .find_details(caller.id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", caller.id))
    }

    pub async fn list_users(
        &self,
        caller: &CallerIdentity,
        filter: UserFilter,
    ) -> DomainResult<Vec<UserDetails>> {
        require_admin(caller, "list_users")?;
        self.repos.users().list_users(filter).await
    }

    pub async fn get_user(&self, caller: &CallerIdentity, id: i32) -> DomainResult<UserDetails> {
        require_self_or_admin(caller, id, "get_user")?;
        self.repos
            .users()
            .find_details(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", id))
    }

    /// Users holding the Manager role, for manager pickers.
    pub async fn list_managers(&self, caller: &CallerIdentity) -> DomainResult<Vec<User>> {
        debug!(actor_id = caller.id, "Listing managers");
        self.repos.users().list_by_role(UserRole::Manager).await
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Create an account with the default initial password.
    pub async fn create_user(
        &self,
        caller: &CallerIdentity,
        dto: CreateUserDto,
    ) -> DomainResult<UserDetails> {
        require_admin(caller, "create_user")?;
        let dto = dto.normalized();
        validate_input(&dto)?;

        let new = NewUser {
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            password_hash: self.hash(&self.policy.default_password)?,
            role: dto.role,
            telephone: dto.telephone,
            manager_id: dto.manager_id,
            department_ids: dto.department_ids,
        };

        let created = self.repos.users().create_user(new).await?;
        info!(
            actor_id = caller.id,
            user_id = created.user.id,
            role = created.user.role.as_str(),
            "User created"
        );
        Ok(created)
    }

    /// Partial update. Owners may change their name and telephone; every
    /// other field needs an administrator.
    pub async fn update_user(
        &self,
        caller: &CallerIdentity,
        id: i32,
        dto: UpdateUserDto,
    ) -> DomainResult<UserDetails> {
        require_self_or_admin(caller, id, "update_user")?;

        let admin_fields = dto.admin_fields();
        if !caller.is_admin() && !admin_fields.is_empty() {
            warn!(actor_id = caller.id, fields = ?admin_fields, "Admin-only fields in self update");
            return Err(DomainError::Forbidden(format!(
                "Only administrators may change: {}",
                admin_fields.join(", ")
            )));
        }

        let dto = dto.normalized();
        validate_input(&dto)?;
        if dto.is_empty() {
            return Err(DomainError::validation("body", "no fields to update"));
        }
        if dto.clear_manager && dto.manager_id.is_some() {
            return Err(DomainError::validation(
                "managerId",
                "cannot set and clear the manager at once",
            ));
        }
        if dto.manager_id == Some(id) {
            return Err(DomainError::validation(
                "managerId",
                "a user cannot be their own manager",
            ));
        }

        let changes = UserChanges {
            first_name: dto.first_name,
            last_name: dto.last_name,
            telephone: dto.telephone.map(|t| normalize_optional(Some(t))),
            email: dto.email,
            role: dto.role,
            status: dto.status,
            manager_id: if dto.clear_manager {
                Some(None)
            } else {
                dto.manager_id.map(Some)
            },
            department_ids: dto.department_ids,
        };

        let updated = self.repos.users().update_user(id, changes).await?;
        info!(actor_id = caller.id, user_id = id, "User updated");
        Ok(updated)
    }

    /// Replace a user's member-of set. Departments the user manages stay.
    pub async fn assign_departments(
        &self,
        caller: &CallerIdentity,
        user_id: i32,
        department_ids: Vec<i32>,
    ) -> DomainResult<UserDetails> {
        require_admin(caller, "assign_departments")?;

        let changes = UserChanges {
            department_ids: Some(department_ids),
            ..Default::default()
        };
        let updated = self.repos.users().update_user(user_id, changes).await?;
        info!(
            actor_id = caller.id,
            user_id,
            departments = updated.departments.len(),
            "Departments assigned"
        );
        Ok(updated)
    }

    /// Change the caller's own password. Verifies the current password first.
    pub async fn change_password(
        &self,
        caller: &CallerIdentity,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(
                "newPassword",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }

        let user = self
            .repos
            .users()
            .find_by_id(caller.id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", caller.id))?;

        let valid = verify_password(current_password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Forbidden("Incorrect password".into()));
        }

        let new_hash = self.hash(new_password)?;
        self.repos.users().update_password(user.id, &new_hash).await?;

        info!(user_id = user.id, "Password changed");
        Ok(())
    }

    /// Delete a user by ID. Memberships go with it; departments stay.
    pub async fn delete_user(&self, caller: &CallerIdentity, id: i32) -> DomainResult<()> {
        require_admin(caller, "delete_user")?;
        if caller.is_self(id) {
            return Err(DomainError::validation(
                "id",
                "administrators cannot delete their own account",
            ));
        }
        self.repos.users().delete_user(id).await?;
        info!(actor_id = caller.id, user_id = id, "User deleted");
        Ok(())
    }

    // ── Bootstrap ───────────────────────────────────────────────

    /// Create the first administrator when the users table is empty.
    /// Returns `None` when users already exist.
    pub async fn bootstrap_admin(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<Option<User>> {
        if self.repos.users().count_users().await? > 0 {
            return Ok(None);
        }

        let new = NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: normalize_email(email),
            password_hash: self.hash(password)?,
            role: UserRole::Admin,
            telephone: None,
            manager_id: None,
            department_ids: Vec::new(),
        };
        let admin = self.repos.users().create_user(new).await?.user;
        Ok(Some(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreateDepartmentDto, UserStatus};
    use crate::infrastructure::crypto::jwt::verify_token;
    use crate::test_support::{memory_repos, seed_user, TEST_BCRYPT_COST};

    struct Fixture {
        repos: Arc<dyn RepositoryProvider>,
        service: UserService,
        admin: CallerIdentity,
    }

    impl Fixture {
        async fn new() -> Self {
            let repos = memory_repos().await;
            let service = UserService::new(
                repos.clone(),
                JwtConfig::default(),
                CredentialPolicy {
                    bcrypt_cost: TEST_BCRYPT_COST,
                    ..Default::default()
                },
            );
            let admin = seed_user(repos.as_ref(), "root@example.com", UserRole::Admin, "rootpass1").await;
            Self {
                repos,
                service,
                admin: CallerIdentity::from(&admin),
            }
        }

        async fn employee(&self, email: &str) -> CallerIdentity {
            let user = seed_user(self.repos.as_ref(), email, UserRole::Employee, "secret123").await;
            CallerIdentity::from(&user)
        }
    }

    fn create_dto(email: &str) -> CreateUserDto {
        CreateUserDto {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: email.into(),
            role: UserRole::Employee,
            telephone: None,
            manager_id: None,
            department_ids: vec![],
        }
    }

    #[tokio::test]
    async fn authenticate_outcomes() {
        let fx = Fixture::new().await;
        fx.employee("emp@example.com").await;

        let identity = fx
            .service
            .authenticate(" EMP@example.com ", "secret123")
            .await
            .unwrap();
        assert_eq!(identity.role, UserRole::Employee);

        assert!(matches!(
            fx.service.authenticate("emp@example.com", "wrong").await,
            Err(DomainError::Forbidden(msg)) if msg == "Incorrect password"
        ));
        assert!(matches!(
            fx.service.authenticate("ghost@example.com", "secret123").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn inactive_account_cannot_sign_in() {
        let fx = Fixture::new().await;
        let emp = fx.employee("emp@example.com").await;
        fx.service
            .update_user(
                &fx.admin,
                emp.id,
                UpdateUserDto {
                    status: Some(UserStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            fx.service.authenticate("emp@example.com", "secret123").await,
            Err(DomainError::Forbidden(msg)) if msg == "Account is inactive"
        ));
    }

    #[tokio::test]
    async fn login_issues_token_with_role() {
        let fx = Fixture::new().await;
        let result = fx.service.login("root@example.com", "rootpass1").await.unwrap();
        assert_eq!(result.token_type, "Bearer");
        assert_eq!(result.expires_in, 24 * 3600);

        let claims = verify_token(&result.token, &JwtConfig::default()).unwrap();
        assert_eq!(claims.identity(), Some(fx.admin.clone()));
    }

    #[tokio::test]
    async fn admin_creates_user_with_default_password() {
        let fx = Fixture::new().await;
        let created = fx
            .service
            .create_user(&fx.admin, create_dto("New.Hire@Example.com"))
            .await
            .unwrap();
        assert_eq!(created.user.email, "new.hire@example.com");

        let identity = fx
            .service
            .authenticate("new.hire@example.com", "Password123#")
            .await
            .unwrap();
        assert_eq!(identity.id, created.user.id);
    }

    #[tokio::test]
    async fn non_admin_cannot_create_users() {
        let fx = Fixture::new().await;
        let emp = fx.employee("emp@example.com").await;
        let before = fx.repos.users().count_users().await.unwrap();

        let err = fx
            .service
            .create_user(&emp, create_dto("x@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(fx.repos.users().count_users().await.unwrap(), before);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let fx = Fixture::new().await;
        fx.service
            .create_user(&fx.admin, create_dto("jane@example.com"))
            .await
            .unwrap();
        let err = fx
            .service
            .create_user(&fx.admin, create_dto(" JANE@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn padded_email_is_stored_normalized() {
        let fx = Fixture::new().await;
        let created = fx
            .service
            .create_user(&fx.admin, create_dto(" padded@example.com "))
            .await
            .unwrap();
        assert_eq!(created.user.email, "padded@example.com");
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let fx = Fixture::new().await;
        let before = fx.repos.users().count_users().await.unwrap();
        let mut dto = create_dto("blank@example.com");
        dto.first_name = "   ".into();
        let err = fx.service.create_user(&fx.admin, dto).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { field, .. } if field == "firstName"));
        assert_eq!(fx.repos.users().count_users().await.unwrap(), before);

        let emp = fx.employee("emp@example.com").await;
        let err = fx
            .service
            .update_user(
                &emp,
                emp.id,
                UpdateUserDto {
                    last_name: Some(" \t ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field, .. } if field == "lastName"));
    }

    #[tokio::test]
    async fn invalid_email_is_validation_error() {
        let fx = Fixture::new().await;
        let err = fx
            .service
            .create_user(&fx.admin, create_dto("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn self_update_limited_to_profile_fields() {
        let fx = Fixture::new().await;
        let emp = fx.employee("emp@example.com").await;

        let updated = fx
            .service
            .update_user(
                &emp,
                emp.id,
                UpdateUserDto {
                    first_name: Some("  Ana ".into()),
                    telephone: Some("0723 111".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.user.first_name, "Ana");
        assert_eq!(updated.user.telephone.as_deref(), Some("0723 111"));

        let err = fx
            .service
            .update_user(
                &emp,
                emp.id,
                UpdateUserDto {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        let stored = fx.repos.users().find_by_id(emp.id).await.unwrap().unwrap();
        assert_eq!(stored.role, UserRole::Employee);
    }

    #[tokio::test]
    async fn users_cannot_read_each_other() {
        let fx = Fixture::new().await;
        let a = fx.employee("a@example.com").await;
        let b = fx.employee("b@example.com").await;

        assert!(fx.service.get_user(&a, a.id).await.is_ok());
        assert!(matches!(
            fx.service.get_user(&a, b.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(fx.service.get_user(&fx.admin, b.id).await.is_ok());
        assert!(matches!(
            fx.service.list_users(&a, UserFilter::default()).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn assign_departments_keeps_managed_ones() {
        let fx = Fixture::new().await;
        let emp = fx.employee("emp@example.com").await;
        let managed = fx
            .repos
            .departments()
            .create(CreateDepartmentDto {
                name: "Finance".into(),
                manager_ids: vec![emp.id],
                employee_ids: vec![],
            })
            .await
            .unwrap()
            .department;

        let details = fx
            .service
            .assign_departments(&fx.admin, emp.id, vec![])
            .await
            .unwrap();
        assert_eq!(details.departments.len(), 1);
        assert_eq!(details.departments[0].id, managed.id);

        assert!(matches!(
            fx.service.assign_departments(&emp, emp.id, vec![]).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn change_password_requires_current() {
        let fx = Fixture::new().await;
        let emp = fx.employee("emp@example.com").await;

        assert!(matches!(
            fx.service.change_password(&emp, "wrong", "brand-new-pass").await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            fx.service.change_password(&emp, "secret123", "short").await,
            Err(DomainError::Validation { .. })
        ));

        fx.service
            .change_password(&emp, "secret123", "brand-new-pass")
            .await
            .unwrap();
        assert!(fx
            .service
            .authenticate("emp@example.com", "brand-new-pass")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn delete_user_rules() {
        let fx = Fixture::new().await;
        let emp = fx.employee("emp@example.com").await;

        assert!(matches!(
            fx.service.delete_user(&emp, fx.admin.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            fx.service.delete_user(&fx.admin, fx.admin.id).await,
            Err(DomainError::Validation { .. })
        ));

        fx.service.delete_user(&fx.admin, emp.id).await.unwrap();
        assert!(fx.repos.users().find_by_id(emp.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn managers_listing_filters_by_role() {
        let fx = Fixture::new().await;
        let emp = fx.employee("emp@example.com").await;
        seed_user(fx.repos.as_ref(), "zed@example.com", UserRole::Manager, "secret123").await;
        seed_user(fx.repos.as_ref(), "amy@example.com", UserRole::Manager, "secret123").await;

        let managers = fx.service.list_managers(&emp).await.unwrap();
        let names: Vec<_> = managers.iter().map(|m| m.first_name.as_str()).collect();
        assert_eq!(names, vec!["amy", "zed"]);
    }

    #[tokio::test]
    async fn bootstrap_runs_only_on_empty_table() {
        let repos = memory_repos().await;
        let service = UserService::new(
            repos.clone(),
            JwtConfig::default(),
            CredentialPolicy {
                bcrypt_cost: TEST_BCRYPT_COST,
                ..Default::default()
            },
        );

        let admin = service
            .bootstrap_admin("System", "Administrator", "Admin@Example.com", "admin123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(admin.email, "admin@example.com");

        let again = service
            .bootstrap_admin("System", "Administrator", "other@example.com", "admin123")
            .await
            .unwrap();
        assert!(again.is_none());
    }
}
