//! Role gate applied at the top of every core operation, before any data
//! access.

use tracing::warn;

use crate::domain::{CallerIdentity, DomainError, DomainResult};

fn deny(caller: &CallerIdentity, operation: &'static str, message: &str) -> DomainError {
    warn!(
        actor_id = caller.id,
        role = caller.role.as_str(),
        operation,
        "Access denied"
    );
    metrics::counter!("access_denied_total", "operation" => operation).increment(1);
    DomainError::Forbidden(message.to_string())
}

/// Admin-only operations.
pub fn require_admin(caller: &CallerIdentity, operation: &'static str) -> DomainResult<()> {
    if caller.is_admin() {
        return Ok(());
    }
    Err(deny(caller, operation, "Administrator role required"))
}

/// Operations on a user record that its owner may also perform.
pub fn require_self_or_admin(
    caller: &CallerIdentity,
    user_id: i32,
    operation: &'static str,
) -> DomainResult<()> {
    if caller.is_admin() || caller.is_self(user_id) {
        return Ok(());
    }
    Err(deny(caller, operation, "Not allowed to access another user's record"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    fn caller(id: i32, role: UserRole) -> CallerIdentity {
        CallerIdentity {
            id,
            role,
            first_name: "T".into(),
            last_name: "User".into(),
        }
    }

    #[test]
    fn only_admins_pass_admin_gate() {
        assert!(require_admin(&caller(1, UserRole::Admin), "op").is_ok());
        for role in [UserRole::Manager, UserRole::Employee] {
            assert!(matches!(
                require_admin(&caller(1, role), "op"),
                Err(DomainError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn self_or_admin_gate() {
        assert!(require_self_or_admin(&caller(3, UserRole::Employee), 3, "op").is_ok());
        assert!(require_self_or_admin(&caller(1, UserRole::Admin), 3, "op").is_ok());
        assert!(require_self_or_admin(&caller(2, UserRole::Manager), 3, "op").is_err());
    }
}
