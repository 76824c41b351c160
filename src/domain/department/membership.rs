//! Membership planning for the member-of / manager-of relations.
//!
//! Pure set arithmetic; repositories apply the resulting plan inside one
//! transaction. Every plan keeps manager-of ⊆ member-of.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MembershipPlan {
    /// Replacement manager-of set
    pub managers: BTreeSet<i32>,
    /// Users to insert into member-of (idempotent)
    pub members_to_add: BTreeSet<i32>,
    /// Users to delete from member-of
    pub members_to_remove: BTreeSet<i32>,
    /// Previous managers absent from the new manager set
    pub removed_managers: BTreeSet<i32>,
}

impl MembershipPlan {
    /// Removed managers that stay on the roster because no explicit removal
    /// was requested for them.
    pub fn retained_members(&self) -> BTreeSet<i32> {
        self.removed_managers
            .difference(&self.members_to_remove)
            .copied()
            .collect()
    }

    /// Resulting member-of set when applied on top of `current`.
    pub fn apply_to(&self, current: &BTreeSet<i32>) -> BTreeSet<i32> {
        current
            .difference(&self.members_to_remove)
            .copied()
            .chain(self.members_to_add.iter().copied())
            .collect()
    }
}

/// New department: managers are unconditionally members too.
pub fn plan_create(manager_ids: &[i32], employee_ids: &[i32]) -> MembershipPlan {
    let managers: BTreeSet<i32> = manager_ids.iter().copied().collect();
    let members_to_add = managers
        .iter()
        .copied()
        .chain(employee_ids.iter().copied())
        .collect();

    MembershipPlan {
        managers,
        members_to_add,
        ..Default::default()
    }
}

/// Manager-set replacement on an existing department.
///
/// Nobody leaves member-of unless listed in `removals`, and a listed user
/// who is still in `new_managers` is re-asserted as a member.
pub fn plan_update(
    old_managers: &BTreeSet<i32>,
    new_managers: &[i32],
    removals: &[i32],
    additions: &[i32],
) -> MembershipPlan {
    let managers: BTreeSet<i32> = new_managers.iter().copied().collect();
    let removed_managers = old_managers.difference(&managers).copied().collect();
    let members_to_remove = removals
        .iter()
        .copied()
        .filter(|id| !managers.contains(id))
        .collect();
    let members_to_add = managers
        .iter()
        .copied()
        .chain(additions.iter().copied())
        .collect();

    MembershipPlan {
        managers,
        members_to_add,
        members_to_remove,
        removed_managers,
    }
}

/// Member-of set for a user after a direct assignment: the requested
/// departments plus every department the user manages.
pub fn reassert_user_memberships(requested: &[i32], managed: &BTreeSet<i32>) -> BTreeSet<i32> {
    requested
        .iter()
        .copied()
        .chain(managed.iter().copied())
        .collect()
}
