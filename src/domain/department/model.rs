//! Department domain entity

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserRef;

/// Department status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DepartmentStatus {
    Active,
    Inactive,
}

impl DepartmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl Default for DepartmentStatus {
    fn default() -> Self {
        Self::Active
    }
}

#[derive(Clone, Debug)]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub status: DepartmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight reference used in user profiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepartmentRef {
    pub id: i32,
    pub name: String,
}

impl From<&Department> for DepartmentRef {
    fn from(d: &Department) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
        }
    }
}

/// A department with its roster.
#[derive(Clone, Debug)]
pub struct DepartmentDetails {
    pub department: Department,
    pub members: Vec<UserRef>,
    pub managers: Vec<UserRef>,
}

impl DepartmentDetails {
    pub fn member_ids(&self) -> BTreeSet<i32> {
        self.members.iter().map(|u| u.id).collect()
    }

    pub fn manager_ids(&self) -> BTreeSet<i32> {
        self.managers.iter().map(|u| u.id).collect()
    }

    /// manager-of ⊆ member-of
    pub fn managers_are_members(&self) -> bool {
        self.manager_ids().is_subset(&self.member_ids())
    }

    /// "First Last, First Last" or "N/A", as shown in department listings.
    pub fn manager_names(&self) -> String {
        if self.managers.is_empty() {
            return "N/A".to_string();
        }
        self.managers
            .iter()
            .map(|m| format!("{} {}", m.first_name, m.last_name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, first: &str) -> UserRef {
        UserRef {
            id,
            first_name: first.into(),
            last_name: "Doe".into(),
        }
    }

    fn details(members: Vec<UserRef>, managers: Vec<UserRef>) -> DepartmentDetails {
        DepartmentDetails {
            department: Department {
                id: 1,
                name: "Finance".into(),
                status: DepartmentStatus::Active,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            members,
            managers,
        }
    }

    #[test]
    fn subset_check_detects_stray_manager() {
        let ok = details(vec![user(1, "A"), user(2, "B")], vec![user(1, "A")]);
        assert!(ok.managers_are_members());

        let broken = details(vec![user(2, "B")], vec![user(1, "A")]);
        assert!(!broken.managers_are_members());
    }

    #[test]
    fn manager_names_for_listing() {
        let d = details(vec![user(1, "Ann")], vec![user(1, "Ann")]);
        assert_eq!(d.manager_names(), "Ann Doe");
        assert_eq!(details(vec![], vec![]).manager_names(), "N/A");
    }
}
