//! Department aggregate
//!
//! Departments, their rosters, and the membership planning rules.

pub mod membership;
pub mod model;
pub mod repository;

mod dto;

pub use dto::{CreateDepartmentDto, DepartmentUpdateOutcome, UpdateDepartmentDto};
pub use membership::{plan_create, plan_update, reassert_user_memberships, MembershipPlan};
pub use model::{Department, DepartmentDetails, DepartmentRef, DepartmentStatus};
pub use repository::DepartmentRepository;
