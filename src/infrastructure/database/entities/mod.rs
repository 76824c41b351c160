//! Database entities module

pub mod department;
pub mod department_manager;
pub mod user;
pub mod user_department;

pub use department::Entity as Department;
pub use department_manager::Entity as DepartmentManager;
pub use user::Entity as User;
pub use user_department::Entity as UserDepartment;
