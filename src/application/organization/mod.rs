//! Organization module: departments and their rosters

pub mod service;

pub use service::DepartmentService;
