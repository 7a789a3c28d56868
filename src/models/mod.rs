//! Data models for departments and employees as exchanged with the API.

pub mod department;
pub mod employee;

pub use department::{DepartmentDetail, DepartmentRequest, DepartmentSummary};
pub use employee::{EmployeeRequest, EmployeeSummary, EmploymentStatus};
