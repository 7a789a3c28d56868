//! Employee DTOs for roster display and creation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employment status as encoded by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    #[default]
    Active,
    OnLeave,
    Inactive,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 3] = [Self::Active, Self::OnLeave, Self::Inactive];

    /// Get the display label for the status.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnLeave => "On Leave",
            Self::Inactive => "Inactive",
        }
    }
}

/// Employee as listed in a department roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_title: Option<String>,
    pub status: EmploymentStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl EmployeeSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// DTO for adding an employee to a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_title: Option<String>,
    pub status: EmploymentStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
