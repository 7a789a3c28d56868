//! Department DTOs for listing, detail and create/update operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::employee::EmployeeSummary;

/// Department row as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub head: Option<String>,
    pub location: Option<String>,
    pub annual_budget: Option<f64>,
    pub employee_count: u32,
    pub updated_at: DateTime<Utc>,
}

/// Full department record with its roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDetail {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub head: Option<String>,
    pub annual_budget: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub employees: Vec<EmployeeSummary>,
}

/// DTO for creating or updating a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRequest {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub head: Option<String>,
    pub annual_budget: Option<f64>,
}

impl From<&DepartmentDetail> for DepartmentSummary {
    fn from(detail: &DepartmentDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name.clone(),
            code: detail.code.clone(),
            head: detail.head.clone(),
            location: detail.location.clone(),
            annual_budget: detail.annual_budget,
            employee_count: detail.employees.len() as u32,
            updated_at: detail.updated_at,
        }
    }
}

impl DepartmentDetail {
    /// Budget formatted for display, `None` when unset or zero.
    pub fn budget_display(&self) -> Option<String> {
        self.annual_budget.filter(|b| *b != 0.0).map(format_currency)
    }
}

/// Format an amount as dollars with thousands separators.
///
/// Cents are kept when present, without trailing zeros (`$1,234.5`).
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let fraction = cents % 100;
    if fraction != 0 {
        let fraction = format!("{fraction:02}");
        grouped.push('.');
        grouped.push_str(fraction.trim_end_matches('0'));
    }

    if amount < 0.0 && cents != 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
