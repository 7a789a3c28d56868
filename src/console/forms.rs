//! Form buffers for department and employee input.
//!
//! Fields are kept as the raw strings the user typed; conversion and the
//! input constraints happen when the form is turned into a request.

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{DepartmentDetail, DepartmentRequest, EmployeeRequest, EmploymentStatus};

/// Form state for creating or editing a department.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DepartmentForm {
    /// Id of the department being edited; `None` creates a new one.
    pub editing: Option<i64>,
    pub name: String,
    pub code: String,
    pub description: String,
    pub location: String,
    pub head: String,
    pub annual_budget: String,
}

impl DepartmentForm {
    /// Reset the form to default values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Create a form pre-filled for editing an existing department.
    pub fn edit(dept: &DepartmentDetail) -> Self {
        Self {
            editing: Some(dept.id),
            name: dept.name.clone(),
            code: dept.code.clone(),
            description: dept.description.clone().unwrap_or_default(),
            location: dept.location.clone().unwrap_or_default(),
            head: dept.head.clone().unwrap_or_default(),
            annual_budget: dept.annual_budget.map(|b| b.to_string()).unwrap_or_default(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Validate the input and build the request payload.
    pub fn to_request(&self) -> Result<DepartmentRequest> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Department name is required"));
        }
        let code = self.code.trim();
        if code.is_empty() {
            return Err(AppError::validation("Department code is required"));
        }

        Ok(DepartmentRequest {
            name: name.to_string(),
            code: code.to_uppercase(),
            description: optional(&self.description),
            location: optional(&self.location),
            head: optional(&self.head),
            annual_budget: parse_budget(&self.annual_budget)?,
        })
    }
}

/// Form state for adding an employee to the selected department.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_title: String,
    pub status: EmploymentStatus,
    pub start_date: String,
    pub end_date: String,
}

impl EmployeeForm {
    /// Reset the form to default values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validate the input and build the request payload.
    pub fn to_request(&self) -> Result<EmployeeRequest> {
        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            return Err(AppError::validation("First name is required"));
        }
        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            return Err(AppError::validation("Last name is required"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        if !looks_like_email(email) {
            return Err(AppError::validation("Email address is invalid"));
        }

        Ok(EmployeeRequest {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            job_title: optional(&self.job_title),
            status: self.status,
            start_date: parse_date_field("Start date", &self.start_date)?,
            end_date: parse_date_field("End date", &self.end_date)?,
        })
    }
}

/// Blank input becomes `None`, anything else is trimmed.
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_budget(input: &str) -> Result<Option<f64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let budget: f64 = input
        .replace(',', "")
        .parse()
        .map_err(|_| AppError::validation("Annual budget must be a number"))?;
    if !budget.is_finite() || budget < 0.0 {
        return Err(AppError::validation("Annual budget cannot be negative"));
    }
    Ok(Some(budget))
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn parse_date_field(label: &str, input: &str) -> Result<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_flexible_date(input)
        .map(Some)
        .ok_or_else(|| AppError::validation(format!("{label} must be a date (YYYY-MM-DD)")))
}

/// Parse date input flexibly, accepting multiple formats.
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    for fmt in &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn department_form(name: &str, code: &str) -> DepartmentForm {
        DepartmentForm {
            name: name.to_string(),
            code: code.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_department_requires_name_and_code() {
        assert!(department_form("", "ENG").to_request().is_err());
        assert!(department_form("Engineering", "  ").to_request().is_err());
        assert!(department_form("Engineering", "eng").to_request().is_ok());
    }

    #[test]
    fn test_department_request_conversion() {
        let mut form = department_form(" Product Engineering ", "eng");
        form.head = "Ada Lovelace".to_string();
        form.annual_budget = "2,500,000".to_string();

        let request = form.to_request().unwrap();
        assert_eq!(request.name, "Product Engineering");
        assert_eq!(request.code, "ENG");
        assert_eq!(request.head.as_deref(), Some("Ada Lovelace"));
        assert_eq!(request.description, None);
        assert_eq!(request.location, None);
        assert_eq!(request.annual_budget, Some(2_500_000.0));
    }

    #[test]
    fn test_budget_must_be_numeric_and_non_negative() {
        let mut form = department_form("Finance", "FIN");

        form.annual_budget = "lots".to_string();
        assert!(matches!(form.to_request(), Err(AppError::Validation(_))));

        form.annual_budget = "-5".to_string();
        assert!(matches!(form.to_request(), Err(AppError::Validation(_))));

        form.annual_budget = String::new();
        assert_eq!(form.to_request().unwrap().annual_budget, None);
    }

    #[test]
    fn test_edit_prefills_and_reset_clears() {
        let detail = DepartmentDetail {
            id: 4,
            name: "Operations".to_string(),
            code: "OPS".to_string(),
            description: Some("Keeps the lights on".to_string()),
            location: None,
            head: None,
            annual_budget: Some(120000.0),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            employees: Vec::new(),
        };
        let mut form = DepartmentForm::edit(&detail);
        assert_eq!(form.editing, Some(4));
        assert_eq!(form.annual_budget, "120000");
        assert_eq!(form.description, "Keeps the lights on");

        form.reset();
        assert_eq!(form, DepartmentForm::default());
        assert!(!form.is_editing());
    }

    #[test]
    fn test_employee_request_conversion() {
        let form = EmployeeForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            start_date: "2024/02/01".to_string(),
            ..Default::default()
        };
        let request = form.to_request().unwrap();
        assert_eq!(request.status, EmploymentStatus::Active);
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(request.end_date, None);
        assert_eq!(request.job_title, None);
    }

    #[test]
    fn test_employee_validation() {
        let valid = EmployeeForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            ..Default::default()
        };

        let mut form = valid.clone();
        form.last_name.clear();
        assert!(form.to_request().is_err());

        let mut form = valid.clone();
        form.email = "not-an-email".to_string();
        assert!(form.to_request().is_err());

        let mut form = valid.clone();
        form.end_date = "31/12/2024".to_string();
        assert!(form.to_request().is_err());

        assert!(valid.to_request().is_ok());
    }

    #[test]
    fn test_parse_flexible_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 25);
        assert_eq!(parse_flexible_date("2025-11-25"), expected);
        assert_eq!(parse_flexible_date("2025/11/25"), expected);
        assert_eq!(parse_flexible_date("2025.11.25"), expected);
        assert_eq!(parse_flexible_date(" "), None);
        assert_eq!(parse_flexible_date("25-11-2025"), None);
    }
}
