//! Console state container and its transitions.
//!
//! Every mutation of the console's data goes through a named method here so
//! the controller and the views never write fields ad hoc.

use chrono::{DateTime, Local, Utc};

use super::forms::{DepartmentForm, EmployeeForm};
use crate::error::AppError;
use crate::models::{DepartmentDetail, DepartmentSummary, EmployeeSummary};

/// Maximum number of entries kept in the activity log.
const LOG_CAPACITY: usize = 100;

/// Kind of request a loading flag or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadDepartments,
    SelectDepartment,
    SaveDepartment,
    AddEmployee,
    RemoveEmployee,
}

impl Operation {
    pub fn describe(&self) -> &'static str {
        match self {
            Operation::LoadDepartments => "load departments",
            Operation::SelectDepartment => "load department",
            Operation::SaveDepartment => "save department",
            Operation::AddEmployee => "add employee",
            Operation::RemoveEmployee => "remove employee",
        }
    }
}

/// Outstanding request counts backing the loading flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Pending {
    departments: u32,
    department_submit: u32,
    employee_submit: u32,
    employee_remove: u32,
}

impl Pending {
    fn slot(&mut self, op: Operation) -> Option<&mut u32> {
        match op {
            Operation::LoadDepartments => Some(&mut self.departments),
            Operation::SaveDepartment => Some(&mut self.department_submit),
            Operation::AddEmployee => Some(&mut self.employee_submit),
            Operation::RemoveEmployee => Some(&mut self.employee_remove),
            Operation::SelectDepartment => None,
        }
    }
}

/// Log level for UI messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

/// Log entry for display in the UI.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub level: LogLevel,
}

/// All client-side state of the console.
#[derive(Debug, Default)]
pub struct ConsoleState {
    departments: Vec<DepartmentSummary>,
    selected: Option<DepartmentDetail>,
    pending: Pending,
    error: Option<AppError>,
    notice: Option<AppError>,
    activity: Vec<LogEntry>,
    pub department_form: DepartmentForm,
    pub employee_form: EmployeeForm,
}

impl ConsoleState {
    pub fn departments(&self) -> &[DepartmentSummary] {
        &self.departments
    }

    pub fn selected(&self) -> Option<&DepartmentDetail> {
        self.selected.as_ref()
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected.as_ref().map(|d| d.id)
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    /// Startup or settings problem; survives operations until dismissed.
    pub fn notice(&self) -> Option<&AppError> {
        self.notice.as_ref()
    }

    pub fn activity(&self) -> &[LogEntry] {
        &self.activity
    }

    pub fn is_loading_departments(&self) -> bool {
        self.pending.departments > 0
    }

    pub fn is_submitting_department(&self) -> bool {
        self.pending.department_submit > 0
    }

    pub fn is_submitting_employee(&self) -> bool {
        self.pending.employee_submit > 0
    }

    pub fn is_removing_employee(&self) -> bool {
        self.pending.employee_remove > 0
    }

    /// Mark a request as started: clears the last error and raises its flag.
    pub fn begin(&mut self, op: Operation) {
        self.error = None;
        if let Some(count) = self.pending.slot(op) {
            *count += 1;
        }
    }

    fn finish(&mut self, op: Operation) {
        if let Some(count) = self.pending.slot(op) {
            *count = count.saturating_sub(1);
        }
    }

    /// Record a failed request. Only the error and the loading flag change.
    pub fn fail(&mut self, op: Operation, error: AppError) {
        self.finish(op);
        self.log(LogLevel::Error, format!("Failed to {}: {error}", op.describe()));
        self.error = Some(error);
    }

    /// Reject form input locally; no request was issued.
    pub fn reject(&mut self, error: AppError) {
        self.log(LogLevel::Error, error.to_string());
        self.error = Some(error);
    }

    /// Show an error that did not come from a console operation.
    pub fn set_error(&mut self, error: AppError) {
        self.error = Some(error);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Show a problem outside any request, e.g. an unreadable config file.
    ///
    /// Unlike the operation error, starting a request does not clear it.
    pub fn set_notice(&mut self, notice: AppError) {
        self.log(LogLevel::Error, notice.to_string());
        self.notice = Some(notice);
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Replace the list. Returns the id to auto-select, if any.
    pub fn departments_loaded(&mut self, list: Vec<DepartmentSummary>) -> Option<i64> {
        self.finish(Operation::LoadDepartments);
        self.log(LogLevel::Info, format!("Loaded {} departments", list.len()));
        self.departments = list;

        let first = self.departments.first().map(|d| d.id);
        if first.is_none() {
            self.selected = None;
        }
        first
    }

    /// Replace the selected department wholesale.
    pub fn department_loaded(&mut self, detail: DepartmentDetail) {
        self.selected = Some(detail);
    }

    /// Insert a newly created department, keep the list sorted and select it.
    pub fn department_created(&mut self, detail: DepartmentDetail) {
        self.finish(Operation::SaveDepartment);
        self.log(LogLevel::Success, format!("Department '{}' created", detail.name));
        self.upsert_summary(DepartmentSummary::from(&detail));
        self.selected = Some(detail);
        self.department_form.reset();
    }

    /// Apply an edited department to the list and, if shown, the detail.
    pub fn department_updated(&mut self, detail: DepartmentDetail) {
        self.finish(Operation::SaveDepartment);
        self.log(LogLevel::Success, format!("Department '{}' updated", detail.name));
        self.upsert_summary(DepartmentSummary::from(&detail));
        if self.selected_id() == Some(detail.id) {
            self.selected = Some(detail);
        }
        self.department_form.reset();
    }

    /// Append a new employee to the roster and bump the department count.
    pub fn employee_added(&mut self, department_id: i64, employee: EmployeeSummary) {
        self.finish(Operation::AddEmployee);
        self.log(LogLevel::Success, format!("Employee '{}' added", employee.full_name()));

        let mut inserted = true;
        if let Some(selected) = self.selected.as_mut().filter(|d| d.id == department_id) {
            if let Some(existing) = selected.employees.iter_mut().find(|e| e.id == employee.id) {
                *existing = employee;
                inserted = false;
            } else {
                selected.employees.push(employee);
            }
        }
        if inserted {
            self.touch_summary(department_id, |count| count + 1);
        }
        self.employee_form.reset();
    }

    /// Drop an employee from the roster and decrement the department count.
    pub fn employee_removed(&mut self, department_id: i64, employee_id: i64) {
        self.finish(Operation::RemoveEmployee);

        let removed = match self.selected.as_mut().filter(|d| d.id == department_id) {
            Some(selected) => {
                let before = selected.employees.len();
                selected.employees.retain(|e| e.id != employee_id);
                selected.employees.len() < before
            }
            // Not displayed any more; the server confirmed the removal.
            None => true,
        };
        if removed {
            self.touch_summary(department_id, |count| count.saturating_sub(1));
        }
        self.log(LogLevel::Success, format!("Employee #{employee_id} removed"));
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.activity.push(LogEntry {
            timestamp: Local::now(),
            message: message.into(),
            level,
        });

        if self.activity.len() > LOG_CAPACITY {
            self.activity.remove(0);
        }
    }

    pub fn clear_log(&mut self) {
        self.activity.clear();
    }

    fn upsert_summary(&mut self, summary: DepartmentSummary) {
        match self.departments.iter_mut().find(|d| d.id == summary.id) {
            Some(existing) => *existing = summary,
            None => self.departments.push(summary),
        }
        self.departments
            .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    }

    fn touch_summary(&mut self, department_id: i64, update: impl FnOnce(u32) -> u32) {
        if let Some(summary) = self.departments.iter_mut().find(|d| d.id == department_id) {
            summary.employee_count = update(summary.employee_count);
            summary.updated_at = Utc::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmploymentStatus;

    fn summary(id: i64, name: &str, count: u32) -> DepartmentSummary {
        DepartmentSummary {
            id,
            name: name.to_string(),
            code: name[..3].to_uppercase(),
            head: None,
            location: None,
            annual_budget: None,
            employee_count: count,
            updated_at: Utc::now() - chrono::Duration::days(1),
        }
    }

    fn detail(id: i64, name: &str, employees: Vec<EmployeeSummary>) -> DepartmentDetail {
        DepartmentDetail {
            id,
            name: name.to_string(),
            code: name[..3].to_uppercase(),
            description: None,
            location: None,
            head: None,
            annual_budget: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            employees,
        }
    }

    fn employee(id: i64, first: &str) -> EmployeeSummary {
        EmployeeSummary {
            id,
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            email: format!("{}@example.com", first.to_lowercase()),
            job_title: None,
            status: EmploymentStatus::Active,
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_loaded_list_returns_first_for_selection() {
        let mut state = ConsoleState::default();
        state.begin(Operation::LoadDepartments);
        assert!(state.is_loading_departments());

        let next = state.departments_loaded(vec![summary(3, "Sales", 0), summary(1, "Admin", 2)]);
        assert_eq!(next, Some(3));
        assert!(!state.is_loading_departments());
        assert_eq!(state.departments().len(), 2);
    }

    #[test]
    fn test_empty_list_clears_selection() {
        let mut state = ConsoleState::default();
        state.department_loaded(detail(1, "Admin", Vec::new()));

        state.begin(Operation::LoadDepartments);
        assert_eq!(state.departments_loaded(Vec::new()), None);
        assert!(state.selected().is_none());
    }

    #[test]
    fn test_failure_only_touches_error_and_flag() {
        let mut state = ConsoleState::default();
        state.departments_loaded(vec![summary(1, "Admin", 2)]);
        state.department_loaded(detail(1, "Admin", vec![employee(1, "Jo"), employee(2, "Al")]));
        state.department_form.name = "Draft".to_string();

        state.begin(Operation::SaveDepartment);
        state.fail(Operation::SaveDepartment, AppError::validation("boom"));

        assert!(!state.is_submitting_department());
        assert_eq!(state.error().map(|e| e.to_string()).as_deref(), Some("boom"));
        assert_eq!(state.departments().len(), 1);
        assert_eq!(state.selected().unwrap().employees.len(), 2);
        assert_eq!(state.department_form.name, "Draft");
    }

    #[test]
    fn test_begin_clears_previous_error() {
        let mut state = ConsoleState::default();
        state.set_error(AppError::validation("old"));
        state.begin(Operation::SelectDepartment);
        assert!(state.error().is_none());
    }

    #[test]
    fn test_notice_survives_new_requests() {
        let mut state = ConsoleState::default();
        state.set_notice(AppError::config("bad config.toml"));

        state.begin(Operation::LoadDepartments);
        state.begin(Operation::SelectDepartment);
        assert_eq!(state.notice().map(|e| e.to_string()).as_deref(), Some("Config error: bad config.toml"));
        assert_eq!(state.activity().last().map(|e| e.level), Some(LogLevel::Error));

        state.dismiss_notice();
        assert!(state.notice().is_none());
    }

    #[test]
    fn test_overlapping_loads_keep_flag_until_last_settles() {
        let mut state = ConsoleState::default();
        state.begin(Operation::LoadDepartments);
        state.begin(Operation::LoadDepartments);

        state.departments_loaded(Vec::new());
        assert!(state.is_loading_departments());

        state.fail(Operation::LoadDepartments, AppError::Unreachable("refused".to_string()));
        assert!(!state.is_loading_departments());
    }

    #[test]
    fn test_created_department_sorted_and_selected_once() {
        let mut state = ConsoleState::default();
        state.departments_loaded(vec![summary(1, "Admin", 0), summary(2, "sales", 0)]);

        state.begin(Operation::SaveDepartment);
        state.department_created(detail(9, "Product Engineering", Vec::new()));
        state.department_created(detail(9, "Product Engineering", Vec::new()));

        let names: Vec<_> = state.departments().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Admin", "Product Engineering", "sales"]);
        assert_eq!(state.selected_id(), Some(9));
        assert!(!state.is_submitting_department());
    }

    #[test]
    fn test_updated_department_replaces_entry() {
        let mut state = ConsoleState::default();
        state.departments_loaded(vec![summary(1, "Admin", 0), summary(2, "Sales", 0)]);
        state.department_loaded(detail(2, "Sales", vec![employee(5, "Kim")]));

        state.department_updated(detail(2, "Accounts", vec![employee(5, "Kim")]));

        let names: Vec<_> = state.departments().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Accounts", "Admin"]);
        assert_eq!(state.departments()[0].employee_count, 1);
        assert_eq!(state.selected().unwrap().name, "Accounts");
    }

    #[test]
    fn test_employee_add_and_remove_track_count() {
        let mut state = ConsoleState::default();
        state.departments_loaded(vec![summary(1, "Admin", 1)]);
        state.department_loaded(detail(1, "Admin", vec![employee(1, "Jo")]));
        let before = state.departments()[0].updated_at;

        state.employee_form.first_name = "Ada".to_string();
        state.begin(Operation::AddEmployee);
        state.employee_added(1, employee(2, "Ada"));

        assert_eq!(state.selected().unwrap().employees.len(), 2);
        assert_eq!(state.departments()[0].employee_count, 2);
        assert!(state.departments()[0].updated_at > before);
        assert!(state.employee_form.first_name.is_empty());
        assert!(!state.is_submitting_employee());

        state.begin(Operation::RemoveEmployee);
        state.employee_removed(1, 1);
        assert_eq!(state.selected().unwrap().employees, vec![employee(2, "Ada")]);
        assert_eq!(state.departments()[0].employee_count, 1);
        assert!(!state.is_removing_employee());
    }

    #[test]
    fn test_remove_unknown_employee_is_noop_for_roster() {
        let mut state = ConsoleState::default();
        state.departments_loaded(vec![summary(1, "Admin", 1)]);
        state.department_loaded(detail(1, "Admin", vec![employee(1, "Jo")]));

        state.employee_removed(1, 42);
        assert_eq!(state.selected().unwrap().employees.len(), 1);
        assert_eq!(state.departments()[0].employee_count, 1);
    }

    #[test]
    fn test_count_never_goes_below_zero() {
        let mut state = ConsoleState::default();
        state.departments_loaded(vec![summary(1, "Admin", 0), summary(2, "Sales", 0)]);
        state.department_loaded(detail(2, "Sales", Vec::new()));

        // Department 1 is not displayed, so the decrement applies blindly.
        state.employee_removed(1, 7);
        assert_eq!(state.departments()[0].employee_count, 0);
    }

    #[test]
    fn test_add_to_department_no_longer_selected() {
        let mut state = ConsoleState::default();
        state.departments_loaded(vec![summary(1, "Admin", 0), summary(2, "Sales", 3)]);
        state.department_loaded(detail(1, "Admin", Vec::new()));

        state.employee_added(2, employee(8, "Max"));
        assert!(state.selected().unwrap().employees.is_empty());
        assert_eq!(state.departments()[1].employee_count, 4);
    }

    #[test]
    fn test_activity_log_is_bounded() {
        let mut state = ConsoleState::default();
        for i in 0..150 {
            state.log(LogLevel::Info, format!("entry {i}"));
        }
        assert_eq!(state.activity().len(), LOG_CAPACITY);
        assert_eq!(state.activity()[0].message, "entry 50");

        state.clear_log();
        assert!(state.activity().is_empty());
    }
}
