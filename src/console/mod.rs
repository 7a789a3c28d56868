//! Console controller: runs API requests and applies their results.
//!
//! Requests are spawned on the tokio runtime and report back over an
//! unbounded channel. The UI thread drains that channel once per frame in
//! [`Console::poll`], so every state transition happens on one thread, one
//! message at a time.

pub mod forms;
pub mod state;


use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::client::DepartmentApi;
use crate::error::{AppError, Result};
use crate::models::{DepartmentDetail, DepartmentSummary, EmployeeSummary};

pub use forms::{DepartmentForm, EmployeeForm};
pub use state::{ConsoleState, LogEntry, LogLevel, Operation};

/// Result of a finished request, sent from the task to the UI thread.
#[derive(Debug)]
pub enum ConsoleMessage {
    DepartmentsLoaded(Vec<DepartmentSummary>),
    DepartmentLoaded(DepartmentDetail),
    DepartmentCreated(DepartmentDetail),
    DepartmentUpdated(DepartmentDetail),
    EmployeeAdded {
        department_id: i64,
        employee: EmployeeSummary,
    },
    EmployeeRemoved {
        department_id: i64,
        employee_id: i64,
    },
    Failed {
        op: Operation,
        error: AppError,
    },
}

/// Controller owning the console state and the request plumbing.
pub struct Console {
    api: Arc<dyn DepartmentApi>,
    handle: Handle,
    tx: mpsc::UnboundedSender<ConsoleMessage>,
    rx: mpsc::UnboundedReceiver<ConsoleMessage>,
    in_flight: usize,
    resync_after_write: bool,
    state: ConsoleState,
}

impl Console {
    pub fn new(api: Arc<dyn DepartmentApi>, handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            handle,
            tx,
            rx,
            in_flight: 0,
            resync_after_write: false,
            state: ConsoleState::default(),
        }
    }

    /// Re-fetch the selected department after employee writes.
    pub fn with_resync_after_write(mut self, enabled: bool) -> Self {
        self.resync_after_write = enabled;
        self
    }

    pub fn set_resync_after_write(&mut self, enabled: bool) {
        self.resync_after_write = enabled;
    }

    /// Point the console at a different backend.
    ///
    /// Requests already in flight still report to this console.
    pub fn set_api(&mut self, api: Arc<dyn DepartmentApi>) {
        self.api = api;
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ConsoleState {
        &mut self.state
    }

    /// Number of requests whose result has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Fetch the department list and select its first entry.
    pub fn load_departments(&mut self) {
        info!("Loading departments");
        self.state.begin(Operation::LoadDepartments);
        let api = self.api.clone();
        self.spawn(Operation::LoadDepartments, async move {
            let list = api.list_departments().await?;
            Ok(ConsoleMessage::DepartmentsLoaded(list))
        });
    }

    /// Fetch one department's detail and roster.
    pub fn select_department(&mut self, id: i64) {
        info!("Selecting department {id}");
        self.state.begin(Operation::SelectDepartment);
        let api = self.api.clone();
        self.spawn(Operation::SelectDepartment, async move {
            let detail = api.get_department(id).await?;
            Ok(ConsoleMessage::DepartmentLoaded(detail))
        });
    }

    /// Submit the department form, creating or updating depending on its mode.
    pub fn submit_department_form(&mut self) {
        match self.state.department_form.editing {
            Some(id) => self.update_department(id),
            None => self.create_department(),
        }
    }

    /// Create a department from the department form.
    pub fn create_department(&mut self) {
        let request = match self.state.department_form.to_request() {
            Ok(request) => request,
            Err(e) => return self.state.reject(e),
        };

        info!("Creating department {}", request.code);
        self.state.begin(Operation::SaveDepartment);
        let api = self.api.clone();
        self.spawn(Operation::SaveDepartment, async move {
            let detail = api.create_department(&request).await?;
            Ok(ConsoleMessage::DepartmentCreated(detail))
        });
    }

    /// Save the department form over an existing department.
    pub fn update_department(&mut self, id: i64) {
        let request = match self.state.department_form.to_request() {
            Ok(request) => request,
            Err(e) => return self.state.reject(e),
        };

        info!("Updating department {id}");
        self.state.begin(Operation::SaveDepartment);
        let api = self.api.clone();
        self.spawn(Operation::SaveDepartment, async move {
            let detail = api.update_department(id, &request).await?;
            Ok(ConsoleMessage::DepartmentUpdated(detail))
        });
    }

    /// Open the department form in edit mode for the selected department.
    pub fn edit_selected_department(&mut self) {
        if let Some(form) = self.state.selected().map(DepartmentForm::edit) {
            self.state.department_form = form;
        }
    }

    /// Add an employee from the employee form to the selected department.
    pub fn add_employee(&mut self) {
        let Some(department_id) = self.state.selected_id() else {
            return;
        };
        let request = match self.state.employee_form.to_request() {
            Ok(request) => request,
            Err(e) => return self.state.reject(e),
        };

        info!("Adding employee {} to department {department_id}", request.email);
        self.state.begin(Operation::AddEmployee);
        let api = self.api.clone();
        self.spawn(Operation::AddEmployee, async move {
            let employee = api.add_employee(department_id, &request).await?;
            Ok(ConsoleMessage::EmployeeAdded {
                department_id,
                employee,
            })
        });
    }

    /// Remove an employee from the department whose roster it was picked from.
    ///
    /// The department is passed in rather than read from the selection, which
    /// may have moved on while a confirmation was pending.
    pub fn remove_employee(&mut self, department_id: i64, employee_id: i64) {
        if self.state.selected_id().is_none() {
            return;
        }

        info!("Removing employee {employee_id} from department {department_id}");
        self.state.begin(Operation::RemoveEmployee);
        let api = self.api.clone();
        self.spawn(Operation::RemoveEmployee, async move {
            api.remove_employee(department_id, employee_id).await?;
            Ok(ConsoleMessage::EmployeeRemoved {
                department_id,
                employee_id,
            })
        });
    }

    /// Apply every result that has arrived since the last poll.
    ///
    /// Returns `true` if any message was applied.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok(msg) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(msg);
            applied = true;
        }
        applied
    }

    fn spawn<F>(&mut self, op: Operation, request: F)
    where
        F: Future<Output = Result<ConsoleMessage>> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;

        self.handle.spawn(async move {
            let msg = match request.await {
                Ok(msg) => msg,
                Err(error) => ConsoleMessage::Failed { op, error },
            };
            let _ = tx.send(msg);
        });
    }

    fn apply(&mut self, msg: ConsoleMessage) {
        match msg {
            ConsoleMessage::DepartmentsLoaded(list) => {
                info!("Loaded {} departments", list.len());
                if let Some(first) = self.state.departments_loaded(list) {
                    self.select_department(first);
                }
            }
            ConsoleMessage::DepartmentLoaded(detail) => {
                info!("Loaded department {} ({} employees)", detail.id, detail.employees.len());
                self.state.department_loaded(detail);
            }
            ConsoleMessage::DepartmentCreated(detail) => {
                info!("Created department {}", detail.id);
                self.state.department_created(detail);
            }
            ConsoleMessage::DepartmentUpdated(detail) => {
                info!("Updated department {}", detail.id);
                self.state.department_updated(detail);
            }
            ConsoleMessage::EmployeeAdded {
                department_id,
                employee,
            } => {
                info!("Added employee {} to department {department_id}", employee.id);
                self.state.employee_added(department_id, employee);
                self.resync(department_id);
            }
            ConsoleMessage::EmployeeRemoved {
                department_id,
                employee_id,
            } => {
                info!("Removed employee {employee_id} from department {department_id}");
                self.state.employee_removed(department_id, employee_id);
                self.resync(department_id);
            }
            ConsoleMessage::Failed { op, error } => {
                warn!("Failed to {}: {error}", op.describe());
                self.state.fail(op, error);
            }
        }
    }

    fn resync(&mut self, department_id: i64) {
        if self.resync_after_write && self.state.selected_id() == Some(department_id) {
            self.select_department(department_id);
        }
    }

    /// Block until every in-flight request has been applied.
    #[cfg(test)]
    pub(crate) fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.handle.block_on(self.rx.recv()) {
                Some(msg) => {
                    self.in_flight -= 1;
                    self.apply(msg);
                }
                None => break,
            }
        }
    }
}
