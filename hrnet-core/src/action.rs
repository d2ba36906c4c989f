//! The closed table of supported operations.
//!
//! Requests name an operation with two free-form tokens, `manager` and
//! `action`. Both are normalized (ASCII case folded, separators dropped, a
//! trailing `manager`/`master` removed from the manager) and then looked up
//! in [`ACTIONS`]. Anything not in the table is unsupported.

use std::fmt;

/// A supported operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddDesignation,
    UpdateDesignation,
    RemoveDesignation,
    DesignationByCode,
    DesignationByTitle,
    AllDesignations,
    DesignationCount,
    AddEmployee,
    UpdateEmployee,
    RemoveEmployee,
    EmployeeById,
    EmployeesByName,
    AllEmployees,
    EmployeeCount,
}

pub const DESIGNATION_MANAGER: &str = "DesignationManager";
pub const EMPLOYEE_MANAGER: &str = "EmployeeManager";

/// Normalized manager token, normalized action token, operation.
const ACTIONS: &[(&str, &str, Action)] = &[
    ("designation", "add", Action::AddDesignation),
    ("designation", "update", Action::UpdateDesignation),
    ("designation", "remove", Action::RemoveDesignation),
    ("designation", "delete", Action::RemoveDesignation),
    ("designation", "getbycode", Action::DesignationByCode),
    ("designation", "bycode", Action::DesignationByCode),
    ("designation", "getbytitle", Action::DesignationByTitle),
    ("designation", "bytitle", Action::DesignationByTitle),
    ("designation", "getall", Action::AllDesignations),
    ("designation", "all", Action::AllDesignations),
    ("designation", "count", Action::DesignationCount),
    ("designation", "getcount", Action::DesignationCount),
    ("employee", "add", Action::AddEmployee),
    ("employee", "update", Action::UpdateEmployee),
    ("employee", "remove", Action::RemoveEmployee),
    ("employee", "delete", Action::RemoveEmployee),
    ("employee", "getbyid", Action::EmployeeById),
    ("employee", "byid", Action::EmployeeById),
    ("employee", "getbyname", Action::EmployeesByName),
    ("employee", "byname", Action::EmployeesByName),
    ("employee", "getall", Action::AllEmployees),
    ("employee", "all", Action::AllEmployees),
    ("employee", "count", Action::EmployeeCount),
    ("employee", "getcount", Action::EmployeeCount),
];

fn normalize(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn normalize_manager(token: &str) -> String {
    let mut manager = normalize(token);
    for suffix in ["manager", "master"] {
        if manager.len() > suffix.len() && manager.ends_with(suffix) {
            manager.truncate(manager.len() - suffix.len());
            break;
        }
    }
    manager
}

impl Action {
    /// Every operation, in table order.
    pub const ALL: [Action; 14] = [
        Action::AddDesignation,
        Action::UpdateDesignation,
        Action::RemoveDesignation,
        Action::DesignationByCode,
        Action::DesignationByTitle,
        Action::AllDesignations,
        Action::DesignationCount,
        Action::AddEmployee,
        Action::UpdateEmployee,
        Action::RemoveEmployee,
        Action::EmployeeById,
        Action::EmployeesByName,
        Action::AllEmployees,
        Action::EmployeeCount,
    ];

    /// Looks up the operation named by `manager` and `action`.
    pub fn parse(manager: &str, action: &str) -> Option<Self> {
        let manager = normalize_manager(manager);
        let action = normalize(action);
        ACTIONS
            .iter()
            .find(|(m, a, _)| *m == manager && *a == action)
            .map(|(_, _, op)| *op)
    }

    /// Canonical manager token sent by clients.
    pub fn manager(&self) -> &'static str {
        match self {
            Action::AddDesignation
            | Action::UpdateDesignation
            | Action::RemoveDesignation
            | Action::DesignationByCode
            | Action::DesignationByTitle
            | Action::AllDesignations
            | Action::DesignationCount => DESIGNATION_MANAGER,
            _ => EMPLOYEE_MANAGER,
        }
    }

    /// Canonical action token sent by clients.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddDesignation | Action::AddEmployee => "add",
            Action::UpdateDesignation | Action::UpdateEmployee => "update",
            Action::RemoveDesignation | Action::RemoveEmployee => "remove",
            Action::DesignationByCode => "getByCode",
            Action::DesignationByTitle => "getByTitle",
            Action::EmployeeById => "getById",
            Action::EmployeesByName => "getByName",
            Action::AllDesignations | Action::AllEmployees => "getall",
            Action::DesignationCount | Action::EmployeeCount => "count",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.manager(), self.name())
    }
}
