//! In-memory HR directory.
//!
//! Holds the designation and employee tables behind a single lock so that
//! cross-table rules (an employee's designation must exist, a designation in
//! use cannot be removed) are checked and applied atomically.

use crate::designation::{Designation, MAX_TITLE_LEN};
use crate::employee::{DesignationLookup, Employee, MAX_NAME_LEN};
use crate::error::CoreError;
use hrnet_protocol::{FieldError, FieldErrors};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    designations: BTreeMap<i64, Designation>,
    employees: BTreeMap<i64, Employee>,
    last_code: i64,
    last_emp_id: i64,
}

impl Tables {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.designations
            .values()
            .any(|d| Some(d.code) != except && d.title.eq_ignore_ascii_case(title))
    }

    fn designation_in_use(&self, code: i64) -> bool {
        self.employees.values().any(|e| e.designation_code == code)
    }

    fn require_designation(&self, code: i64) -> Result<(), CoreError> {
        if self.designations.contains_key(&code) {
            return Ok(());
        }
        let mut fields = FieldErrors::new();
        fields.insert(
            "designation_code".into(),
            FieldError::invalid_value(format!("Invalid Designation Code : {}", code)),
        );
        Err(CoreError::Validation(fields))
    }
}

fn check_lookup_text(kind: &str, text: &str, max: usize) -> Result<(), CoreError> {
    let len = text.chars().count();
    if len == 0 || len > max {
        return Err(CoreError::InvalidArgument(format!(
            "The length of {} exceeds max limit, it should be greater than 0 and less than {}.",
            kind, max
        )));
    }
    Ok(())
}

/// Designation and employee tables, ordered by code and id.
#[derive(Debug, Default)]
pub struct HrDirectory {
    tables: RwLock<Tables>,
}

impl HrDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    // Designations

    /// Adds a designation; its code must be 0 and is assigned here.
    pub fn add_designation(&self, designation: Designation) -> Result<Designation, CoreError> {
        if designation.code != 0 {
            return Err(CoreError::InvalidArgument(
                "Designation Code must be assigned zero, as it is auto generated.".into(),
            ));
        }
        designation.validate()?;

        let mut tables = self.tables.write();
        if tables.title_taken(&designation.title, None) {
            return Err(CoreError::Conflict(format!(
                "{} already exists",
                designation.title
            )));
        }

        tables.last_code += 1;
        let stored = Designation::with_code(tables.last_code, designation.title);
        tables.designations.insert(stored.code, stored.clone());
        debug!(code = stored.code, title = %stored.title, "Designation added");
        Ok(stored)
    }

    /// Replaces the title of an existing designation.
    pub fn update_designation(&self, designation: Designation) -> Result<(), CoreError> {
        if designation.code <= 0 {
            return Err(CoreError::InvalidArgument(
                "Designation Code must not be assigned zero, it must already exist.".into(),
            ));
        }
        designation.validate()?;

        let mut tables = self.tables.write();
        if !tables.designations.contains_key(&designation.code) {
            return Err(CoreError::NotFound(format!(
                "Code : {} does not exists",
                designation.code
            )));
        }
        if tables.title_taken(&designation.title, Some(designation.code)) {
            return Err(CoreError::Conflict(format!(
                "{} already exists",
                designation.title
            )));
        }

        debug!(code = designation.code, title = %designation.title, "Designation updated");
        tables.designations.insert(designation.code, designation);
        Ok(())
    }

    /// Removes a designation no employee refers to.
    pub fn remove_designation(&self, code: i64) -> Result<(), CoreError> {
        if code <= 0 {
            return Err(CoreError::InvalidArgument(format!(
                "Invalid entry for code : {}",
                code
            )));
        }

        let mut tables = self.tables.write();
        if tables.designation_in_use(code) {
            return Err(CoreError::Conflict(format!(
                "The designation code : {}, cannot be deleted as employees exist against it",
                code
            )));
        }
        if tables.designations.remove(&code).is_none() {
            return Err(CoreError::NotFound(format!("Code : {} does not exists", code)));
        }
        debug!(code, "Designation removed");
        Ok(())
    }

    pub fn designation_by_code(&self, code: i64) -> Result<Designation, CoreError> {
        if code <= 0 {
            return Err(CoreError::InvalidArgument(format!("Invalid Code : {}", code)));
        }
        self.tables
            .read()
            .designations
            .get(&code)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Code : {} does not exists", code)))
    }

    /// Finds a designation by title, ignoring ASCII case.
    pub fn designation_by_title(&self, title: &str) -> Result<Designation, CoreError> {
        check_lookup_text("title", title, MAX_TITLE_LEN)?;
        self.tables
            .read()
            .designations
            .values()
            .find(|d| d.title.eq_ignore_ascii_case(title))
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Designation : {} does not exists", title)))
    }

    /// Returns all designations ordered by code.
    pub fn designations(&self) -> Vec<Designation> {
        self.tables.read().designations.values().cloned().collect()
    }

    pub fn designation_count(&self) -> usize {
        self.tables.read().designations.len()
    }

    // Employees

    /// Adds an employee; its id must be 0 and is assigned here.
    pub fn add_employee(&self, employee: Employee) -> Result<Employee, CoreError> {
        if employee.emp_id != 0 {
            return Err(CoreError::InvalidArgument(
                "Employee ID must be assigned zero, as it is auto generated.".into(),
            ));
        }

        let mut tables = self.tables.write();
        tables.require_designation(employee.designation_code)?;

        tables.last_emp_id += 1;
        let stored = Employee {
            emp_id: tables.last_emp_id,
            ..employee
        };
        tables.employees.insert(stored.emp_id, stored.clone());
        debug!(emp_id = stored.emp_id, "Employee added");
        Ok(stored)
    }

    /// Replaces an existing employee record.
    pub fn update_employee(&self, employee: Employee) -> Result<(), CoreError> {
        if employee.emp_id == 0 {
            return Err(CoreError::InvalidArgument(
                "Employee ID must not be assigned zero, it must already exist.".into(),
            ));
        }

        let mut tables = self.tables.write();
        if !tables.employees.contains_key(&employee.emp_id) {
            return Err(CoreError::NotFound(format!(
                "{} does not exists",
                employee.emp_id
            )));
        }
        tables.require_designation(employee.designation_code)?;

        debug!(emp_id = employee.emp_id, "Employee updated");
        tables.employees.insert(employee.emp_id, employee);
        Ok(())
    }

    pub fn remove_employee(&self, emp_id: i64) -> Result<(), CoreError> {
        if emp_id <= 0 {
            return Err(CoreError::InvalidArgument(format!(
                "Invalid entry for employee ID : {}",
                emp_id
            )));
        }
        if self.tables.write().employees.remove(&emp_id).is_none() {
            return Err(CoreError::NotFound(format!("{} does not exists", emp_id)));
        }
        debug!(emp_id, "Employee removed");
        Ok(())
    }

    pub fn employee_by_id(&self, emp_id: i64) -> Result<Employee, CoreError> {
        if emp_id <= 0 {
            return Err(CoreError::InvalidArgument(format!(
                "Invalid employee ID : {}",
                emp_id
            )));
        }
        self.tables
            .read()
            .employees
            .get(&emp_id)
            .cloned()
            .ok_or_else(|| {
                CoreError::NotFound(format!("Employee ID : {} does not exists", emp_id))
            })
    }

    /// Finds employees by name, ignoring ASCII case. An empty match is an error.
    pub fn employees_by_name(&self, name: &str) -> Result<Vec<Employee>, CoreError> {
        check_lookup_text("name", name, MAX_NAME_LEN)?;
        let found: Vec<_> = self
            .tables
            .read()
            .employees
            .values()
            .filter(|e| e.name.eq_ignore_ascii_case(name))
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(CoreError::NotFound(format!(
                "No Employee with the name : {}",
                name
            )));
        }
        Ok(found)
    }

    /// Returns all employees ordered by id.
    pub fn employees(&self) -> Vec<Employee> {
        self.tables.read().employees.values().cloned().collect()
    }

    pub fn employee_count(&self) -> usize {
        self.tables.read().employees.len()
    }
}

impl DesignationLookup for HrDirectory {
    fn designation_exists(&self, code: i64) -> Result<bool, CoreError> {
        Ok(self.tables.read().designations.contains_key(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::Gender;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::thread;

    fn employee(name: &str, designation_code: i64) -> Employee {
        let mut e = Employee {
            emp_id: 0,
            name: name.into(),
            designation_code,
            date: 0,
            month: 0,
            year: 0,
            salary: 30000.0,
            gender: Gender::Female,
            indian: true,
            pan_no: "ABCDE1234F".into(),
            aadhar: "1234567890".into(),
            dob: None,
        };
        e.set_birth_date(NaiveDate::from_ymd_opt(1992, 3, 4).unwrap());
        e
    }

    #[test]
    fn test_add_designation_assigns_codes() {
        let dir = HrDirectory::new();
        let a = dir.add_designation(Designation::new("Carpenter")).unwrap();
        let b = dir.add_designation(Designation::new("Clerk")).unwrap();
        assert_eq!(a.code, 1);
        assert_eq!(b.code, 2);
        assert_eq!(dir.designation_count(), 2);
    }

    #[test]
    fn test_add_designation_rejects_preset_code() {
        let dir = HrDirectory::new();
        let err = dir
            .add_designation(Designation::with_code(5, "Clerk"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_typed_designation_is_validated() {
        let dir = HrDirectory::new();
        let err = dir.add_designation(Designation::new("")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref e) if e.contains_key("title")));
        assert_eq!(dir.designation_count(), 0);

        let clerk = dir.add_designation(Designation::new("Clerk")).unwrap();
        let err = dir
            .update_designation(Designation::with_code(clerk.code, "x".repeat(36)))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(dir.designation_by_code(clerk.code).unwrap().title, "Clerk");
    }

    #[test]
    fn test_duplicate_title_case_insensitive() {
        let dir = HrDirectory::new();
        dir.add_designation(Designation::new("Carpenter")).unwrap();
        let err = dir.add_designation(Designation::new("CARPENTER")).unwrap_err();
        assert_eq!(err.to_string(), "CARPENTER already exists");
    }

    #[test]
    fn test_update_designation() {
        let dir = HrDirectory::new();
        let d = dir.add_designation(Designation::new("Clerk")).unwrap();
        dir.update_designation(Designation::with_code(d.code, "Senior Clerk"))
            .unwrap();
        assert_eq!(dir.designation_by_code(d.code).unwrap().title, "Senior Clerk");

        let err = dir
            .update_designation(Designation::with_code(9, "Nobody"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Code : 9 does not exists");
    }

    #[test]
    fn test_remove_designation_in_use() {
        let dir = HrDirectory::new();
        let d = dir.add_designation(Designation::new("Clerk")).unwrap();
        let e = dir.add_employee(employee("Asha", d.code)).unwrap();

        let err = dir.remove_designation(d.code).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        dir.remove_employee(e.emp_id).unwrap();
        dir.remove_designation(d.code).unwrap();
        assert_eq!(dir.designation_count(), 0);
    }

    #[test]
    fn test_remove_designation_bad_code() {
        let dir = HrDirectory::new();
        assert!(matches!(
            dir.remove_designation(0),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(dir.remove_designation(3), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn test_designation_by_title() {
        let dir = HrDirectory::new();
        dir.add_designation(Designation::new("Carpenter")).unwrap();
        assert_eq!(dir.designation_by_title("carpenter").unwrap().code, 1);
        assert_eq!(
            dir.designation_by_title("Plumber").unwrap_err().to_string(),
            "Designation : Plumber does not exists"
        );
        assert!(matches!(
            dir.designation_by_title(""),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_designations_ordered() {
        let dir = HrDirectory::new();
        for title in ["Zeta", "Alpha", "Mid"] {
            dir.add_designation(Designation::new(title)).unwrap();
        }
        let codes: Vec<_> = dir.designations().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![1, 2, 3]);
    }

    #[test]
    fn test_add_employee_requires_designation() {
        let dir = HrDirectory::new();
        let err = dir.add_employee(employee("Asha", 4)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_employee_lifecycle() {
        let dir = HrDirectory::new();
        let d = dir.add_designation(Designation::new("Clerk")).unwrap();
        let added = dir.add_employee(employee("Asha", d.code)).unwrap();
        assert_eq!(added.emp_id, 1);

        let mut changed = added.clone();
        changed.salary = 35000.0;
        dir.update_employee(changed).unwrap();
        assert_eq!(dir.employee_by_id(1).unwrap().salary, 35000.0);

        dir.remove_employee(1).unwrap();
        assert_eq!(
            dir.employee_by_id(1).unwrap_err().to_string(),
            "Employee ID : 1 does not exists"
        );
        assert_eq!(dir.employee_count(), 0);
    }

    #[test]
    fn test_update_employee_requires_id() {
        let dir = HrDirectory::new();
        let err = dir.update_employee(employee("Asha", 1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));

        let mut ghost = employee("Asha", 1);
        ghost.emp_id = 42;
        assert_eq!(
            dir.update_employee(ghost).unwrap_err().to_string(),
            "42 does not exists"
        );
    }

    #[test]
    fn test_employees_by_name() {
        let dir = HrDirectory::new();
        let d = dir.add_designation(Designation::new("Clerk")).unwrap();
        dir.add_employee(employee("Asha", d.code)).unwrap();
        dir.add_employee(employee("asha", d.code)).unwrap();
        dir.add_employee(employee("Ravi", d.code)).unwrap();

        assert_eq!(dir.employees_by_name("ASHA").unwrap().len(), 2);
        assert_eq!(
            dir.employees_by_name("Meera").unwrap_err().to_string(),
            "No Employee with the name : Meera"
        );
        assert_eq!(dir.employees().len(), 3);
    }

    #[test]
    fn test_lookup_sees_designations() {
        let dir = HrDirectory::new();
        assert!(!dir.designation_exists(1).unwrap());
        dir.add_designation(Designation::new("Clerk")).unwrap();
        assert!(dir.designation_exists(1).unwrap());
    }

    #[test]
    fn test_concurrent_adds_get_unique_codes() {
        let dir = Arc::new(HrDirectory::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dir = Arc::clone(&dir);
                thread::spawn(move || {
                    dir.add_designation(Designation::new(format!("Title {}", i)))
                        .unwrap()
                        .code
                })
            })
            .collect();

        let mut codes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        codes.sort_unstable();
        assert_eq!(codes, (1..=8).collect::<Vec<_>>());
    }
}
