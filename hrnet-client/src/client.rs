//! High-level client API.

use crate::connection::{Connection, ConnectionConfig};
use crate::error::ClientError;
use hrnet_core::{registry, Action, Designation, Employee, Record};
use hrnet_protocol::{ListEnvelope, Primitive, Request, Response};

/// Typed client for the HR directory.
///
/// Each method is one round trip on its own connection. A response with
/// `success=false` surfaces as [`ClientError::Rejected`].
#[derive(Debug, Clone)]
pub struct HrClient {
    conn: Connection,
}

impl HrClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            conn: Connection::new(config),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    async fn request(&self, request: Request) -> Result<Response, ClientError> {
        let response = self.conn.call(&request).await?;
        accept(response)
    }

    async fn send_record<T: serde::Serialize>(
        &self,
        action: Action,
        record: &T,
    ) -> Result<(), ClientError> {
        let request = Request::with_payload(action.manager(), action.name(), record)?;
        self.request(request).await?;
        Ok(())
    }

    async fn send_int(&self, action: Action, value: i64) -> Result<Response, ClientError> {
        let document = Primitive::Int(value).encode()?;
        self.request(Request::with_document(action.manager(), action.name(), document))
            .await
    }

    async fn send_text(&self, action: Action, value: &str) -> Result<Response, ClientError> {
        let document = Primitive::from(value).encode()?;
        self.request(Request::with_document(action.manager(), action.name(), document))
            .await
    }

    async fn send_empty(&self, action: Action) -> Result<Response, ClientError> {
        self.request(Request::new(action.manager(), action.name()))
            .await
    }

    // =========================================================================
    // Designation operations
    // =========================================================================

    /// Adds a designation; its code must be zero.
    pub async fn add_designation(&self, designation: &Designation) -> Result<(), ClientError> {
        self.send_record(Action::AddDesignation, designation).await
    }

    pub async fn update_designation(&self, designation: &Designation) -> Result<(), ClientError> {
        self.send_record(Action::UpdateDesignation, designation)
            .await
    }

    pub async fn remove_designation(&self, code: i64) -> Result<(), ClientError> {
        self.send_int(Action::RemoveDesignation, code).await?;
        Ok(())
    }

    pub async fn designation_by_code(&self, code: i64) -> Result<Designation, ClientError> {
        let response = self.send_int(Action::DesignationByCode, code).await?;
        Ok(response.result_as()?)
    }

    pub async fn designation_by_title(&self, title: &str) -> Result<Designation, ClientError> {
        let response = self.send_text(Action::DesignationByTitle, title).await?;
        Ok(response.result_as()?)
    }

    /// Lists all designations ordered by code.
    pub async fn designations(&self) -> Result<Vec<Designation>, ClientError> {
        let response = self.send_empty(Action::AllDesignations).await?;
        decode_records(&response, Record::into_designation)
    }

    pub async fn designation_count(&self) -> Result<i64, ClientError> {
        let response = self.send_empty(Action::DesignationCount).await?;
        decode_count(&response)
    }

    // =========================================================================
    // Employee operations
    // =========================================================================

    /// Adds an employee; its id must be zero.
    pub async fn add_employee(&self, employee: &Employee) -> Result<(), ClientError> {
        self.send_record(Action::AddEmployee, employee).await
    }

    pub async fn update_employee(&self, employee: &Employee) -> Result<(), ClientError> {
        self.send_record(Action::UpdateEmployee, employee).await
    }

    pub async fn remove_employee(&self, emp_id: i64) -> Result<(), ClientError> {
        self.send_int(Action::RemoveEmployee, emp_id).await?;
        Ok(())
    }

    pub async fn employee_by_id(&self, emp_id: i64) -> Result<Employee, ClientError> {
        let response = self.send_int(Action::EmployeeById, emp_id).await?;
        Ok(response.result_as()?)
    }

    /// Finds employees by name, ignoring case.
    pub async fn employees_by_name(&self, name: &str) -> Result<Vec<Employee>, ClientError> {
        let response = self.send_text(Action::EmployeesByName, name).await?;
        decode_records(&response, Record::into_employee)
    }

    pub async fn employees(&self) -> Result<Vec<Employee>, ClientError> {
        let response = self.send_empty(Action::AllEmployees).await?;
        decode_records(&response, Record::into_employee)
    }

    pub async fn employee_count(&self) -> Result<i64, ClientError> {
        let response = self.send_empty(Action::EmployeeCount).await?;
        decode_count(&response)
    }
}

fn accept(response: Response) -> Result<Response, ClientError> {
    if response.is_success() {
        return Ok(response);
    }
    let info = response.error_info()?.unwrap_or_default();
    Err(ClientError::Rejected(info))
}

fn decode_records<T>(
    response: &Response,
    select: fn(Record) -> Option<T>,
) -> Result<Vec<T>, ClientError> {
    let list = ListEnvelope::decode(response.result_document())?;
    registry()
        .decode_list(&list)?
        .into_iter()
        .map(|record| {
            let tag = record.type_tag();
            select(record).ok_or_else(|| ClientError::UnexpectedRecord(tag.to_string()))
        })
        .collect()
}

fn decode_count(response: &Response) -> Result<i64, ClientError> {
    let value = Primitive::decode(response.result_document())?;
    value
        .as_int()
        .ok_or_else(|| ClientError::UnexpectedRecord(value.type_tag().to_string()))
}
