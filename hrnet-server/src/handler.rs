//! Request handlers.
//!
//! The dispatcher hands every decoded request to a [`RequestHandler`] and
//! writes back whatever it returns. Handlers never fail across that
//! boundary: validation and application errors travel as data inside the
//! response.

use hrnet_core::{Action, CoreError, Designation, Employee, HrDirectory};
use hrnet_protocol::{ListEnvelope, Primitive, Request, Response};
use std::sync::Arc;
use tracing::debug;

/// Business logic invoked once per connection.
///
/// Handlers run on the blocking thread pool, so they may block.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, request: Request) -> Response;
}

impl<F> RequestHandler for F
where
    F: Fn(Request) -> Response + Send + Sync + 'static,
{
    fn handle(&self, request: Request) -> Response {
        self(request)
    }
}

/// Handler serving the HR directory.
#[derive(Debug, Clone)]
pub struct HrHandler {
    directory: Arc<HrDirectory>,
}

impl HrHandler {
    pub fn new(directory: Arc<HrDirectory>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &Arc<HrDirectory> {
        &self.directory
    }

    fn execute(&self, action: Action, payload: &str) -> Result<Response, CoreError> {
        let dir = &*self.directory;
        let response = match action {
            Action::AddDesignation => {
                dir.add_designation(Designation::from_document(payload)?)?;
                Response::ok()
            }
            Action::UpdateDesignation => {
                dir.update_designation(Designation::from_document(payload)?)?;
                Response::ok()
            }
            Action::RemoveDesignation => {
                dir.remove_designation(int_argument(payload)?)?;
                Response::ok()
            }
            Action::DesignationByCode => {
                Response::ok_with(&dir.designation_by_code(int_argument(payload)?)?)?
            }
            Action::DesignationByTitle => {
                Response::ok_with(&dir.designation_by_title(&text_argument(payload)?)?)?
            }
            Action::AllDesignations => list_response(&dir.designations())?,
            Action::DesignationCount => count_response(dir.designation_count())?,
            Action::AddEmployee => {
                dir.add_employee(Employee::from_document(payload, dir)?)?;
                Response::ok()
            }
            Action::UpdateEmployee => {
                dir.update_employee(Employee::from_document(payload, dir)?)?;
                Response::ok()
            }
            Action::RemoveEmployee => {
                dir.remove_employee(int_argument(payload)?)?;
                Response::ok()
            }
            Action::EmployeeById => Response::ok_with(&dir.employee_by_id(int_argument(payload)?)?)?,
            Action::EmployeesByName => {
                list_response(&dir.employees_by_name(&text_argument(payload)?)?)?
            }
            Action::AllEmployees => list_response(&dir.employees())?,
            Action::EmployeeCount => count_response(dir.employee_count())?,
        };
        Ok(response)
    }
}

impl RequestHandler for HrHandler {
    fn handle(&self, request: Request) -> Response {
        let Some(action) = Action::parse(request.manager(), request.action()) else {
            debug!(
                manager = request.manager(),
                action = request.action(),
                "Unsupported operation"
            );
            return Response::error_message(format!(
                "Unsupported operation: {}/{}",
                request.manager(),
                request.action()
            ));
        };

        match self.execute(action, request.payload()) {
            Ok(response) => {
                debug!(%action, "Request served");
                response
            }
            Err(e) => {
                debug!(%action, code = e.error_code(), error = %e, "Request rejected");
                Response::failure(&e.to_error_info())
            }
        }
    }
}

/// Reads an integer argument carried as a primitive wrapper.
fn int_argument(payload: &str) -> Result<i64, CoreError> {
    let value = Primitive::decode(payload)?;
    value.as_int().ok_or_else(|| {
        CoreError::InvalidArgument(format!(
            "Found type {}, required type int",
            value.type_tag()
        ))
    })
}

/// Reads a string argument carried as a primitive wrapper.
fn text_argument(payload: &str) -> Result<String, CoreError> {
    match Primitive::decode(payload)? {
        Primitive::Str(s) => Ok(s),
        other => Err(CoreError::InvalidArgument(format!(
            "Found type {}, required type str",
            other.type_tag()
        ))),
    }
}

fn list_response<T>(items: &[T]) -> Result<Response, CoreError>
where
    T: hrnet_protocol::Tagged + serde::Serialize,
{
    let list = ListEnvelope::from_items(items)?;
    Ok(Response::ok_with_document(list.encode()?))
}

fn count_response(count: usize) -> Result<Response, CoreError> {
    let count = i64::try_from(count)
        .map_err(|_| CoreError::InvalidArgument(format!("count {} out of range", count)))?;
    Ok(Response::ok_with_document(Primitive::Int(count).encode()?))
}
