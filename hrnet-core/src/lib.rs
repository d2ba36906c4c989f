//! # hrnet-core
//!
//! HR records and the in-memory directory behind hrnet.
//!
//! This crate provides:
//! - The closed table of supported operations
//! - Designation and employee records with field-level validation
//! - The closed record decoder registry for list envelopes
//! - An in-memory directory of designations and employees

pub mod action;
pub mod designation;
pub mod directory;
pub mod employee;
pub mod error;
pub mod record;
pub mod validation;

pub use action::Action;
pub use designation::Designation;
pub use directory::HrDirectory;
pub use employee::{DesignationLookup, Employee, Gender};
pub use error::CoreError;
pub use record::{registry, Record};
