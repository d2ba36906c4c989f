//! # hrnet-client
//!
//! Client library for hrnet.
//!
//! This crate provides:
//! - A one-shot transport: one connection per request, no reuse, no retry
//! - A typed API for every directory operation

pub mod client;
pub mod connection;
pub mod error;

pub use client::HrClient;
pub use connection::{Connection, ConnectionConfig};
pub use error::ClientError;
