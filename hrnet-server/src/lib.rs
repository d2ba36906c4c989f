//! # hrnet-server
//!
//! TCP server for hrnet.
//!
//! This crate provides:
//! - Configuration loading and validation
//! - The one-request-per-connection dispatcher with bounded concurrency
//! - The HR request handler mapping operations onto the directory

pub mod config;
pub mod error;
pub mod handler;
pub mod server;

pub use config::{Config, ConfigError};
pub use error::ServerError;
pub use handler::{HrHandler, RequestHandler};
pub use hrnet_core::Action;
pub use server::{Server, ServerConfig, ServerStats};
