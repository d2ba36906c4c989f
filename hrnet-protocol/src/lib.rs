//! # hrnet-protocol
//!
//! Wire protocol implementation for hrnet.
//!
//! This crate provides:
//! - Framing with a fixed 1024-byte decimal length header
//! - Two-level JSON request/response envelopes
//! - Tagged list and primitive wrappers with a closed decoder registry
//! - Transport/decode error classification

use std::ops::RangeInclusive;

pub mod codec;
pub mod error;
pub mod frame;
pub mod message;
pub mod wrapper;

pub use codec::{decode_request, decode_response, from_document, to_document, Encoder};
pub use error::{ErrorClass, ProtocolError};
pub use frame::{read_frame, read_frame_limited, write_frame, Frame, HEADER_SIZE};
pub use message::{
    is_empty_document, ErrorInfo, FieldError, FieldErrorKind, FieldErrors, Request, Response,
    EMPTY_DOCUMENT,
};
pub use wrapper::{DecoderRegistry, ListEnvelope, Primitive, RegistryBuilder, Tagged};

/// Maximum frame payload size accepted by default (16 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Ports a server may be configured to listen on.
pub const PORT_RANGE: RangeInclusive<u16> = 1024..=49151;

/// Host servers bind to and clients connect to.
pub const LOCAL_HOST: &str = "127.0.0.1";
