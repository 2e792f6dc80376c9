//! vigil-client — typed async HTTP client for the recognition backend.
//!
//! One method per REST endpoint, returning the payload types from
//! `vigil_core::protocol`. The backend signals domain failures in the
//! JSON body (often with a 4xx status), so responses are decoded
//! regardless of HTTP status and the `success` flag is left to callers.

mod backend;

pub use backend::{Backend, BackendError};
