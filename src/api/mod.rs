//! Fleet backend boundary
//!
//! - `models`: wire shapes and payloads
//! - `error`: the closed error taxonomy every call maps into
//! - `client`: one async method per endpoint

mod client;
mod error;
pub mod models;

pub use client::FleetClient;
pub use error::{ApiError, ErrorKind, FormError};
