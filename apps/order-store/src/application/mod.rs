//! Application Layer
//!
//! Boundary types that carry orders in and out of the process.
//!
//! - **DTOs**: Data transfer objects for JSON input and output

pub mod dto;

pub use dto::*;
