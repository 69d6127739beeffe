//! curljson format - Core primitives for key-path extraction
//!
//! This crate provides the building blocks shared by the rest of the
//! workspace, with no I/O dependencies. It includes:
//!
//! - Key paths (`PathSpec`) and their textual syntax
//! - The key-path resolver over `serde_json::Value`
//! - Error types and their taxonomy tags
//! - Security limits
//! - JSON type names for diagnostics

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod limits;
pub mod path;
pub mod resolve;
pub mod types;

// Re-export commonly used types
pub use error::{CurlJsonError, ErrorKind, Result};
pub use limits::Limits;
pub use path::{PathSpec, Segment};
pub use resolve::{resolve, resolve_present, Unresolved};
pub use types::{is_empty_document, type_name};
