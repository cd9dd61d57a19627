//! CLI command implementations.

pub mod common;
pub mod compare;
pub mod route;
pub mod version;
