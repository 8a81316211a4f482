//! bioscore Core - Domain models, index catalog, and configuration
//!
//! This crate contains the core domain types shared by every bioscore crate:
//! the error type, layered configuration, the index catalog and the score models.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;

pub use catalog::IndexCatalog;
pub use error::{BioscoreError, Result};
