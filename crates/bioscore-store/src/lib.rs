//! bioscore Store - Score warehouse port and adapters
//!
//! This crate defines the warehouse port the persistence orchestrator talks
//! to and provides an in-memory adapter and a PostgreSQL adapter.

pub mod memory;
pub mod ports;
pub mod postgres;

pub use memory::MemoryWarehouse;
pub use ports::{ScoreWarehouse, StagingBatch};
pub use postgres::{PostgresConfig, PostgresWarehouse};
