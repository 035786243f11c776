//! # arbore-core
//!
//! Shared foundation for the arbore workspace: the error type, layered
//! configuration, atomic persistence helpers and the record classifier used
//! by every loader.

pub mod config;
pub mod error;
pub mod persistence;
pub mod record;

pub use config::{ArboreConfig, FaultRates, GeneratorConfig, OutputFormat, StagingConfig, WarehouseConfig};
pub use error::{ArboreError, Result};
pub use record::{RecordKind, classify, classify_value};
