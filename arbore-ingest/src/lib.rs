//! # arbore-ingest — warehouse loaders
//!
//! Two ways to get generated records into the warehouse:
//!
//! - [`InsertLoader`]: classify each record and run one parameterized insert
//!   per record, committed immediately.
//! - [`StagedLoader`]: buffer records per kind, write each full buffer as a
//!   batch file, upload it to a stage and hand it to a pipe. The pipe only
//!   queues the file; [`drain_pipes`] performs the actual load later.
//!
//! The warehouse, stage and pipe are traits. [`SqliteWarehouse`],
//! [`LocalStage`] and [`LocalPipe`] implement them on the local file system.

pub mod drain;
pub mod error;
pub mod input;
pub mod insert;
pub mod rows;
pub mod sqlite;
pub mod stage;
pub mod staged;
pub mod status;
pub mod warehouse;

pub use drain::{DrainReport, DrainedFile, drain_pipes};
pub use error::{IngestError, Result};
pub use input::{JsonInput, read_json_file, read_lines, validate_input_path};
pub use insert::{InsertLoader, LoadStats};
pub use rows::{TableSpec, claim_row, order_row};
pub use sqlite::{SqliteSession, SqliteWarehouse};
pub use stage::{
    IngestPipe, IngestResponse, JsonLinesWriter, LocalPipe, LocalStage, StageArea,
    StageFileWriter, StagedFile,
};
pub use staged::{StagedLoader, StagedReport};
pub use status::{HistoryRow, PipeStatus, pipe_status};
pub use warehouse::{Session, Warehouse};
