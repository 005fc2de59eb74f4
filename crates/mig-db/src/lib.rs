//! mig-db - Execution contexts for mig
//!
//! This crate provides the `Database` and `Connection` traits that migration
//! actions and the version store run statements through, the `Transaction`
//! handle used for atomic batches, and a DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod transaction;
pub mod util;

pub use duckdb::DuckDbBackend;
pub use error::{CommitError, DbError, DbResult};
pub use traits::{Connection, Database};
pub use transaction::Transaction;
pub use util::{drop_all, exec_all};
