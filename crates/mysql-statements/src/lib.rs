//! SQL statement builders for mysql-handler.
//!
//! Everything here is pure string construction; no connection is needed.
//!
//! # Structure
//!
//! - `upsert`: `INSERT ... AS vals ON DUPLICATE KEY UPDATE` statements (MySQL 8.0.19+ row alias syntax)
//! - `maintenance`: truncate and auto-increment housekeeping statements
//! - `fixtures`: DDL for the `testtable` and `reading30compact` test tables
//!
//! # Example
//!
//! ```rust
//! use mysql_statements::{insert_on_duplicate_key_update_statement, on_dup};
//!
//! assert_eq!(on_dup(&["a", "b"]), "a=vals.a,b=vals.b");
//!
//! let sql = insert_on_duplicate_key_update_statement("t", &["id", "name"], &["id"], "").unwrap();
//! assert_eq!(
//!     sql,
//!     "insert into t (id,name) values (?,?) as vals on duplicate key update name=vals.name"
//! );
//! ```

mod error;
pub mod fixtures;
pub mod maintenance;
pub mod upsert;

pub use error::StatementError;
pub use fixtures::{
    split_script, test_schema_script, ColumnType, FixtureColumn, FixtureTable, TableKind,
    MEASUREMENT_COLUMNS,
};
pub use maintenance::{max_value_statement, set_auto_increment_statement, truncate_statement};
pub use upsert::{
    insert_on_duplicate_key_update_statement, insert_select_on_duplicate_key_update_statement,
    on_dup,
};
