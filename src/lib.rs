//! MySQL handler library
//!
//! A thin layer over `mysql_async` for scripts and jobs that talk to one MySQL
//! database at a time.
//!
//! # Features
//!
//! - Scoped connections: the session is always closed, failures are logged with the password redacted
//! - Statement execution with positional or named parameters, batch execution, row fetching
//! - Upserts using the MySQL 8.0.19+ `INSERT ... AS vals ON DUPLICATE KEY UPDATE` form
//! - Layered options: defaults, YAML secrets file, CLI/environment overrides
//! - Test fixture tables (`testtable`, `reading30compact`) as a shipped SQL script
//!
//! # CLI Usage
//!
//! ```bash
//! # Create the fixture tables
//! mysql-handler --secrets-file secrets/test_secrets.yml apply-schema
//!
//! # Run a statement
//! mysql-handler --secrets-file secrets/test_secrets.yml execute "truncate testtable"
//!
//! # Print rows as JSON lines
//! mysql-handler --mysql-host db --mysql-user reader fetch "select * from testtable"
//! ```

pub mod error;
pub mod handler;
pub mod options;
pub mod schema;
pub mod session;
pub mod testing;
pub mod value;

pub use error::{HandlerError, Result};
pub use handler::{MysqlHandler, RowMap};
pub use options::{MysqlArgs, MysqlOptions, REDACTED};
pub use session::{MysqlSession, ServerWarning};

// Statement builders and fixtures live in their own crate
pub use mysql_statements as statements;
