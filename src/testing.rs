//! Test infrastructure
//!
//! - `fake`: an in-memory [`crate::MysqlSession`] that records calls
//! - `mysql`: options and fixture rows for tests against a live server

pub mod fake;
pub mod mysql;

pub use fake::{fake_row, FakeCall, FakeLog, FakeSession};
pub use mysql::{create_mysql_options, fixture_rows, FixtureRow};
