//! MySQL handler E2E tests
//!
//! These need a live MySQL 8.0.19+ server. Connection options come from
//! `MYSQL_TEST_SECRETS` or `MYSQL_TEST_HOST`/`MYSQL_TEST_PORT`/`MYSQL_TEST_USER`/
//! `MYSQL_TEST_PASSWORD`/`MYSQL_TEST_DATABASE`. Run with `cargo test -- --ignored`.
//!
//! Library tests work on temporary tables, so they only see their own session's rows.

mod handler_cli;
mod schema_lib;

pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("mysql_handler=debug")
        .try_init()
        .ok();
}
