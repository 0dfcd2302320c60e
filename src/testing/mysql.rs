//! Options and fixture data for tests against a live MySQL server.

use crate::error::Result;
use crate::options::MysqlOptions;

/// A `testtable` row: `(id, first_name, last_name)`.
pub type FixtureRow = (u32, String, String);

/// Options for the test server.
///
/// `MYSQL_TEST_SECRETS` points at a YAML secrets file; otherwise
/// `MYSQL_TEST_HOST`, `MYSQL_TEST_PORT`, `MYSQL_TEST_USER`,
/// `MYSQL_TEST_PASSWORD` and `MYSQL_TEST_DATABASE` are read, defaulting to
/// the DevContainer server `root:root@mysql:3306/testdb`.
pub fn create_mysql_options() -> Result<MysqlOptions> {
    if let Ok(path) = std::env::var("MYSQL_TEST_SECRETS") {
        return MysqlOptions::from_secrets_file(path);
    }

    let env = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
    Ok(MysqlOptions {
        host: env("MYSQL_TEST_HOST", "mysql"),
        port: env("MYSQL_TEST_PORT", "3306").parse().unwrap_or(3306),
        user: env("MYSQL_TEST_USER", "root"),
        password: env("MYSQL_TEST_PASSWORD", "root"),
        database: env("MYSQL_TEST_DATABASE", "testdb"),
        ..MysqlOptions::default()
    })
}

/// The five rows the `testtable` tests insert.
pub fn fixture_rows() -> Vec<FixtureRow> {
    [
        (1, "Ann", "Awk"),
        (2, "Bob", "Bash"),
        (3, "Cath", "Curl"),
        (4, "Dave", "Dig"),
        (5, "Eve", "Other"),
    ]
    .into_iter()
    .map(|(id, first, last)| (id, first.to_string(), last.to_string()))
    .collect()
}
