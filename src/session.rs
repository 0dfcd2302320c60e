//! The connection seam used by [`crate::MysqlHandler`].
//!
//! `MysqlSession` is the narrow set of calls the handler makes on a live
//! connection. It is implemented for `mysql_async::Conn`; tests substitute
//! [`crate::testing::FakeSession`].

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Params, Row};
use std::fmt;

/// One row of `SHOW WARNINGS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerWarning {
    /// `Note`, `Warning` or `Error`.
    pub level: String,
    pub code: u32,
    pub message: String,
}

impl ServerWarning {
    pub fn new(level: impl Into<String>, code: u32, message: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            code,
            message: message.into(),
        }
    }

    /// Notes (e.g. "table already exists" from `CREATE TABLE IF NOT EXISTS`) are informational.
    pub fn is_note(&self) -> bool {
        self.level.eq_ignore_ascii_case("note")
    }
}

impl fmt::Display for ServerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.level, self.code, self.message)
    }
}

/// Calls the handler makes on a connection.
///
/// Statements with `Params::Empty` go through the text protocol so that
/// non-preparable statements and DDL behave as typed; anything with
/// parameters is prepared and bound.
#[async_trait]
pub trait MysqlSession: Send + Sized {
    async fn exec_drop(&mut self, statement: &str, params: Params)
        -> Result<(), mysql_async::Error>;

    async fn exec_batch(
        &mut self,
        statement: &str,
        rows: Vec<Params>,
    ) -> Result<(), mysql_async::Error>;

    async fn exec_first(
        &mut self,
        statement: &str,
        params: Params,
    ) -> Result<Option<Row>, mysql_async::Error>;

    async fn exec_rows(
        &mut self,
        statement: &str,
        params: Params,
    ) -> Result<Vec<Row>, mysql_async::Error>;

    /// Run a (possibly multi-statement) script through the text protocol.
    async fn query_drop(&mut self, script: &str) -> Result<(), mysql_async::Error>;

    /// Warning count reported for the last statement.
    fn warning_count(&self) -> u16;

    async fn show_warnings(&mut self) -> Result<Vec<ServerWarning>, mysql_async::Error>;

    async fn disconnect(self) -> Result<(), mysql_async::Error>;
}

#[async_trait]
impl MysqlSession for Conn {
    async fn exec_drop(
        &mut self,
        statement: &str,
        params: Params,
    ) -> Result<(), mysql_async::Error> {
        match params {
            Params::Empty => Queryable::query_drop(self, statement).await,
            params => Queryable::exec_drop(self, statement, params).await,
        }
    }

    async fn exec_batch(
        &mut self,
        statement: &str,
        rows: Vec<Params>,
    ) -> Result<(), mysql_async::Error> {
        Queryable::exec_batch(self, statement, rows).await
    }

    async fn exec_first(
        &mut self,
        statement: &str,
        params: Params,
    ) -> Result<Option<Row>, mysql_async::Error> {
        match params {
            Params::Empty => Queryable::query_first(self, statement).await,
            params => Queryable::exec_first(self, statement, params).await,
        }
    }

    async fn exec_rows(
        &mut self,
        statement: &str,
        params: Params,
    ) -> Result<Vec<Row>, mysql_async::Error> {
        match params {
            Params::Empty => Queryable::query(self, statement).await,
            params => Queryable::exec(self, statement, params).await,
        }
    }

    async fn query_drop(&mut self, script: &str) -> Result<(), mysql_async::Error> {
        Queryable::query_drop(self, script).await
    }

    fn warning_count(&self) -> u16 {
        self.get_warnings()
    }

    async fn show_warnings(&mut self) -> Result<Vec<ServerWarning>, mysql_async::Error> {
        let rows: Vec<(String, u32, String)> = Queryable::query(self, "SHOW WARNINGS").await?;
        Ok(rows
            .into_iter()
            .map(|(level, code, message)| ServerWarning {
                level,
                code,
                message,
            })
            .collect())
    }

    async fn disconnect(self) -> Result<(), mysql_async::Error> {
        Conn::disconnect(self).await
    }
}
