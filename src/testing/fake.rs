//! In-memory session for exercising the handler without a server.

use crate::session::{MysqlSession, ServerWarning};
use async_trait::async_trait;
use mysql_async::consts::ColumnType;
use mysql_async::{Column, Params, Row, ServerError, Value};
use std::sync::{Arc, Mutex, PoisonError};

/// A call made on a [`FakeSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    Exec { statement: String, params: Params },
    Batch { statement: String, rows: Vec<Params> },
    First { statement: String, params: Params },
    Rows { statement: String, params: Params },
    Query { script: String },
    ShowWarnings,
    Disconnect,
}

impl FakeCall {
    /// Statement or script text, if the call carried one.
    pub fn statement(&self) -> Option<&str> {
        match self {
            FakeCall::Exec { statement, .. }
            | FakeCall::Batch { statement, .. }
            | FakeCall::First { statement, .. }
            | FakeCall::Rows { statement, .. } => Some(statement),
            FakeCall::Query { script } => Some(script),
            FakeCall::ShowWarnings | FakeCall::Disconnect => None,
        }
    }
}

/// Shared record of calls; survives the session being consumed by `disconnect`.
#[derive(Debug, Clone, Default)]
pub struct FakeLog(Arc<Mutex<Vec<FakeCall>>>);

impl FakeLog {
    fn push(&self, call: FakeCall) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|call| call.statement().map(String::from))
            .collect()
    }

    pub fn disconnected(&self) -> bool {
        self.calls().contains(&FakeCall::Disconnect)
    }
}

/// Build a row as a server would return it.
///
/// `columns` pairs each column name with its type; `values` must have the same length.
pub fn fake_row(columns: &[(&str, ColumnType)], values: Vec<Value>) -> Row {
    let columns: Arc<[Column]> = columns
        .iter()
        .map(|(name, column_type)| Column::new(*column_type).with_name(name.as_bytes()))
        .collect();
    mysql_common::row::new_row(values, columns)
}

/// A [`MysqlSession`] that records calls and returns canned rows.
///
/// Statements containing a registered needle fail with a server error; every
/// other statement reports the configured warnings. Reads return the rows
/// given to [`FakeSession::with_rows`] (none by default).
#[derive(Debug, Default)]
pub struct FakeSession {
    log: FakeLog,
    failures: Vec<(String, ServerError)>,
    warnings: Vec<ServerWarning>,
    call_warnings: Option<(usize, Vec<ServerWarning>)>,
    rows: Vec<Row>,
    statement_calls: usize,
    last_warnings: Vec<ServerWarning>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on the call log.
    pub fn log(&self) -> FakeLog {
        self.log.clone()
    }

    /// Fail any statement containing `needle` with the given server error.
    pub fn fail_when(mut self, needle: &str, code: u16, message: &str) -> Self {
        self.failures.push((
            needle.to_string(),
            ServerError {
                code,
                message: message.to_string(),
                state: "HY000".to_string(),
            },
        ));
        self
    }

    /// Report `warnings` after every successful statement.
    pub fn with_warnings(mut self, warnings: Vec<ServerWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Report `warnings` only after the statement call numbered `index` (from 0).
    pub fn with_warnings_on_call(mut self, index: usize, warnings: Vec<ServerWarning>) -> Self {
        self.call_warnings = Some((index, warnings));
        self
    }

    /// Return `rows` from `exec_rows` and the first of them from `exec_first`.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    fn run(&mut self, call: FakeCall) -> Result<(), mysql_async::Error> {
        let statement = call.statement().unwrap_or_default().to_string();
        self.log.push(call);
        let index = self.statement_calls;
        self.statement_calls += 1;

        if let Some((_, error)) = self
            .failures
            .iter()
            .find(|(needle, _)| statement.contains(needle.as_str()))
        {
            self.last_warnings.clear();
            return Err(mysql_async::Error::Server(error.clone()));
        }

        self.last_warnings = match &self.call_warnings {
            Some((warn_index, warnings)) if *warn_index == index => warnings.clone(),
            _ => self.warnings.clone(),
        };
        Ok(())
    }
}

#[async_trait]
impl MysqlSession for FakeSession {
    async fn exec_drop(
        &mut self,
        statement: &str,
        params: Params,
    ) -> Result<(), mysql_async::Error> {
        self.run(FakeCall::Exec {
            statement: statement.to_string(),
            params,
        })
    }

    async fn exec_batch(
        &mut self,
        statement: &str,
        rows: Vec<Params>,
    ) -> Result<(), mysql_async::Error> {
        self.run(FakeCall::Batch {
            statement: statement.to_string(),
            rows,
        })
    }

    async fn exec_first(
        &mut self,
        statement: &str,
        params: Params,
    ) -> Result<Option<Row>, mysql_async::Error> {
        self.run(FakeCall::First {
            statement: statement.to_string(),
            params,
        })?;
        Ok(self.rows.first().cloned())
    }

    async fn exec_rows(
        &mut self,
        statement: &str,
        params: Params,
    ) -> Result<Vec<Row>, mysql_async::Error> {
        self.run(FakeCall::Rows {
            statement: statement.to_string(),
            params,
        })?;
        Ok(self.rows.clone())
    }

    async fn query_drop(&mut self, script: &str) -> Result<(), mysql_async::Error> {
        self.run(FakeCall::Query {
            script: script.to_string(),
        })
    }

    fn warning_count(&self) -> u16 {
        u16::try_from(self.last_warnings.len()).unwrap_or(u16::MAX)
    }

    async fn show_warnings(&mut self) -> Result<Vec<ServerWarning>, mysql_async::Error> {
        self.log.push(FakeCall::ShowWarnings);
        Ok(self.last_warnings.clone())
    }

    async fn disconnect(self) -> Result<(), mysql_async::Error> {
        self.log.push(FakeCall::Disconnect);
        Ok(())
    }
}
