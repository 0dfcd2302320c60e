//! Scoped MySQL connection handling.
//!
//! A [`MysqlHandler`] owns one session. Use [`MysqlHandler::scope`] (or
//! [`MysqlHandler::within`] for an existing handler) to run work against it:
//! the session is always closed afterwards and failures are logged with the
//! password redacted before being returned to the caller.
//!
//! ```rust,ignore
//! use mysql_handler::{MysqlHandler, MysqlOptions};
//!
//! let rows: Vec<(u32, String, String)> = MysqlHandler::scope(options, |mh| {
//!     Box::pin(async move {
//!         mh.fetchall("select id, first_name, last_name from testtable order by id", ())
//!             .await
//!     })
//! })
//! .await?;
//! ```

use crate::error::{HandlerError, Result};
use crate::options::MysqlOptions;
use crate::session::MysqlSession;
use futures::future::BoxFuture;
use mysql_async::prelude::FromRow;
use mysql_async::{Conn, Params, Row, Value};
use mysql_statements::{
    insert_on_duplicate_key_update_statement, insert_select_on_duplicate_key_update_statement,
    max_value_statement, set_auto_increment_statement, truncate_statement,
};
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

/// A row as column name → value (the "dictionary" form), in column order.
pub type RowMap = IndexMap<String, Value>;

/// One MySQL session plus the options it was opened with.
pub struct MysqlHandler<S = Conn> {
    options: MysqlOptions,
    session: S,
}

impl MysqlHandler<Conn> {
    /// Open a new connection.
    pub async fn connect(options: MysqlOptions) -> Result<Self> {
        debug!("Connecting to MySQL with {:?}", options);
        match Conn::new(options.to_opts()).await {
            Ok(conn) => {
                info!("Connected to MySQL at {}:{}", options.host, options.port);
                Ok(Self::from_session(options, conn))
            }
            Err(source) => {
                let redacted = format!("{:?}", options.redacted());
                error!("Database connection failed: {source} options {redacted}");
                Err(HandlerError::Connect {
                    options: redacted,
                    source,
                })
            }
        }
    }

    /// Connect, run `f`, and close the connection whatever the outcome.
    pub async fn scope<T, F>(options: MysqlOptions, f: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut MysqlHandler<Conn>) -> BoxFuture<'a, Result<T>>,
    {
        Self::connect(options).await?.within(f).await
    }
}

impl<S: MysqlSession> MysqlHandler<S> {
    /// Wrap an already open session.
    pub fn from_session(options: MysqlOptions, session: S) -> Self {
        debug!("Using provided session with {:?}", options);
        Self { options, session }
    }

    /// Run `f` against this handler, then close it.
    ///
    /// An error from `f` is logged with the redacted options and returned; a
    /// close failure after an error is only logged.
    pub async fn within<T, F>(mut self, f: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut MysqlHandler<S>) -> BoxFuture<'a, Result<T>>,
    {
        let result = f(&mut self).await;
        let redacted = self.options.redacted();
        let closed = self.close().await;

        match result {
            Ok(value) => {
                closed?;
                Ok(value)
            }
            Err(e) => {
                error!("Database error {e} options {redacted:?}");
                if let Err(close_error) = closed {
                    warn!("Failed to close connection after error: {close_error}");
                }
                Err(e)
            }
        }
    }

    /// Close the session.
    pub async fn close(self) -> Result<()> {
        debug!("Closing the database connection");
        self.session
            .disconnect()
            .await
            .map_err(HandlerError::Disconnect)
    }

    /// Execute a single statement, discarding any result.
    ///
    /// Pass `()` for no parameters, a tuple or `Vec<Value>` for positional
    /// `?` parameters, or `params! {..}` for named ones.
    pub async fn execute<P>(&mut self, statement: &str, params: P) -> Result<()>
    where
        P: Into<Params> + Send,
    {
        let params = params.into();
        debug!("Executing statement: {statement} with params: {params:?}");
        self.session
            .exec_drop(statement, params)
            .await
            .map_err(|source| statement_error(statement, source))?;
        self.check_warnings(statement).await
    }

    /// Execute a script of one or more `;`-separated statements via the text protocol.
    pub async fn execute_multi(&mut self, script: &str) -> Result<()> {
        debug!("Executing script: {script}");
        self.session
            .query_drop(script)
            .await
            .map_err(|source| statement_error(script, source))?;
        self.check_warnings(script).await
    }

    /// Execute `statement` once per row of parameters.
    ///
    /// With `raise_on_warnings` each row is executed and checked on its own,
    /// stopping at the first row that leaves warnings. Otherwise the rows go
    /// out as one batch.
    pub async fn executemany<I, P>(&mut self, statement: &str, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Params>,
    {
        let rows: Vec<Params> = rows.into_iter().map(Into::into).collect();
        debug!("Executing statement with {} rows: {statement}", rows.len());
        if rows.is_empty() {
            return Ok(());
        }

        if !self.options.raise_on_warnings {
            return self
                .session
                .exec_batch(statement, rows)
                .await
                .map_err(|source| statement_error(statement, source));
        }

        // The warning count only describes the most recent row.
        for params in rows {
            self.session
                .exec_drop(statement, params)
                .await
                .map_err(|source| statement_error(statement, source))?;
            self.check_warnings(statement).await?;
        }
        Ok(())
    }

    /// Execute `statement` over `rows` in batches of at most `chunk_size` rows.
    ///
    /// A `chunk_size` of zero is treated as one.
    pub async fn executemany_chunked<I, P>(
        &mut self,
        statement: &str,
        rows: I,
        chunk_size: usize,
    ) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Params>,
    {
        let chunk_size = chunk_size.max(1);
        let mut rows = rows.into_iter().map(Into::into).peekable();
        let mut chunk_number = 0usize;
        while rows.peek().is_some() {
            let chunk: Vec<Params> = rows.by_ref().take(chunk_size).collect();
            chunk_number += 1;
            debug!("Executing chunk {chunk_number} ({} rows)", chunk.len());
            self.executemany(statement, chunk).await?;
        }
        Ok(())
    }

    /// Fetch the first row, or `None` if the query returned no rows.
    pub async fn fetchone<T, P>(&mut self, statement: &str, params: P) -> Result<Option<T>>
    where
        T: FromRow,
        P: Into<Params> + Send,
    {
        let params = params.into();
        debug!("Fetching one row with statement: {statement} and params: {params:?}");
        let row = self
            .session
            .exec_first(statement, params)
            .await
            .map_err(|source| statement_error(statement, source))?;
        self.check_warnings(statement).await?;
        debug!("Fetched row: {:?}", row);
        row.map(|row| convert_row(statement, row)).transpose()
    }

    /// Fetch every row.
    pub async fn fetchall<T, P>(&mut self, statement: &str, params: P) -> Result<Vec<T>>
    where
        T: FromRow,
        P: Into<Params> + Send,
    {
        let params = params.into();
        debug!("Fetching all rows with statement: {statement} and params: {params:?}");
        let rows = self
            .session
            .exec_rows(statement, params)
            .await
            .map_err(|source| statement_error(statement, source))?;
        self.check_warnings(statement).await?;
        debug!("Fetched {} rows", rows.len());
        rows.into_iter()
            .map(|row| convert_row(statement, row))
            .collect()
    }

    /// Fetch every row as a column name → value map.
    pub async fn fetchall_maps<P>(&mut self, statement: &str, params: P) -> Result<Vec<RowMap>>
    where
        P: Into<Params> + Send,
    {
        let rows: Vec<Row> = self.fetchall(statement, params).await?;
        Ok(rows.into_iter().map(row_to_map).collect())
    }

    /// Upsert `rows` into `table`.
    ///
    /// With an empty `on_dup` every column not in `keys` is updated from the
    /// incoming row; otherwise `on_dup` is used verbatim as the update clause
    /// (it may refer to incoming values as `vals.col`).
    pub async fn insert_on_duplicate_key_update<C, K, I, P>(
        &mut self,
        table: &str,
        cols: &[C],
        keys: &[K],
        rows: I,
        on_dup: &str,
    ) -> Result<()>
    where
        C: AsRef<str>,
        K: AsRef<str>,
        I: IntoIterator<Item = P>,
        P: Into<Params>,
    {
        debug!("Inserting with on duplicate key update into {table}");
        let statement = insert_on_duplicate_key_update_statement(table, cols, keys, on_dup)?;
        self.executemany(&statement, rows).await
    }

    /// Upsert rows selected from `table_from` into `table_into`.
    ///
    /// `colmap` pairs source expressions with destination columns.
    pub async fn insert_select_on_duplicate_key_update<S2, K>(
        &mut self,
        table_from: &str,
        table_into: &str,
        colmap: &[(S2, S2)],
        keys: &[K],
    ) -> Result<()>
    where
        S2: AsRef<str>,
        K: AsRef<str>,
    {
        debug!("Inserting from {table_from} into {table_into}");
        let statement =
            insert_select_on_duplicate_key_update_statement(table_from, table_into, colmap, keys)?;
        self.execute(&statement, ()).await
    }

    /// Remove every row from `table`.
    pub async fn truncate(&mut self, table: &str) -> Result<()> {
        self.execute(&truncate_statement(table), ()).await
    }

    /// Set the auto-increment counter of `table` to one past `max(col)`.
    ///
    /// Returns the value set. Not safe against concurrent inserts between the
    /// read and the alter.
    pub async fn reset_auto_increment(&mut self, table: &str, col: &str) -> Result<u64> {
        let max: Option<u64> = self
            .fetchone::<Option<u64>, _>(&max_value_statement(table, col), ())
            .await?
            .flatten();
        let next = max.unwrap_or(0) + 1;
        self.execute(&set_auto_increment_statement(table, next), ())
            .await?;
        info!("Reset auto_increment of {table} to {next}");
        Ok(next)
    }

    async fn check_warnings(&mut self, statement: &str) -> Result<()> {
        if !self.options.raise_on_warnings || self.session.warning_count() == 0 {
            return Ok(());
        }

        let warnings = self
            .session
            .show_warnings()
            .await
            .map_err(|source| statement_error(statement, source))?;
        let warnings: Vec<_> = warnings.into_iter().filter(|w| !w.is_note()).collect();
        if warnings.is_empty() {
            return Ok(());
        }

        debug!("Statement raised {} warnings: {statement}", warnings.len());
        Err(HandlerError::Warnings {
            statement: statement.to_string(),
            warnings,
        })
    }
}

fn statement_error(statement: &str, source: mysql_async::Error) -> HandlerError {
    debug!("Error executing statement: {source}");
    HandlerError::Statement {
        statement: statement.to_string(),
        source,
    }
}

fn convert_row<T: FromRow>(statement: &str, row: Row) -> Result<T> {
    mysql_async::from_row_opt(row).map_err(|e| HandlerError::Conversion {
        statement: statement.to_string(),
        message: e.to_string(),
    })
}

fn row_to_map(mut row: Row) -> RowMap {
    let columns = row.columns();
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = row.take::<Value, _>(i).unwrap_or(Value::NULL);
            (column.name_str().into_owned(), value)
        })
        .collect()
}
