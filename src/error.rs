//! Error types for the MySQL handler.

use crate::session::ServerWarning;
use mysql_statements::StatementError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = HandlerError> = std::result::Result<T, E>;

/// Errors that can occur while talking to MySQL.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Connecting failed. `options` is the redacted option set.
    #[error("Failed to connect to MySQL with {options}: {source}")]
    Connect {
        options: String,
        #[source]
        source: mysql_async::Error,
    },

    /// A statement failed on the server or in the driver.
    #[error("MySQL error: {source} (statement: {statement})")]
    Statement {
        statement: String,
        #[source]
        source: mysql_async::Error,
    },

    /// The server reported warnings and `raise_on_warnings` is set.
    #[error("MySQL warnings: {} (statement: {statement})", join_warnings(.warnings))]
    Warnings {
        statement: String,
        warnings: Vec<ServerWarning>,
    },

    /// A row could not be converted into the requested type.
    #[error("Row conversion failed: {message} (statement: {statement})")]
    Conversion { statement: String, message: String },

    /// A statement could not be built from the given columns.
    #[error("Statement error: {0}")]
    Build(#[from] StatementError),

    /// Closing the connection failed.
    #[error("Failed to close MySQL connection: {0}")]
    Disconnect(#[source] mysql_async::Error),

    #[error("Failed to read secrets file {path:?}: {source}")]
    SecretsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse secrets file {path:?}: {source}")]
    SecretsYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl HandlerError {
    /// The statement this error is attached to, if any.
    pub fn statement(&self) -> Option<&str> {
        match self {
            HandlerError::Statement { statement, .. }
            | HandlerError::Warnings { statement, .. }
            | HandlerError::Conversion { statement, .. } => Some(statement),
            _ => None,
        }
    }

    /// The underlying driver error, if any.
    pub fn mysql_error(&self) -> Option<&mysql_async::Error> {
        match self {
            HandlerError::Connect { source, .. }
            | HandlerError::Statement { source, .. }
            | HandlerError::Disconnect(source) => Some(source),
            _ => None,
        }
    }

    /// Server error code, when the server rejected the statement.
    pub fn server_code(&self) -> Option<u16> {
        match self.mysql_error()? {
            mysql_async::Error::Server(server) => Some(server.code),
            _ => None,
        }
    }
}

fn join_warnings(warnings: &[ServerWarning]) -> String {
    warnings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
