//! MySQL connection options.
//!
//! Options come from three layers, later ones winning:
//!
//! 1. built-in defaults (sentinel values that make a misconfigured connection obvious)
//! 2. the `mysql_options:` mapping of a YAML secrets file
//! 3. individual `--mysql-*` arguments / `MYSQL_*` environment variables
//!
//! The password never appears in `Debug` output; use [`MysqlOptions::redacted`]
//! for anything that gets logged or embedded in an error.

use crate::error::{HandlerError, Result};
use clap::Args;
use mysql_async::{Opts, OptsBuilder};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Replacement text for the password in logs.
pub const REDACTED: &str = "REDACTED";

/// Connection options for a single MySQL session.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MysqlOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Run `SET autocommit = 1` on connect.
    pub autocommit: bool,
    /// Fail statements that leave server warnings (notes excluded).
    pub raise_on_warnings: bool,
    /// Session time zone, e.g. `+00:00` or a named zone if the server has tz tables.
    pub time_zone: String,
}

impl Default for MysqlOptions {
    fn default() -> Self {
        Self {
            host: "database_host_is_not_set".to_string(),
            port: 3306,
            user: "database_user_is_not_set".to_string(),
            password: "database_password_is_not_set".to_string(),
            database: "database_is_not_set".to_string(),
            autocommit: true,
            raise_on_warnings: true,
            time_zone: "+00:00".to_string(),
        }
    }
}

impl fmt::Debug for MysqlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &REDACTED)
            .field("database", &self.database)
            .field("autocommit", &self.autocommit)
            .field("raise_on_warnings", &self.raise_on_warnings)
            .field("time_zone", &self.time_zone)
            .finish()
    }
}

/// Layout of a secrets file. Other top-level keys are ignored.
#[derive(Deserialize)]
struct SecretsFile {
    #[serde(default)]
    mysql_options: MysqlOptions,
}

impl MysqlOptions {
    /// Parse the `mysql_options:` mapping out of a YAML secrets document.
    pub fn from_secrets_str(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let secrets: SecretsFile = serde_yaml::from_str(yaml)?;
        Ok(secrets.mysql_options)
    }

    /// Load options from a YAML secrets file.
    pub fn from_secrets_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| HandlerError::SecretsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_secrets_str(&yaml).map_err(|source| HandlerError::SecretsYaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply individually supplied arguments; unset or empty arguments keep the current value.
    pub fn override_with(&mut self, args: &MysqlArgs) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                *target = value.to_string();
            }
        }

        set(&mut self.database, &args.mysql_database);
        set(&mut self.host, &args.mysql_host);
        set(&mut self.password, &args.mysql_password);
        set(&mut self.user, &args.mysql_user);
        if let Some(port) = args.mysql_port {
            self.port = port;
        }
    }

    /// Copy with the password replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        Self {
            password: REDACTED.to_string(),
            ..self.clone()
        }
    }

    /// Statements run on every new connection.
    pub fn init_statements(&self) -> Vec<String> {
        vec![
            format!("SET autocommit = {}", u8::from(self.autocommit)),
            format!("SET time_zone = '{}'", self.time_zone.replace('\'', "''")),
        ]
    }

    /// Build `mysql_async` connection options.
    pub fn to_opts(&self) -> Opts {
        let database = (!self.database.is_empty()).then(|| self.database.clone());
        OptsBuilder::default()
            .ip_or_hostname(self.host.clone())
            .tcp_port(self.port)
            .user(Some(self.user.clone()))
            .pass(Some(self.password.clone()))
            .db_name(database)
            .init(self.init_statements())
            .into()
    }
}

/// Per-field overrides for [`MysqlOptions`].
#[derive(Args, Clone, Default)]
pub struct MysqlArgs {
    /// MySQL database (overrides the secrets file)
    #[arg(long, env = "MYSQL_DATABASE")]
    pub mysql_database: Option<String>,

    /// MySQL host (overrides the secrets file)
    #[arg(long, env = "MYSQL_HOST")]
    pub mysql_host: Option<String>,

    /// MySQL password (overrides the secrets file)
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    pub mysql_password: Option<String>,

    /// MySQL user (overrides the secrets file)
    #[arg(long, env = "MYSQL_USER")]
    pub mysql_user: Option<String>,

    /// MySQL port (overrides the secrets file)
    #[arg(long, env = "MYSQL_PORT")]
    pub mysql_port: Option<u16>,
}
