//! Command-line interface for mysql-handler
//!
//! # Usage Examples
//!
//! ```bash
//! # Create the test fixture tables from the built-in script
//! mysql-handler --secrets-file secrets/test_secrets.yml apply-schema
//!
//! # Apply a custom script
//! mysql-handler --secrets-file secrets/test_secrets.yml apply-schema --file schema.sql
//!
//! # Run one statement with bound parameters
//! mysql-handler --mysql-host db execute \
//!   "insert into testtable (first_name, last_name) values (?, ?)" \
//!   --param Ann --param Awk
//!
//! # Fetch rows as JSON lines
//! mysql-handler --mysql-host db fetch "select * from testtable order by id"
//!
//! # Housekeeping
//! mysql-handler --mysql-host db truncate testtable
//! mysql-handler --mysql-host db reset-auto-increment testtable id
//! ```
//!
//! Connection options are read from the secrets file (`mysql_options:`
//! mapping) and then overridden by `--mysql-*` arguments or `MYSQL_*`
//! environment variables.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use mysql_async::{Params, Row, Value};
use mysql_handler::statements::TableKind;
use mysql_handler::{schema, value, MysqlArgs, MysqlHandler, MysqlOptions};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "mysql-handler")]
#[command(about = "Run statements against MySQL with scoped, logged connections")]
#[command(long_about = None)]
struct Cli {
    /// YAML secrets file containing a `mysql_options:` mapping
    #[arg(long, env = "MYSQL_SECRETS_FILE", value_name = "PATH")]
    secrets_file: Option<PathBuf>,

    /// Per-field connection overrides
    #[command(flatten)]
    mysql: MysqlArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the test fixture tables (testtable, reading30compact)
    ApplySchema {
        /// Apply this SQL script instead of the built-in fixture script
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Execute a statement and discard its result
    Execute {
        /// SQL statement; use `?` placeholders with --param
        statement: String,

        /// Positional parameter value (repeatable)
        #[arg(long = "param", value_name = "VALUE")]
        params: Vec<String>,

        /// Treat the statement as a `;`-separated script
        #[arg(long, conflicts_with = "params")]
        multi: bool,
    },

    /// Fetch rows and print them as JSON
    Fetch {
        /// SQL query; use `?` placeholders with --param
        statement: String,

        /// Positional parameter value (repeatable)
        #[arg(long = "param", value_name = "VALUE")]
        params: Vec<String>,

        /// Print only the first row (or `null`)
        #[arg(long)]
        one: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Remove every row from a table
    Truncate {
        table: String,
    },

    /// Set a table's auto-increment counter to one past max(column)
    ResetAutoIncrement {
        table: String,
        column: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One compact JSON object per line
    #[value(name = "json")]
    Json,
    /// Indented JSON
    #[value(name = "pretty")]
    Pretty,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = load_options(cli.secrets_file.as_deref(), &cli.mysql)?;

    match cli.command {
        Commands::ApplySchema { file } => {
            let script = match file {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read SQL script {path:?}"))?,
                ),
                None => None,
            };
            let count = MysqlHandler::scope(options, |mh| {
                Box::pin(async move {
                    match script {
                        Some(script) => schema::apply_script(mh, &script).await,
                        None => schema::apply_test_schema(mh, TableKind::Persistent).await,
                    }
                })
            })
            .await
            .context("Failed to apply schema")?;
            info!("Applied {count} statements");
        }
        Commands::Execute {
            statement,
            params,
            multi,
        } => {
            MysqlHandler::scope(options, |mh| {
                Box::pin(async move {
                    if multi {
                        mh.execute_multi(&statement).await
                    } else {
                        mh.execute(&statement, to_params(params)).await
                    }
                })
            })
            .await
            .context("Failed to execute statement")?;
        }
        Commands::Fetch {
            statement,
            params,
            one,
            format,
        } => {
            let rows: Vec<Row> = MysqlHandler::scope(options, |mh| {
                Box::pin(async move {
                    if one {
                        let row: Option<Row> = mh.fetchone(&statement, to_params(params)).await?;
                        Ok::<_, mysql_handler::HandlerError>(row.into_iter().collect())
                    } else {
                        mh.fetchall(&statement, to_params(params)).await
                    }
                })
            })
            .await
            .context("Failed to fetch rows")?;

            if one && rows.is_empty() {
                println!("null");
            }
            for row in &rows {
                println!("{}", render(&value::row_to_json(row), format)?);
            }
        }
        Commands::Truncate { table } => {
            MysqlHandler::scope(options, |mh| {
                Box::pin(async move { mh.truncate(&table).await })
            })
            .await
            .context("Failed to truncate table")?;
        }
        Commands::ResetAutoIncrement { table, column } => {
            let next = MysqlHandler::scope(options, |mh| {
                Box::pin(async move { mh.reset_auto_increment(&table, &column).await })
            })
            .await
            .context("Failed to reset auto_increment")?;
            println!("{next}");
        }
    }

    Ok(())
}

/// Defaults, then the secrets file, then individual overrides.
fn load_options(secrets_file: Option<&Path>, args: &MysqlArgs) -> anyhow::Result<MysqlOptions> {
    let mut options = match secrets_file {
        Some(path) => MysqlOptions::from_secrets_file(path)
            .with_context(|| format!("Failed to load MySQL options from {path:?}"))?,
        None => MysqlOptions::default(),
    };
    options.override_with(args);
    Ok(options)
}

fn to_params(params: Vec<String>) -> Params {
    if params.is_empty() {
        Params::Empty
    } else {
        Params::Positional(params.into_iter().map(Value::from).collect())
    }
}

fn render(json: &serde_json::Value, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(json)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(json)?,
    };
    Ok(rendered)
}
