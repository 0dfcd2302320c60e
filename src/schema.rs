//! Applying SQL scripts and the test fixture tables.

use crate::error::Result;
use crate::handler::MysqlHandler;
use crate::session::MysqlSession;
use mysql_statements::{split_script, test_schema_script, FixtureTable, TableKind};
use tracing::info;

/// The shipped fixture script, `sql/test_mysql_schema.sql`.
pub const TEST_SCHEMA_SQL: &str = include_str!("../sql/test_mysql_schema.sql");

/// Run every statement of `script` in order. Returns the number executed.
pub async fn apply_script<S: MysqlSession>(
    handler: &mut MysqlHandler<S>,
    script: &str,
) -> Result<usize> {
    let statements = split_script(script);
    for statement in &statements {
        handler.execute(statement, ()).await?;
    }
    Ok(statements.len())
}

/// Create the fixture tables.
///
/// Persistent tables are dropped and recreated from the fixture script.
/// Temporary tables are created only if missing, so existing session data is kept.
/// Returns the number of statements executed.
pub async fn apply_test_schema<S: MysqlSession>(
    handler: &mut MysqlHandler<S>,
    kind: TableKind,
) -> Result<usize> {
    let count = match kind {
        TableKind::Persistent => apply_script(handler, &test_schema_script()).await?,
        TableKind::Temporary => {
            let tables = FixtureTable::all();
            for table in &tables {
                handler
                    .execute(&table.create_statement(TableKind::Temporary), ())
                    .await?;
            }
            tables.len()
        }
    };
    info!("Applied {kind:?} test schema ({count} statements)");
    Ok(count)
}
