//! Upsert statement generation.
//!
//! Uses the row alias form introduced in MySQL 8.0.19
//! (`INSERT ... AS vals ON DUPLICATE KEY UPDATE col=vals.col`) instead of the
//! deprecated `VALUES(col)` function.
//!
//! Table and column names are inserted verbatim; only values are bound.

use crate::error::StatementError;

/// Row alias used for the incoming values.
pub const ROW_ALIAS: &str = "vals";

/// Build the `ON DUPLICATE KEY UPDATE` assignment list for `cols`.
///
/// Returns an empty string when `cols` is empty.
pub fn on_dup<S: AsRef<str>>(cols: &[S]) -> String {
    cols.iter()
        .map(|col| {
            let col = col.as_ref();
            format!("{col}={ROW_ALIAS}.{col}")
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Build `insert into T (cols) values (?,..) as vals on duplicate key update ...`.
///
/// When `custom_on_dup` is empty the update clause assigns every non-key
/// column from the incoming row.
pub fn insert_on_duplicate_key_update_statement<C, K>(
    table: &str,
    cols: &[C],
    keys: &[K],
    custom_on_dup: &str,
) -> Result<String, StatementError>
where
    C: AsRef<str>,
    K: AsRef<str>,
{
    if cols.is_empty() {
        return Err(StatementError::NoColumns {
            table: table.to_string(),
        });
    }

    let cols_str = cols.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
    let placeholders = vec!["?"; cols.len()].join(",");

    let update = if custom_on_dup.is_empty() {
        let non_keys: Vec<&str> = cols
            .iter()
            .map(AsRef::as_ref)
            .filter(|col| !contains(keys, col))
            .collect();
        if non_keys.is_empty() {
            return Err(StatementError::NothingToUpdate {
                table: table.to_string(),
            });
        }
        on_dup(&non_keys)
    } else {
        custom_on_dup.to_string()
    };

    Ok(format!(
        "insert into {table} ({cols_str}) values ({placeholders}) as {ROW_ALIAS} on duplicate key update {update}"
    ))
}

/// Build an `insert ... select` upsert copying rows from `table_from` into `table_into`.
///
/// `colmap` pairs a source expression with its destination column, in order.
/// Source expressions may be arbitrary SQL (e.g. `col*2`), so the derived
/// table exposes them under positional aliases `alias0`, `alias1`, ...
pub fn insert_select_on_duplicate_key_update_statement<S, K>(
    table_from: &str,
    table_into: &str,
    colmap: &[(S, S)],
    keys: &[K],
) -> Result<String, StatementError>
where
    S: AsRef<str>,
    K: AsRef<str>,
{
    if colmap.is_empty() {
        return Err(StatementError::NoColumns {
            table: table_into.to_string(),
        });
    }

    let cols_from: Vec<&str> = colmap.iter().map(|(from, _)| from.as_ref()).collect();
    let cols_into: Vec<&str> = colmap.iter().map(|(_, into)| into.as_ref()).collect();
    let aliases: Vec<String> = (0..colmap.len()).map(|i| format!("alias{i}")).collect();

    let updates: Vec<String> = cols_into
        .iter()
        .zip(&aliases)
        .filter(|(col, _)| !contains(keys, col))
        .map(|(col, alias)| format!("{col}={ROW_ALIAS}.{alias}"))
        .collect();
    if updates.is_empty() {
        return Err(StatementError::NothingToUpdate {
            table: table_into.to_string(),
        });
    }

    Ok(format!(
        "insert into {table_into} ({}) select * from (select {} from {table_from}) as {ROW_ALIAS}({}) on duplicate key update {}",
        cols_into.join(","),
        cols_from.join(","),
        aliases.join(","),
        updates.join(",")
    ))
}

fn contains<K: AsRef<str>>(keys: &[K], col: &str) -> bool {
    keys.iter().any(|key| key.as_ref() == col)
}
