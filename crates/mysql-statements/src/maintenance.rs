//! Table housekeeping statements.

/// `truncate T`
pub fn truncate_statement(table: &str) -> String {
    format!("truncate {table}")
}

/// `select max(col) from T`
pub fn max_value_statement(table: &str, col: &str) -> String {
    format!("select max({col}) from {table}")
}

/// `alter table T auto_increment = N`
pub fn set_auto_increment_statement(table: &str, value: u64) -> String {
    format!("alter table {table} auto_increment = {value}")
}
