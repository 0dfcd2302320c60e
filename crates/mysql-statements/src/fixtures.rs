//! DDL for the test fixture tables.
//!
//! Two table shapes back the integration tests:
//!
//! - `testtable`: auto-increment `id` plus two required name columns with defaults
//! - `reading30compact`: time-series sensor readings keyed by `(date, ss_id)`
//!   with [`MEASUREMENT_COLUMNS`] nullable `FLOAT` columns `t1..tN`
//!
//! The shipped `sql/test_mysql_schema.sql` is exactly [`test_schema_script`].

/// Number of measurement columns in `reading30compact`.
pub const MEASUREMENT_COLUMNS: usize = 48;

/// Leading comment of the fixture script.
const SCRIPT_HEADER: &str = "\
-- Test fixtures for mysql-handler: a generic two-column table and a
-- fixed-width sensor-reading table. Safe to apply repeatedly.
";

/// Column types used by the fixture tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    UnsignedInt,
    VarChar { length: u32 },
    Float,
    Timestamp,
}

impl ColumnType {
    /// MySQL DDL type string.
    pub fn to_ddl(&self) -> String {
        match self {
            ColumnType::Int => "INT".to_string(),
            ColumnType::UnsignedInt => "INT UNSIGNED".to_string(),
            ColumnType::VarChar { length } => format!("VARCHAR({length})"),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
        }
    }
}

/// Whether a table lives for the session only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableKind {
    #[default]
    Persistent,
    Temporary,
}

/// One column of a fixture table.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureColumn {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    /// Literal SQL default, already quoted where needed.
    pub default: Option<String>,
    pub auto_increment: bool,
}

impl FixtureColumn {
    /// A `NOT NULL` column without default.
    pub fn required(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
            auto_increment: false,
        }
    }

    /// A nullable column defaulting to `NULL`.
    pub fn nullable(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            nullable: true,
            ..Self::required(name, column_type)
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    fn to_ddl(&self) -> String {
        let mut def = format!("`{}` {}", self.name, self.column_type.to_ddl());
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        match &self.default {
            Some(default) => {
                def.push_str(" DEFAULT ");
                def.push_str(default);
            }
            None if self.nullable => def.push_str(" DEFAULT NULL"),
            None => {}
        }
        if self.auto_increment {
            def.push_str(" AUTO_INCREMENT");
        }
        def
    }
}

/// A fixture table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureTable {
    pub name: String,
    pub columns: Vec<FixtureColumn>,
    pub primary_key: Vec<String>,
}

impl FixtureTable {
    /// The generic two-column table.
    pub fn testtable() -> Self {
        Self {
            name: "testtable".to_string(),
            columns: vec![
                FixtureColumn::required("id", ColumnType::Int).with_auto_increment(),
                FixtureColumn::required("first_name", ColumnType::VarChar { length: 45 })
                    .with_default("'AA'"),
                FixtureColumn::required("last_name", ColumnType::VarChar { length: 45 })
                    .with_default("'BB'"),
            ],
            primary_key: vec!["id".to_string()],
        }
    }

    /// The fixed-width sensor-reading table.
    pub fn reading30compact() -> Self {
        let mut columns = vec![
            FixtureColumn::required("date", ColumnType::Timestamp)
                .with_default("'1970-01-02 00:00:00'"),
            FixtureColumn::required("ss_id", ColumnType::UnsignedInt),
        ];
        columns.extend(
            (1..=MEASUREMENT_COLUMNS).map(|i| FixtureColumn::nullable(format!("t{i}"), ColumnType::Float)),
        );

        Self {
            name: "reading30compact".to_string(),
            columns,
            primary_key: vec!["date".to_string(), "ss_id".to_string()],
        }
    }

    /// Both fixture tables, in creation order.
    pub fn all() -> Vec<Self> {
        vec![Self::testtable(), Self::reading30compact()]
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Names of the measurement columns (`t1..tN`); empty for tables without them.
    pub fn measurement_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.nullable)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// `CREATE [TEMPORARY] TABLE IF NOT EXISTS ...` without trailing semicolon.
    pub fn create_statement(&self, kind: TableKind) -> String {
        let temporary = match kind {
            TableKind::Persistent => "",
            TableKind::Temporary => "TEMPORARY ",
        };
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("  {}", c.to_ddl()))
            .collect();
        let pk = self
            .primary_key
            .iter()
            .map(|c| format!("`{c}`"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("  PRIMARY KEY ({pk})"));

        format!(
            "CREATE {temporary}TABLE IF NOT EXISTS `{}` (\n{}\n) ENGINE=InnoDB",
            self.name,
            lines.join(",\n")
        )
    }

    /// `DROP TABLE IF EXISTS ...` without trailing semicolon.
    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS `{}`", self.name)
    }
}

/// The idempotent fixture script: drop-if-exists then create-if-not-exists
/// for every fixture table.
pub fn test_schema_script() -> String {
    let mut script = String::from(SCRIPT_HEADER);
    for table in FixtureTable::all() {
        script.push('\n');
        script.push_str(&table.drop_statement());
        script.push_str(";\n");
        script.push_str(&table.create_statement(TableKind::Persistent));
        script.push_str(";\n");
    }
    script
}

/// Split a SQL script into statements.
///
/// Splits on `;` outside quoted strings and identifiers. Drops `-- ` and `#`
/// comments (up to the end of the line) and empty statements.
pub fn split_script(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' && q != '`' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            ';' => push_statement(&mut statements, &mut current),
            '#' => skip_line(&mut chars),
            '-' if chars.peek() == Some(&'-') && starts_comment(&chars) => skip_line(&mut chars),
            _ => current.push(c),
        }
    }
    push_statement(&mut statements, &mut current);
    statements
}

/// `--` only opens a comment when followed by whitespace or the end of input.
fn starts_comment(chars: &std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    let mut ahead = chars.clone();
    ahead.next();
    ahead.next().map_or(true, char::is_whitespace)
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    for c in chars.by_ref() {
        if c == '\n' {
            break;
        }
    }
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}
