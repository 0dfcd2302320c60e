//! Fixture script idempotence and `reading30compact` behavior.

use mysql_async::{Params, Value};
use mysql_handler::schema::{self, TEST_SCHEMA_SQL};
use mysql_handler::statements::{FixtureTable, TableKind, MEASUREMENT_COLUMNS};
use mysql_handler::testing::create_mysql_options;
use mysql_handler::{HandlerError, MysqlHandler};

#[tokio::test]
#[ignore = "requires a MySQL server (set MYSQL_TEST_* env)"]
async fn test_schema_script_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    super::init_logging();

    let tables: Vec<String> = MysqlHandler::scope(create_mysql_options()?, |mh| {
        Box::pin(async move {
            schema::apply_script(mh, TEST_SCHEMA_SQL).await?;
            schema::apply_script(mh, TEST_SCHEMA_SQL).await?;
            mh.fetchall(
                "select table_name from information_schema.tables \
                 where table_schema = database() \
                 and table_name in ('testtable', 'reading30compact') \
                 order by table_name",
                (),
            )
            .await
        })
    })
    .await?;

    assert_eq!(tables, vec!["reading30compact", "testtable"]);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a MySQL server (set MYSQL_TEST_* env)"]
async fn test_reading_with_only_key_has_null_measurements() -> Result<(), Box<dyn std::error::Error>>
{
    super::init_logging();

    let maps = MysqlHandler::scope(create_mysql_options()?, |mh| {
        Box::pin(async move {
            schema::apply_test_schema(mh, TableKind::Temporary).await?;
            mh.truncate("reading30compact").await?;
            mh.execute(
                "insert into reading30compact (date, ss_id) values (?, ?)",
                ("2024-06-01 12:30:00", 7u32),
            )
            .await?;
            mh.fetchall_maps("select * from reading30compact", ()).await
        })
    })
    .await?;

    assert_eq!(maps.len(), 1);
    let row = &maps[0];
    assert_eq!(row.len(), MEASUREMENT_COLUMNS + 2);
    let nulls = (1..=MEASUREMENT_COLUMNS)
        .filter(|i| row[&format!("t{i}")] == Value::NULL)
        .count();
    assert_eq!(nulls, MEASUREMENT_COLUMNS);
    assert_ne!(row["ss_id"], Value::NULL);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a MySQL server (set MYSQL_TEST_* env)"]
async fn test_reading_date_defaults() -> Result<(), Box<dyn std::error::Error>> {
    super::init_logging();

    let date: Option<String> = MysqlHandler::scope(create_mysql_options()?, |mh| {
        Box::pin(async move {
            schema::apply_test_schema(mh, TableKind::Temporary).await?;
            mh.truncate("reading30compact").await?;
            mh.execute("insert into reading30compact (ss_id) values (?)", (9u32,))
                .await?;
            mh.fetchone(
                "select date_format(date, '%Y-%m-%d %H:%i:%s') from reading30compact \
                 where ss_id = ?",
                (9u32,),
            )
            .await
        })
    })
    .await?;

    assert_eq!(date.as_deref(), Some("1970-01-02 00:00:00"));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a MySQL server (set MYSQL_TEST_* env)"]
async fn test_reading_upsert_with_partial_measurements() -> Result<(), Box<dyn std::error::Error>>
{
    super::init_logging();

    // date, ss_id and the first 23 measurements
    let table = FixtureTable::reading30compact();
    let cols: Vec<String> = table
        .column_names()
        .into_iter()
        .take(25)
        .map(String::from)
        .collect();
    let keys = ["date", "ss_id"];
    let row = |offset: f32| {
        let mut values = vec![Value::from("2024-06-01 12:30:00"), Value::from(7u32)];
        values.extend((1..=23).map(|i| Value::from(i as f32 + offset)));
        Params::Positional(values)
    };

    let (t1, t23, t24): (Option<f32>, Option<f32>, Option<f32>) =
        MysqlHandler::scope(create_mysql_options()?, |mh| {
            Box::pin(async move {
                schema::apply_test_schema(mh, TableKind::Temporary).await?;
                mh.truncate("reading30compact").await?;
                mh.insert_on_duplicate_key_update("reading30compact", &cols, &keys, [row(0.0)], "")
                    .await?;
                // Same key, new values
                mh.insert_on_duplicate_key_update("reading30compact", &cols, &keys, [row(0.5)], "")
                    .await?;
                let count: Option<u64> = mh
                    .fetchone("select count(*) from reading30compact", ())
                    .await?;
                assert_eq!(count, Some(1));
                let values = mh
                    .fetchone("select t1, t23, t24 from reading30compact where ss_id = ?", (7u32,))
                    .await?;
                values.ok_or_else(|| HandlerError::Conversion {
                    statement: "select t1, t23, t24 from reading30compact".to_string(),
                    message: "no row".to_string(),
                })
            })
        })
        .await?;

    assert_eq!(t1, Some(1.5));
    assert_eq!(t23, Some(23.5));
    assert_eq!(t24, None);
    Ok(())
}
