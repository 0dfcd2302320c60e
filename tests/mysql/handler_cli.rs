//! The `mysql-handler` binary end to end.

use mysql_handler::testing::create_mysql_options;
use mysql_handler::MysqlOptions;
use std::process::{Command, Output};

const TABLE: &str = "cli_people";

fn execute_mysql_handler(args: &[&str]) -> std::io::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_mysql-handler"))
        .args(args)
        .env("RUST_LOG", "mysql_handler=debug")
        .env_remove("MYSQL_SECRETS_FILE")
        .env_remove("MYSQL_HOST")
        .env_remove("MYSQL_PORT")
        .env_remove("MYSQL_USER")
        .env_remove("MYSQL_PASSWORD")
        .env_remove("MYSQL_DATABASE")
        .output()
}

fn connection_args(options: &MysqlOptions) -> Vec<String> {
    vec![
        "--mysql-host".to_string(),
        options.host.clone(),
        "--mysql-port".to_string(),
        options.port.to_string(),
        "--mysql-user".to_string(),
        options.user.clone(),
        "--mysql-password".to_string(),
        options.password.clone(),
        "--mysql-database".to_string(),
        options.database.clone(),
    ]
}

fn run(options: &MysqlOptions, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let connection = connection_args(options);
    let mut all: Vec<&str> = connection.iter().map(String::as_str).collect();
    all.extend_from_slice(args);
    let output = execute_mysql_handler(&all)?;
    assert_cli_success(&output, &args.join(" "));
    Ok(String::from_utf8(output.stdout)?)
}

fn assert_cli_success(output: &Output, command_desc: &str) {
    if !output.status.success() {
        panic!(
            "{} failed!\nExit code: {:?}\nStdout: {}\nStderr: {}",
            command_desc,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[test]
fn test_cli_help() -> Result<(), Box<dyn std::error::Error>> {
    let output = execute_mysql_handler(&["--help"])?;
    assert_cli_success(&output, "--help");
    let stdout = String::from_utf8(output.stdout)?;
    for command in ["apply-schema", "execute", "fetch", "truncate", "reset-auto-increment"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
    Ok(())
}

#[test]
fn test_cli_connection_failure_hides_password() -> Result<(), Box<dyn std::error::Error>> {
    let output = execute_mysql_handler(&[
        "--mysql-password",
        "s3cret-password",
        "execute",
        "select 1",
    ])?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Error: Failed to execute statement"));
    assert!(stderr.contains("database_host_is_not_set"));
    assert!(!stderr.contains("s3cret-password"));
    Ok(())
}

#[test]
#[ignore = "requires a MySQL server (set MYSQL_TEST_* env)"]
fn test_cli_execute_fetch_and_reset() -> Result<(), Box<dyn std::error::Error>> {
    let options = create_mysql_options()?;

    run(&options, &["execute", &format!("DROP TABLE IF EXISTS {TABLE}")])?;
    run(
        &options,
        &[
            "execute",
            &format!(
                "CREATE TABLE {TABLE} (id INT NOT NULL AUTO_INCREMENT PRIMARY KEY, \
                 name VARCHAR(45) NOT NULL)"
            ),
        ],
    )?;
    run(
        &options,
        &[
            "execute",
            &format!("insert into {TABLE} (name) values (?), (?)"),
            "--param",
            "Ann",
            "--param",
            "Bob",
        ],
    )?;

    let stdout = run(
        &options,
        &["fetch", &format!("select id, name from {TABLE} order by id")],
    )?;
    let rows: Vec<serde_json::Value> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(
        rows,
        vec![
            serde_json::json!({"id": 1, "name": "Ann"}),
            serde_json::json!({"id": 2, "name": "Bob"}),
        ]
    );

    let stdout = run(
        &options,
        &[
            "fetch",
            &format!("select name from {TABLE} where id = ?"),
            "--param",
            "99",
            "--one",
        ],
    )?;
    assert_eq!(stdout.trim(), "null");

    run(&options, &["execute", &format!("delete from {TABLE} where id = 2")])?;
    let stdout = run(&options, &["reset-auto-increment", TABLE, "id"])?;
    assert_eq!(stdout.trim(), "2");

    run(&options, &["truncate", TABLE])?;
    let stdout = run(&options, &["fetch", &format!("select * from {TABLE}")])?;
    assert!(stdout.is_empty());

    run(&options, &["execute", &format!("DROP TABLE {TABLE}")])?;
    Ok(())
}
