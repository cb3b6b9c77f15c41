#![allow(dead_code)]

use crate::{
    mysql_endpoint, mysql_pool, pg_client, pg_endpoint, reset_mysql_tables, reset_postgres_schema,
};
use connectors::provider::DriverProvider;
use engine_config::{report::ValidationReport, settings::ValidatorSettings};
use engine_runtime::{error::ValidationError, execution::executor::run};
use model::{
    catalog::{
        QueryCatalog,
        query::{BenchmarkQuery, ResultShape, ValidationQuery},
    },
    execution::endpoint::Endpoint,
};
use mysql_async::prelude::Queryable;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

pub const FIXTURE_TABLES: &[&str] = &["customers", "invoices"];

/// `customers` as it lives on the MySQL source.
pub const MYSQL_CUSTOMERS_DDL: &str = r#"
    CREATE TABLE customers (
        id INT UNSIGNED PRIMARY KEY,
        name VARCHAR(80) NOT NULL,
        email VARCHAR(120) NULL,
        active TINYINT(1) NOT NULL,
        signed_up DATETIME NOT NULL
    )
"#;

/// The same table after migration to Postgres: wider integer, native boolean.
pub const PG_CUSTOMERS_DDL: &str = r#"
    CREATE TABLE customers (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        email VARCHAR(120) NULL,
        active BOOLEAN NOT NULL,
        signed_up TIMESTAMP NOT NULL
    )
"#;

pub const MYSQL_INVOICES_DDL: &str = r#"
    CREATE TABLE invoices (
        id INT PRIMARY KEY,
        customer_id INT UNSIGNED NOT NULL,
        amount DECIMAL(10, 2) NOT NULL,
        ratio DOUBLE NOT NULL
    )
"#;

/// `amount_scale` lets a test reproduce a lossy migration.
pub fn pg_invoices_ddl(amount_scale: u32) -> String {
    format!(
        r#"
        CREATE TABLE invoices (
            id INTEGER PRIMARY KEY,
            customer_id BIGINT NOT NULL,
            amount NUMERIC(14, {amount_scale}) NOT NULL,
            ratio DOUBLE PRECISION NOT NULL
        )
    "#
    )
}

pub const CUSTOMER_ROWS: &str = r#"
    INSERT INTO customers (id, name, email, active, signed_up) VALUES
        (1, 'Ada Lovelace', 'ada@example.com', 1, '2023-01-15 09:30:00'),
        (2, 'Alan Turing', NULL, 0, '2023-02-01 12:00:00'),
        (3, 'Grace Hopper', 'grace@example.com', 1, '2023-03-20 17:45:10'),
        (4, 'Edsger Dijkstra', '', 1, '2023-04-02 08:00:00')
"#;

pub const PG_CUSTOMER_ROWS: &str = r#"
    INSERT INTO customers (id, name, email, active, signed_up) VALUES
        (1, 'Ada Lovelace', 'ada@example.com', TRUE, '2023-01-15 09:30:00'),
        (2, 'Alan Turing', NULL, FALSE, '2023-02-01 12:00:00'),
        (3, 'Grace Hopper', 'grace@example.com', TRUE, '2023-03-20 17:45:10'),
        (4, 'Edsger Dijkstra', '', TRUE, '2023-04-02 08:00:00')
"#;

pub const INVOICE_ROWS: &str = r#"
    INSERT INTO invoices (id, customer_id, amount, ratio) VALUES
        (10, 1, 120.50, 0.25),
        (11, 1, 99.99, 0.5),
        (12, 3, 1000.00, 0.125),
        (13, 4, 0.05, 1.0)
"#;

/// Recreates the fixture tables on both engines with the same logical data.
pub async fn seed_fixtures(pg_amount_scale: u32) {
    reset_mysql_tables(FIXTURE_TABLES).await;
    reset_postgres_schema().await;

    mysql_batch(&[MYSQL_CUSTOMERS_DDL, MYSQL_INVOICES_DDL, CUSTOMER_ROWS, INVOICE_ROWS]).await;

    let pg = pg_client().await;
    for sql in [
        PG_CUSTOMERS_DDL,
        &pg_invoices_ddl(pg_amount_scale),
        PG_CUSTOMER_ROWS,
        INVOICE_ROWS,
    ] {
        pg.batch_execute(sql).await.expect("seed postgres");
    }
}

pub async fn mysql_batch(statements: &[&str]) {
    let pool = mysql_pool().await;
    let mut conn = pool.get_conn().await.expect("mysql connection");
    for sql in statements {
        conn.query_drop(*sql).await.expect("seed mysql");
    }
    drop(conn);
    pool.disconnect().await.expect("disconnect mysql pool");
}

pub async fn pg_execute(sql: &str) {
    pg_client()
        .await
        .batch_execute(sql)
        .await
        .expect("execute postgres statement");
}

/// Checks a migrated customer base would typically carry.
pub fn customer_catalog() -> QueryCatalog {
    QueryCatalog::new("customers", "1")
        .with_validation(
            "customer_count",
            ValidationQuery::new(
                "SELECT COUNT(*) FROM customers",
                "SELECT COUNT(*) FROM customers",
                ResultShape::Count,
            ),
        )
        .with_validation(
            "customer_rows",
            ValidationQuery::new(
                "SELECT id, name, email, active, signed_up FROM customers",
                "SELECT id, name, email, active, signed_up FROM customers",
                ResultShape::Rows,
            ),
        )
        .with_validation(
            "invoice_rows",
            ValidationQuery::new(
                "SELECT id, customer_id, amount, ratio FROM invoices",
                "SELECT id, customer_id, amount, ratio FROM invoices",
                ResultShape::Rows,
            ),
        )
        .with_validation(
            "revenue_per_customer",
            ValidationQuery::new(
                "SELECT customer_id, SUM(amount) AS total FROM invoices GROUP BY customer_id",
                "SELECT customer_id, SUM(amount) AS total FROM invoices GROUP BY customer_id",
                ResultShape::Rows,
            ),
        )
        .with_benchmark(
            "customer_lookup",
            BenchmarkQuery::new(
                "SELECT name FROM customers WHERE id = 3",
                Duration::from_secs(5),
            ),
        )
}

pub fn fast_settings() -> ValidatorSettings {
    ValidatorSettings {
        repetition_count: 3,
        warmup_runs: 1,
        connect_retries: 0,
        query_timeout: Some(Duration::from_secs(10)),
        ..Default::default()
    }
}

/// Runs a validation from the MySQL fixture database to the Postgres one.
pub async fn validate(
    catalog: &QueryCatalog,
    settings: ValidatorSettings,
) -> Result<ValidationReport, ValidationError> {
    validate_between(mysql_endpoint(), pg_endpoint(), catalog, settings).await
}

pub async fn validate_between(
    source: Endpoint,
    target: Endpoint,
    catalog: &QueryCatalog,
    settings: ValidatorSettings,
) -> Result<ValidationReport, ValidationError> {
    run(
        Arc::new(DriverProvider::new(Duration::from_secs(5))),
        settings,
        Arc::new(source),
        Arc::new(target),
        catalog,
        CancellationToken::new(),
    )
    .await
}
