#[cfg(test)]
mod tests {
    use crate::{
        mysql_endpoint, pg_endpoint,
        utils::{customer_catalog, fast_settings, pg_execute, seed_fixtures, validate, validate_between},
    };
    use engine_config::report::{
        failure::{FailureKind, Side},
        integrity::CheckStatus,
        performance::BenchmarkStatus,
    };
    use model::{
        catalog::{
            QueryCatalog,
            query::{ResultShape, ValidationQuery},
        },
        execution::endpoint::Endpoint,
    };
    use tracing_test::traced_test;

    // Scenario: Both engines hold the same customers and invoices, typed the
    // way a real migration would type them (UNSIGNED INT -> BIGINT, TINYINT(1) -> BOOLEAN).
    // Expected Outcome: every check passes and the benchmark completes.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires live MySQL and Postgres"]
    async fn migrated_tables_pass() {
        seed_fixtures(2).await;

        let report = validate(&customer_catalog(), fast_settings())
            .await
            .expect("validation run");

        for result in &report.integrity {
            assert_eq!(result.status, CheckStatus::Passed, "{}: {:?}", result.name, result);
        }
        assert_eq!(
            report.integrity_result("customer_count").unwrap().source_count,
            Some(4)
        );
        assert_eq!(
            report.integrity_result("customer_rows").unwrap().target_count,
            Some(4)
        );

        let lookup = report.performance_result("customer_lookup").unwrap();
        assert_eq!(lookup.status, BenchmarkStatus::Completed);
        assert_eq!(lookup.source_samples, 3);
        assert_eq!(lookup.target_samples, 3);
        assert!(lookup.meets_sla);
        assert!(report.summary.is_clean());
    }

    // Scenario: The target column was created as NUMERIC(14,1), so cents were rounded away.
    // Expected Outcome: counts still match, checksums do not, the check is a mismatch.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires live MySQL and Postgres"]
    async fn rounded_amounts_are_a_mismatch() {
        seed_fixtures(1).await;

        let report = validate(&customer_catalog(), fast_settings())
            .await
            .expect("validation run");

        let invoices = report.integrity_result("invoice_rows").unwrap();
        assert_eq!(invoices.status, CheckStatus::Mismatch);
        assert!(invoices.counts_match);
        assert!(!invoices.checksums_match);
        assert!(report.integrity_result("customer_rows").unwrap().passed());
    }

    // Scenario: One customer row was lost on the target and another was modified.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires live MySQL and Postgres"]
    async fn lost_and_modified_rows_are_detected() {
        seed_fixtures(2).await;
        pg_execute("DELETE FROM customers WHERE id = 2").await;
        pg_execute("UPDATE customers SET email = NULL WHERE id = 4").await;

        let report = validate(&customer_catalog(), fast_settings())
            .await
            .expect("validation run");

        let count = report.integrity_result("customer_count").unwrap();
        assert_eq!(count.status, CheckStatus::Mismatch);
        assert_eq!((count.source_count, count.target_count), (Some(4), Some(3)));

        let rows = report.integrity_result("customer_rows").unwrap();
        assert!(!rows.counts_match);
        assert!(!rows.checksums_match);
        assert!(report.summary.mismatched >= 2);
    }

    // Scenario: The target query references a table that was never migrated.
    // Expected Outcome: that check fails on the target side, the others still run.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires live MySQL and Postgres"]
    async fn missing_target_table_fails_one_check() {
        seed_fixtures(2).await;
        let catalog = customer_catalog().with_validation(
            "refunds",
            ValidationQuery::new(
                "SELECT COUNT(*) FROM customers",
                "SELECT COUNT(*) FROM refunds",
                ResultShape::Count,
            ),
        );

        let report = validate(&catalog, fast_settings())
            .await
            .expect("validation run");

        let refunds = report.integrity_result("refunds").unwrap();
        assert_eq!(refunds.status, CheckStatus::Failed);
        let failure = refunds.failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::Query);
        assert_eq!(failure.side, Side::Target);
        assert_eq!(refunds.source_count, Some(4));
        assert!(report.integrity_result("customer_rows").unwrap().passed());
        assert_eq!(report.summary.failed, 1);
    }

    // Scenario: Nothing listens on either endpoint.
    // Expected Outcome: the run aborts before any query; no report is produced.
    #[traced_test]
    #[tokio::test]
    async fn unreachable_endpoints_abort_the_run() {
        let source = Endpoint::from_url("dead_mysql", "mysql://user:pw@127.0.0.1:1/none").unwrap();
        let target =
            Endpoint::from_url("dead_pg", "postgres://user:pw@127.0.0.1:1/none?sslmode=disable")
                .unwrap();
        let catalog = QueryCatalog::new("empty", "1").with_validation(
            "anything",
            ValidationQuery::new("SELECT 1", "SELECT 1", ResultShape::Count),
        );

        let err = validate_between(source, target, &catalog, fast_settings())
            .await
            .expect_err("run should abort");
        assert!(err.is_aborted(), "unexpected error: {err}");
    }

    // Scenario: Same engine on both sides, source and target pointing at one database.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires live MySQL and Postgres"]
    async fn self_comparison_is_clean() {
        seed_fixtures(2).await;
        let catalog = customer_catalog();

        let report = validate_between(pg_endpoint(), pg_endpoint(), &catalog, fast_settings())
            .await
            .expect("validation run");
        assert!(report.summary.is_clean());

        let report = validate_between(mysql_endpoint(), mysql_endpoint(), &catalog, fast_settings())
            .await
            .expect("validation run");
        assert!(report.summary.is_clean());
    }
}
