use crate::error::CliError;
use engine_config::report::{ValidationReport, performance::Improvement};
use std::path::Path;

fn generate_report_json(report: &ValidationReport) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

pub async fn write_report(report: &ValidationReport, path: &Path) -> Result<(), CliError> {
    let report_json = generate_report_json(report)?;
    tokio::fs::write(path, report_json).await?;
    print_summary_table(report);
    Ok(())
}

pub fn print_report(report: &ValidationReport) -> Result<(), CliError> {
    let report_json = generate_report_json(report)?;
    println!("{report_json}");
    Ok(())
}

pub fn print_summary_table(report: &ValidationReport) {
    println!(
        "Run {} ({} -> {}), catalog '{}' v{}:",
        report.run_id, report.source.id, report.target.id, report.catalog.name, report.catalog.version
    );
    println!("-----------------------------");
    for result in &report.integrity {
        println!(
            "{:<32} {:<10} counts {:<5} checksums {}",
            result.name,
            format!("{:?}", result.status).to_lowercase(),
            result.counts_match,
            result.checksums_match
        );
    }
    for result in &report.performance {
        let improvement = match result.improvement {
            Improvement::Percent(pct) => format!("{pct:+.1}%"),
            Improvement::Undefined => "undefined".to_string(),
        };
        let target = result
            .target_avg_ms
            .map(|ms| format!("{ms:.2}ms"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<32} {:<10} target {:<10} sla {}ms improvement {}",
            result.name,
            if result.meets_sla { "meets-sla" } else { "misses-sla" },
            target,
            result.sla_ms,
            improvement
        );
    }
    if let Some(interruption) = report.interruption {
        println!("Interrupted: {interruption:?}");
    }
}
