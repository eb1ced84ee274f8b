mod bootstrap;

use std::process::ExitCode;

use anyhow::Result;
use etl_core::settings::Settings;
use etl_core::time_utils::SystemClock;
use etl_runtime::pipeline::{Pipeline, RunOutcome};

/// Exit status used when the input file is missing and `--fail-on-missing`
/// is set.
const EXIT_MISSING_SOURCE: u8 = 2;

fn main() -> Result<ExitCode> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!(
        "data-automation-service v{} starting",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        "Source: {:?}, reports: {}, timezone: {}",
        settings.source,
        settings.reports_dir.display(),
        settings.timezone
    );

    let config = settings.to_pipeline_config()?;
    let clock = SystemClock::from_name(&settings.timezone);
    let pipeline = Pipeline::new(config, clock);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = pipeline.run(&mut out)?;

    match &outcome {
        RunOutcome::Completed(report) => {
            tracing::info!(
                "Run finished in state {:?}: {} records, {} skipped",
                report.state,
                report.records,
                report.skipped
            );
        }
        RunOutcome::MissingSource(path) => {
            tracing::warn!("No input at {}; nothing written", path.display());
        }
    }

    Ok(ExitCode::from(exit_status(&outcome, settings.fail_on_missing)))
}

/// Process exit status for a finished run.
///
/// A missing input exits 0 unless `fail_on_missing` is set.
fn exit_status(outcome: &RunOutcome, fail_on_missing: bool) -> u8 {
    match outcome {
        RunOutcome::Completed(_) => 0,
        RunOutcome::MissingSource(_) if fail_on_missing => EXIT_MISSING_SOURCE,
        RunOutcome::MissingSource(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use etl_core::time_utils::FixedClock;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_exit_status_missing_source_defaults_to_success() {
        let outcome = RunOutcome::MissingSource(PathBuf::from("data/in.csv"));
        assert_eq!(exit_status(&outcome, false), 0);
    }

    #[test]
    fn test_exit_status_missing_source_with_flag() {
        let outcome = RunOutcome::MissingSource(PathBuf::from("data/in.csv"));
        assert_eq!(exit_status(&outcome, true), EXIT_MISSING_SOURCE);
    }

    #[test]
    fn test_cli_args_drive_a_csv_run() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("transactions.csv");
        std::fs::write(
            &input,
            "transaction_id,date,price,city,district,area_m2,rooms\n\
             1,2024-01-10,500000,Dubai,Marina,80,2\n\
             2,2024-01-11,700000,Dubai,Marina,100,3\n",
        )
        .unwrap();
        let reports = tmp.path().join("reports");

        let settings = Settings::load_from_args([
            "data-automation-service".into(),
            "--source".into(),
            "csv".into(),
            "--input".into(),
            input.into_os_string(),
            "--reports-dir".into(),
            reports.clone().into_os_string(),
        ]);
        let config = settings.to_pipeline_config().unwrap();
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        let mut out = Vec::new();
        let outcome = Pipeline::new(config, clock).run(&mut out).unwrap();

        assert_eq!(exit_status(&outcome, true), 0);
        assert!(reports.join("real_estate_summary_20240201.json").is_file());
    }
}
