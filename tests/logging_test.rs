use lambda_insights::app::log_report;
use lambda_insights::{
    AnalysisConfig, AnalysisInput, BucketWidth, ClassificationThresholds, TimeRange, analyze,
};
use serde_json::json;
use tracing_test::traced_test;

fn report_with_skips() -> lambda_insights::AnalysisReport {
    let events = json!([
        {"timestamp": 1_000, "message": "ERROR boom", "logGroupName": "/aws/lambda/orders"},
        {"timestamp": 2_000, "message": "no group"},
        {"message": "no timestamp"}
    ]);
    let config = AnalysisConfig::new(ClassificationThresholds::new(1000.0, 0.9).unwrap())
        .with_bucket_width(BucketWidth::MINUTE);
    analyze(
        &AnalysisInput::new(TimeRange::new(0, 60_000).unwrap(), &events),
        &config,
    )
    .unwrap()
}

#[traced_test]
#[test]
fn test_log_report_summarises_analysis() {
    log_report(&report_with_skips());

    assert!(logs_contain("Analysis complete"));
    assert!(logs_contain("bucket_width_ms=60000"));
    assert!(logs_contain("Failures found in range"));
}

#[traced_test]
#[test]
fn test_log_report_warns_about_skips() {
    log_report(&report_with_skips());

    assert!(logs_contain("Skipped input records"));
    assert!(logs_contain("normalize=1"));
    assert!(logs_contain("out_of_range=0"));
}
