use super::config::OutputFormat;
use crate::pipeline::AnalysisReport;
use crate::rows::{HealthRow, SummaryRow};
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Line<'a> {
    Summary(&'a SummaryRow),
    Health(&'a HealthRow),
}

/// Render the report as one JSON document or as NDJSON rows.
pub fn render_report(report: &AnalysisReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut rendered = serde_json::to_string_pretty(report)?;
            rendered.push('\n');
            Ok(rendered)
        }
        OutputFormat::Ndjson => {
            let summaries = report.summary_rows();
            let health = report.health_rows();
            let mut rendered = String::new();
            for line in summaries
                .iter()
                .map(Line::Summary)
                .chain(health.iter().map(Line::Health))
            {
                rendered.push_str(&serde_json::to_string(&line)?);
                rendered.push('\n');
            }
            Ok(rendered)
        }
    }
}

pub async fn write_report(
    report: &AnalysisReport,
    format: OutputFormat,
    path: Option<&Path>,
) -> anyhow::Result<()> {
    let rendered = render_report(report, format).context("Failed to serialize report")?;
    match path {
        Some(path) => tokio::fs::write(path, rendered)
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write report to stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{BucketWidth, TimeRange};
    use crate::classifier::ClassificationThresholds;
    use crate::pipeline::{AnalysisConfig, AnalysisInput, analyze};
    use serde_json::{Value, json};

    fn report() -> AnalysisReport {
        let events = json!([
            {"timestamp": 1_000, "message": "ERROR boom", "logGroupName": "/aws/lambda/orders"}
        ]);
        let metrics = json!([
            {"functionName": "orders", "metricName": "Invocations", "timestamp": 1_000, "value": 1}
        ]);
        let input = AnalysisInput {
            metric_samples: Some(&metrics),
            ..AnalysisInput::new(TimeRange::new(0, 120_000).unwrap(), &events)
        };
        let config = AnalysisConfig::new(ClassificationThresholds::new(500.0, 0.9).unwrap())
            .with_bucket_width(BucketWidth::MINUTE);
        analyze(&input, &config).unwrap()
    }

    #[test]
    fn test_ndjson_has_one_tagged_line_per_row() {
        let rendered = render_report(&report(), OutputFormat::Ndjson).unwrap();
        let lines: Vec<Value> = rendered
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["kind"], "summary");
        assert_eq!(lines[0]["error"], 1);
        assert_eq!(lines[1]["kind"], "summary");
        assert_eq!(lines[2]["kind"], "health");
        assert_eq!(lines[2]["function_name"], "orders");
    }

    #[test]
    fn test_json_is_a_single_document() {
        let rendered = render_report(&report(), OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["range"]["start_ms"], 0);
        assert_eq!(value["health"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.ndjson");

        write_report(&report(), OutputFormat::Ndjson, Some(&path))
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 3);
    }
}
