use anyhow::Context;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub async fn read_json(path: &Path) -> anyhow::Result<Value> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Loaded input file");
    Ok(value)
}

/// Read the events file and, when given, the metrics file concurrently.
pub async fn load_inputs(
    events: &Path,
    metrics: Option<&Path>,
) -> anyhow::Result<(Value, Option<Value>)> {
    let metrics_read = async {
        match metrics {
            Some(path) => read_json(path).await.map(Some),
            None => Ok(None),
        }
    };
    tokio::try_join!(read_json(events), metrics_read)
}
