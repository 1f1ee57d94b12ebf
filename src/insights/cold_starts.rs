use crate::domain::{ClassifiedRecord, fields};
use serde::Serialize;

/// Cold versus warm invocations over the execution reports in range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColdStartAnalysis {
    pub invocations: u64,
    pub cold_starts: u64,
    pub warm_starts: u64,
    pub cold_start_rate: f64,
    pub avg_cold_duration_ms: Option<f64>,
    pub avg_warm_duration_ms: Option<f64>,
    pub avg_init_duration_ms: Option<f64>,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: u64,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Split execution reports by whether they carry an init duration.
pub fn analyze_cold_starts(records: &[ClassifiedRecord]) -> ColdStartAnalysis {
    let mut cold = Mean::default();
    let mut warm = Mean::default();
    let mut init = Mean::default();

    for record in records.iter().filter(|record| record.is_execution_report()) {
        let Some(duration) = record.number(fields::DURATION_MS) else {
            continue;
        };
        match record.number(fields::INIT_DURATION_MS) {
            Some(init_duration) => {
                cold.push(duration);
                init.push(init_duration);
            }
            None => warm.push(duration),
        }
    }

    let invocations = cold.count + warm.count;
    let cold_start_rate = if invocations == 0 {
        0.0
    } else {
        cold.count as f64 / invocations as f64
    };

    ColdStartAnalysis {
        invocations,
        cold_starts: cold.count,
        warm_starts: warm.count,
        cold_start_rate,
        avg_cold_duration_ms: cold.value(),
        avg_warm_duration_ms: warm.value(),
        avg_init_duration_ms: init.value(),
    }
}
