//! Request-level insights that sit beside the bucketed series: the most
//! frequent failures, cold versus warm starts, a memory-size recommendation
//! and when invocations happen.

pub mod cold_starts;
pub mod errors;
pub mod memory;
pub mod patterns;

use crate::domain::ClassifiedRecord;
use serde::Serialize;

pub use cold_starts::{ColdStartAnalysis, analyze_cold_starts};
pub use errors::{DEFAULT_TOP_ERRORS, ErrorAnalysis, ErrorFrequency, top_errors};
pub use memory::{MemoryRecommendation, recommend_memory};
pub use patterns::{DayCount, HourCount, InvocationPatterns, invocation_patterns};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub errors: ErrorAnalysis,
    pub cold_starts: ColdStartAnalysis,
    pub memory: Option<MemoryRecommendation>,
    pub invocations: InvocationPatterns,
}

impl Insights {
    pub fn compute(records: &[ClassifiedRecord], top_errors_limit: usize) -> Self {
        Self {
            errors: top_errors(records, top_errors_limit),
            cold_starts: analyze_cold_starts(records),
            memory: recommend_memory(records),
            invocations: invocation_patterns(records),
        }
    }
}
