use crate::domain::{Category, ClassifiedRecord};
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_TOP_ERRORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorFrequency {
    pub message: String,
    pub category: Category,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorAnalysis {
    pub error_count: u64,
    pub unique_errors: usize,
    pub error_rate: f64,
    pub top_errors: Vec<ErrorFrequency>,
}

/// Count failure messages (ERROR, TIMEOUT, OUT_OF_MEMORY) and keep the
/// `limit` most frequent. Ties keep first-seen order.
pub fn top_errors(records: &[ClassifiedRecord], limit: usize) -> ErrorAnalysis {
    // message -> (first index, category, count)
    let mut seen: HashMap<&str, (usize, Category, u64)> = HashMap::new();
    let mut error_count = 0;

    for record in records.iter().filter(|r| r.category.is_failure()) {
        error_count += 1;
        let message = record.record.message.trim();
        let next_index = seen.len();
        seen.entry(message)
            .or_insert((next_index, record.category, 0))
            .2 += 1;
    }

    let unique_errors = seen.len();
    let mut ranked: Vec<(&str, (usize, Category, u64))> = seen.into_iter().collect();
    ranked.sort_by(|(_, (a_index, _, a_count)), (_, (b_index, _, b_count))| {
        b_count.cmp(a_count).then(a_index.cmp(b_index))
    });

    let error_rate = if records.is_empty() {
        0.0
    } else {
        error_count as f64 / records.len() as f64
    };

    ErrorAnalysis {
        error_count,
        unique_errors,
        error_rate,
        top_errors: ranked
            .into_iter()
            .take(limit)
            .map(|(message, (_, category, count))| ErrorFrequency {
                message: message.to_string(),
                category,
                count,
            })
            .collect(),
    }
}
