//! Pattern classifier.
//!
//! Applies the ordered signature table in `rules` to each record's message
//! and attaches a category plus whatever fields the matching rule extracts.

pub mod regex_error;
pub mod regex_table;
pub mod rules;
pub mod thresholds;

use crate::domain::{Category, ClassifiedRecord, FieldValue, LogRecord, fields};
use regex::Regex;
use std::collections::BTreeMap;

pub use regex_error::RegexError;
pub use regex_table::RegexTable;
pub use rules::{CategoryRule, Extractor, SIGNATURE_RULES, SignatureRule};
pub use thresholds::ClassificationThresholds;

/// Compiled field extractors, looked up once from the field table.
#[derive(Debug, Clone)]
struct FieldPatterns {
    request_id: Regex,
    durations: Regex,
    memory_size: Regex,
    max_memory_used: Regex,
    exception_type: Regex,
}

impl FieldPatterns {
    fn from_table(table: &RegexTable) -> Result<Self, RegexError> {
        Ok(Self {
            request_id: table.get_by_name(rules::FIELD_REQUEST_ID)?.clone(),
            durations: table.get_by_name(rules::FIELD_DURATIONS)?.clone(),
            memory_size: table.get_by_name(rules::FIELD_MEMORY_SIZE)?.clone(),
            max_memory_used: table.get_by_name(rules::FIELD_MAX_MEMORY_USED)?.clone(),
            exception_type: table.get_by_name(rules::FIELD_EXCEPTION_TYPE)?.clone(),
        })
    }
}

/// Stateless, deterministic classifier.
///
/// Holds only compiled patterns and thresholds, so one instance can be
/// shared across threads and reused for any number of requests.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: &'static [SignatureRule],
    rule_patterns: RegexTable,
    field_patterns: FieldPatterns,
    thresholds: ClassificationThresholds,
}

impl Classifier {
    pub fn new(thresholds: ClassificationThresholds) -> Result<Self, RegexError> {
        let rule_patterns = RegexTable::compile(&rules::rule_patterns())?;
        let field_table = RegexTable::compile(rules::FIELD_PATTERNS)?;
        let field_patterns = FieldPatterns::from_table(&field_table)?;

        Ok(Self {
            rules: SIGNATURE_RULES,
            rule_patterns,
            field_patterns,
            thresholds,
        })
    }

    pub fn thresholds(&self) -> &ClassificationThresholds {
        &self.thresholds
    }

    /// Rule names in precedence order.
    pub fn rule_names(&self) -> &[&'static str] {
        self.rule_patterns.names()
    }

    /// The first rule whose pattern matches `message`, if any.
    pub fn matching_rule(&self, message: &str) -> Option<&SignatureRule> {
        self.first_match(message).map(|(rule, _)| rule)
    }

    pub fn classify(&self, record: LogRecord) -> ClassifiedRecord {
        let Some((rule, regex)) = self.first_match(&record.message) else {
            return ClassifiedRecord {
                record,
                category: Category::Info,
                extracted_fields: BTreeMap::new(),
            };
        };

        let extracted_fields = self.extract(rule.extractor, regex, &record.message);
        let category = match rule.category {
            CategoryRule::Fixed(category) => category,
            CategoryRule::ExecutionReport => self.report_category(&extracted_fields),
        };

        ClassifiedRecord {
            record,
            category,
            extracted_fields,
        }
    }

    pub fn classify_all(&self, records: Vec<LogRecord>) -> Vec<ClassifiedRecord> {
        records
            .into_iter()
            .map(|record| self.classify(record))
            .collect()
    }

    fn first_match(&self, message: &str) -> Option<(&SignatureRule, &Regex)> {
        self.rules
            .iter()
            .zip(self.rule_patterns.iter())
            .find(|(_, (_, regex))| regex.is_match(message))
            .map(|(rule, (_, regex))| (rule, regex))
    }

    fn report_category(&self, extracted: &BTreeMap<String, FieldValue>) -> Category {
        let number = |name: &str| extracted.get(name).and_then(FieldValue::as_number);

        if self.thresholds.duration_exceeded(number(fields::DURATION_MS))
            || self
                .thresholds
                .memory_exceeded(number(fields::MEMORY_UTILIZATION))
        {
            Category::Warning
        } else {
            Category::Info
        }
    }

    fn extract(
        &self,
        extractor: Extractor,
        rule_regex: &Regex,
        message: &str,
    ) -> BTreeMap<String, FieldValue> {
        let mut extracted = BTreeMap::new();

        match extractor {
            Extractor::None => {}
            Extractor::ExecutionReport => self.extract_report(message, &mut extracted),
            Extractor::Timeout => {
                insert_number(&mut extracted, fields::TIMEOUT_SECONDS, first_capture(rule_regex, message));
            }
            Extractor::HttpStatus => {
                insert_number(&mut extracted, fields::HTTP_STATUS, first_capture(rule_regex, message));
            }
            Extractor::Exception => {
                if let Some(name) = first_capture(&self.field_patterns.exception_type, message) {
                    extracted.insert(
                        fields::EXCEPTION_TYPE.to_string(),
                        FieldValue::Text(name.to_string()),
                    );
                }
            }
        }

        extracted
    }

    fn extract_report(&self, message: &str, extracted: &mut BTreeMap<String, FieldValue>) {
        let patterns = &self.field_patterns;

        if let Some(request_id) = first_capture(&patterns.request_id, message) {
            extracted.insert(
                fields::REQUEST_ID.to_string(),
                FieldValue::Text(request_id.to_string()),
            );
        }

        for captures in patterns.durations.captures_iter(message) {
            let field = match captures.get(1).map(|m| m.as_str()) {
                Some("Billed") => fields::BILLED_DURATION_MS,
                Some("Init") => fields::INIT_DURATION_MS,
                _ => fields::DURATION_MS,
            };
            // First occurrence wins when a message repeats a field
            if !extracted.contains_key(field) {
                insert_number(extracted, field, captures.get(2).map(|m| m.as_str()));
            }
        }

        insert_number(extracted, fields::MEMORY_SIZE_MB, first_capture(&patterns.memory_size, message));
        insert_number(
            extracted,
            fields::MAX_MEMORY_USED_MB,
            first_capture(&patterns.max_memory_used, message),
        );

        let memory_size = extracted.get(fields::MEMORY_SIZE_MB).and_then(FieldValue::as_number);
        let memory_used = extracted
            .get(fields::MAX_MEMORY_USED_MB)
            .and_then(FieldValue::as_number);
        if let (Some(size), Some(used)) = (memory_size, memory_used)
            && size > 0.0
        {
            extracted.insert(
                fields::MEMORY_UTILIZATION.to_string(),
                FieldValue::Number(used / size),
            );
        }
    }
}

fn first_capture<'m>(regex: &Regex, message: &'m str) -> Option<&'m str> {
    regex
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Insert a numeric field, silently dropping values that do not parse.
fn insert_number(extracted: &mut BTreeMap<String, FieldValue>, field: &str, raw: Option<&str>) {
    if let Some(value) = raw.and_then(parse_number) {
        extracted.insert(field.to_string(), FieldValue::Number(value));
    }
}

/// Parse integer or fractional text; non-finite results count as unparsable.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_end_matches(',')
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
