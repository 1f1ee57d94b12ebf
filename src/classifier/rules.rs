//! The ordered signature table.
//!
//! Rules are evaluated top to bottom and the first match wins, so the
//! position of a rule in `SIGNATURE_RULES` is its precedence. Memory
//! exhaustion and timeouts come before the generic error families because
//! their messages usually also contain an `Error` token.

use crate::domain::Category;

/// How a matching rule decides the record's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRule {
    Fixed(Category),
    /// `INFO`, or `WARNING` when the extracted duration or memory use
    /// exceeds the configured thresholds.
    ExecutionReport,
}

/// Which fields a matching rule pulls out of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    None,
    /// Request id, durations, memory size, memory used and utilisation.
    ExecutionReport,
    /// Configured timeout from the rule's first capture group.
    Timeout,
    /// HTTP status code from the rule's first capture group.
    HttpStatus,
    /// Exception or error type name, when one is present.
    Exception,
}

#[derive(Debug, Clone, Copy)]
pub struct SignatureRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub category: CategoryRule,
    pub extractor: Extractor,
}

pub const SIGNATURE_RULES: &[SignatureRule] = &[
    SignatureRule {
        name: "out_of_memory",
        pattern: r"(?i)\bout of memory\b|OutOfMemory|\bMemoryError\b|Runtime exited with error: signal: killed",
        category: CategoryRule::Fixed(Category::OutOfMemory),
        extractor: Extractor::ExecutionReport,
    },
    SignatureRule {
        name: "timeout",
        pattern: r"Task timed out after\s+(\S+)\s+seconds",
        category: CategoryRule::Fixed(Category::Timeout),
        extractor: Extractor::Timeout,
    },
    SignatureRule {
        name: "stack_trace",
        pattern: r#"Traceback \(most recent call last\)|(?m:^\s+at\s+\S+\s*\(.*\)\s*$)|(?m:^\s+File ".+", line \d+)"#,
        category: CategoryRule::Fixed(Category::Error),
        extractor: Extractor::Exception,
    },
    SignatureRule {
        name: "exception",
        pattern: r"\b[A-Z][A-Za-z0-9_]*(?:Exception|Error)\b|\bException\b|\[ERROR\]|\bERROR\b|\bError:|\bFATAL\b|\bFailed to\b|\bFAILED\b|\bError\b|(?i:\b(?:error|exception|failed)\b)",
        category: CategoryRule::Fixed(Category::Error),
        extractor: Extractor::Exception,
    },
    SignatureRule {
        name: "http_status",
        pattern: r#"(?i)\b(?:status[ _-]?(?:code)?["']?\s*[:=]\s*["']?|HTTP/\d(?:\.\d)?"?\s+)([45]\d{2})\b"#,
        category: CategoryRule::Fixed(Category::Error),
        extractor: Extractor::HttpStatus,
    },
    SignatureRule {
        name: "cold_start",
        pattern: r"Init Duration:",
        category: CategoryRule::Fixed(Category::ColdStart),
        extractor: Extractor::ExecutionReport,
    },
    SignatureRule {
        name: "execution_report",
        pattern: r"REPORT RequestId:",
        category: CategoryRule::ExecutionReport,
        extractor: Extractor::ExecutionReport,
    },
];

pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_DURATIONS: &str = "durations";
pub const FIELD_MEMORY_SIZE: &str = "memory_size";
pub const FIELD_MAX_MEMORY_USED: &str = "max_memory_used";
pub const FIELD_EXCEPTION_TYPE: &str = "exception_type";

/// Patterns used by the extractors, independent of rule matching.
pub const FIELD_PATTERNS: &[(&str, &str)] = &[
    (r"RequestId:\s*([0-9A-Za-z-]+)", FIELD_REQUEST_ID),
    (r"(?:\b(Billed|Init) )?Duration:\s*(\S+?)\s*ms\b", FIELD_DURATIONS),
    (r"Memory Size:\s*(\S+?)\s*MB\b", FIELD_MEMORY_SIZE),
    (r"Max Memory Used:\s*(\S+?)\s*MB\b", FIELD_MAX_MEMORY_USED),
    (
        r"\b([A-Z][A-Za-z0-9_]*(?:\.[A-Z][A-Za-z0-9_]*)*(?:Exception|Error))\b",
        FIELD_EXCEPTION_TYPE,
    ),
];

/// `(pattern, name)` pairs for the rule table, in precedence order.
pub fn rule_patterns() -> Vec<(&'static str, &'static str)> {
    SIGNATURE_RULES
        .iter()
        .map(|rule| (rule.pattern, rule.name))
        .collect()
}
