// Named, pre-compiled regex tables
use super::regex_error::RegexError;
use regex::Regex;

/// An ordered set of compiled regexes addressable by position or name.
///
/// Built once per `Classifier`; the table is immutable afterwards and can be
/// shared freely between threads.
#[derive(Debug, Clone)]
pub struct RegexTable {
    names: Vec<&'static str>,
    compiled: Vec<Regex>,
}

impl RegexTable {
    /// Compile every `(pattern, name)` pair, failing on the first bad pattern.
    pub fn compile(patterns: &[(&'static str, &'static str)]) -> Result<Self, RegexError> {
        let mut names = Vec::with_capacity(patterns.len());
        let mut compiled = Vec::with_capacity(patterns.len());

        for (pattern, name) in patterns {
            let regex = Regex::new(pattern).map_err(|source| RegexError::CompilationFailed {
                pattern: (*pattern).to_string(),
                name: (*name).to_string(),
                source,
            })?;
            names.push(*name);
            compiled.push(regex);
        }

        Ok(Self { names, compiled })
    }

    pub fn get(&self, index: usize) -> Result<&Regex, RegexError> {
        self.compiled.get(index).ok_or(RegexError::IndexOutOfBounds {
            index,
            max: self.compiled.len(),
        })
    }

    pub fn get_by_name(&self, name: &str) -> Result<&Regex, RegexError> {
        let index = self
            .names
            .iter()
            .position(|pattern_name| *pattern_name == name)
            .ok_or_else(|| RegexError::PatternNotFound {
                name: name.to_string(),
            })?;

        self.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Regex)> {
        self.names.iter().copied().zip(self.compiled.iter())
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PATTERNS: &[(&str, &str)] = &[
        (r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}", "iso_timestamp"),
        (r"Task timed out after\s+([\d.]+)\s+seconds", "timeout"),
    ];

    #[test]
    fn test_compile_and_lookup() {
        let table = RegexTable::compile(TEST_PATTERNS).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get(0).unwrap().is_match("2024-01-01T12:00:00"));
        assert!(
            table
                .get_by_name("timeout")
                .unwrap()
                .is_match("Task timed out after 3.00 seconds")
        );
        assert_eq!(table.names(), &["iso_timestamp", "timeout"]);
    }

    #[test]
    fn test_missing_entries() {
        let table = RegexTable::compile(TEST_PATTERNS).unwrap();

        assert!(matches!(
            table.get(7),
            Err(RegexError::IndexOutOfBounds { index: 7, max: 2 })
        ));
        assert!(matches!(
            table.get_by_name("nonexistent"),
            Err(RegexError::PatternNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_is_reported_by_name() {
        let result = RegexTable::compile(&[(r"[invalid regex pattern", "invalid_pattern")]);

        match result {
            Err(RegexError::CompilationFailed { pattern, name, .. }) => {
                assert_eq!(pattern, "[invalid regex pattern");
                assert_eq!(name, "invalid_pattern");
            }
            other => panic!("Expected CompilationFailed error, got {other:?}"),
        }
    }

    #[test]
    fn test_table_is_shareable_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let table = Arc::new(RegexTable::compile(TEST_PATTERNS).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || table.get(0).unwrap().is_match("2024-01-01T12:00:00"))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
