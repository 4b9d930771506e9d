// file: src/writeexts/validators.rs
// version: 1.0.0
// guid: 4d806e31-f686-4a49-b27f-04e23d6b5890

//! Record validators
//!
//! A validator inspects one `(key, value)` pair and either accepts it or
//! returns a human readable reason. Closures of the form
//! `Fn(&str, &str) -> Result<(), String>` are validators too.

use regex::Regex;

pub trait RecordValidator {
    fn validate(&self, key: &str, value: &str) -> Result<(), String>;
}

impl<F> RecordValidator for F
where
    F: Fn(&str, &str) -> Result<(), String>,
{
    fn validate(&self, key: &str, value: &str) -> Result<(), String> {
        self(key, value)
    }
}

/// Accepts every record
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl RecordValidator for AcceptAll {
    fn validate(&self, _key: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Value must be one or more ASCII digits
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitsOnly;

impl RecordValidator for DigitsOnly {
    fn validate(&self, _key: &str, value: &str) -> Result<(), String> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err("value contains non-digit character(s)".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmpty;

impl RecordValidator for NonEmpty {
    fn validate(&self, _key: &str, value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Err("value is empty".to_string());
        }
        Ok(())
    }
}

/// Rejects values that would spill over more than one line
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNewline;

impl RecordValidator for NoNewline {
    fn validate(&self, _key: &str, value: &str) -> Result<(), String> {
        if value.contains('\n') || value.contains('\r') {
            return Err("value contains a line break".to_string());
        }
        Ok(())
    }
}

/// Whole value must match a regular expression
#[derive(Debug, Clone)]
pub struct MatchesPattern {
    pattern: Regex,
}

impl MatchesPattern {
    /// Compile `pattern`, anchored so it must match the entire value
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self { pattern })
    }
}

impl RecordValidator for MatchesPattern {
    fn validate(&self, _key: &str, value: &str) -> Result<(), String> {
        if !self.pattern.is_match(value) {
            return Err(format!("value does not match {}", self.pattern.as_str()));
        }
        Ok(())
    }
}

/// Runs validators in order and reports the first failure
#[derive(Default)]
pub struct AllOf {
    validators: Vec<Box<dyn RecordValidator>>,
}

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, validator: impl RecordValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn push(&mut self, validator: Box<dyn RecordValidator>) {
        self.validators.push(validator);
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }
}

impl RecordValidator for AllOf {
    fn validate(&self, key: &str, value: &str) -> Result<(), String> {
        for validator in &self.validators {
            validator.validate(key, value)?;
        }
        Ok(())
    }
}
