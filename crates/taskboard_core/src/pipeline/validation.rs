//! Declarative request validation.
//!
//! # Invariants
//! - Rules never short-circuit: every failing field is reported at once.
//! - Messages carry rule metadata only, never the rejected value.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Field name -> failed rule messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with at least one failure.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed")?;
        for (index, (field, messages)) in self.fields.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Builder collecting rule failures for one request.
///
/// ```ignore
/// Rules::new()
///     .not_blank("title", &request.title)
///     .max_len("title", &request.title, 200)
///     .finish()
/// ```
#[derive(Debug, Default)]
pub struct Rules {
    errors: ValidationErrors,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails when `value` is absent.
    pub fn required<T>(self, field: &str, value: Option<&T>) -> Self {
        self.check(field, value.is_some(), "is required")
    }

    /// Fails when `value` is empty after trimming.
    pub fn not_blank(self, field: &str, value: &str) -> Self {
        self.check(field, !value.trim().is_empty(), "must not be blank")
    }

    /// Fails when `value` holds more than `max` characters.
    pub fn max_len(self, field: &str, value: &str, max: usize) -> Self {
        let ok = value.chars().count() <= max;
        self.check(field, ok, format!("must be at most {max} characters"))
    }

    /// `max_len` for optional text; absent values pass.
    pub fn optional_max_len(self, field: &str, value: Option<&str>, max: usize) -> Self {
        match value {
            Some(value) => self.max_len(field, value, max),
            None => self,
        }
    }

    /// Fails when `value` lies outside `min..=max`.
    pub fn range<T>(self, field: &str, value: T, min: T, max: T) -> Self
    where
        T: PartialOrd + Display,
    {
        let ok = value >= min && value <= max;
        self.check(field, ok, format!("must be between {min} and {max}"))
    }

    /// Fails when `value` is not shaped like an email address.
    pub fn email(self, field: &str, value: &str) -> Self {
        self.check(
            field,
            EMAIL_RE.is_match(value.trim()),
            "must be a valid email address",
        )
    }

    /// Records `message` for `field` unless `ok`.
    pub fn check(mut self, field: &str, ok: bool, message: impl Into<String>) -> Self {
        if !ok {
            self.errors.add(field, message);
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rules;

    #[test]
    fn collects_every_failing_field() {
        let errors = Rules::new()
            .not_blank("title", "   ")
            .max_len("title", "   ", 2)
            .email("email", "not-an-email")
            .range("order", -1, 0, 100)
            .finish()
            .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.field("title").map(<[String]>::len), Some(2));
        assert!(errors.field("email").is_some());
        assert!(errors.to_string().starts_with("validation failed: email:"));
    }

    #[test]
    fn passing_rules_finish_ok() {
        Rules::new()
            .not_blank("name", "Review")
            .max_len("name", "Review", 100)
            .optional_max_len("description", None, 10)
            .required("board_id", Some(&1))
            .email("email", " ada@example.com ")
            .range("order", 4, 0, 10_000)
            .finish()
            .expect("all rules pass");
    }

    #[test]
    fn max_len_counts_characters_not_bytes() {
        assert!(Rules::new().max_len("name", "ñññ", 3).finish().is_ok());
    }
}
