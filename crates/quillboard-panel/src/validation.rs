//! Rule-based validation of form values.
//!
//! A [`RuleSet`] maps field names to an ordered list of [`ValidationRule`]s.
//! For each field the first failing rule's message is recorded and the rest
//! of that field's rules are skipped. Every field is checked before a result
//! is returned.
//!
//! Apart from `required`, built-in rules pass on empty values, so optional
//! fields only get checked once something is entered.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;
use validator::ValidateUrl;

use crate::rules;

pub type FormValues = Map<String, Value>;
pub type FieldErrors = BTreeMap<String, String>;
pub type RuleSet = BTreeMap<String, Vec<ValidationRule>>;

/// A named custom predicate. Receives the field value and the rule params.
pub type Predicate = Arc<dyn Fn(&Value, &[Value]) -> bool + Send + Sync>;

/// Caller-supplied replacement for rule-based validation.
pub type CustomValidator = Arc<dyn Fn(&FormValues) -> ValidationResult + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    /// Minimum string length or numeric value.
    Min(f64),
    /// Maximum string length or numeric value.
    Max(f64),
    Email,
    Url,
    Numeric,
    Alpha,
    AlphaNumeric,
    Phone,
    /// A predicate registered on the [`Validator`] under `name`.
    Custom { name: String, params: Vec<Value> },
}

impl Rule {
    pub fn name(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Email => "email",
            Self::Url => "url",
            Self::Numeric => "numeric",
            Self::Alpha => "alpha",
            Self::AlphaNumeric => "alphaNumeric",
            Self::Phone => "phone",
            Self::Custom { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    pub rule: Rule,
    pub message: String,
}

impl ValidationRule {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(Rule::Required, message)
    }

    pub fn min(min: impl Into<f64>, message: impl Into<String>) -> Self {
        Self::new(Rule::Min(min.into()), message)
    }

    pub fn max(max: impl Into<f64>, message: impl Into<String>) -> Self {
        Self::new(Rule::Max(max.into()), message)
    }

    pub fn custom(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::custom_with(name, Vec::new(), message)
    }

    pub fn custom_with(name: impl Into<String>, params: Vec<Value>, message: impl Into<String>) -> Self {
        Self::new(
            Rule::Custom {
                name: name.into(),
                params,
            },
            message,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: FieldErrors,
}

impl ValidationResult {
    pub fn from_errors(errors: FieldErrors) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Evaluates rule sets. Holds the registry of named custom predicates.
#[derive(Clone)]
pub struct Validator {
    custom: HashMap<String, Predicate>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.custom.keys().collect();
        names.sort();
        f.debug_struct("Validator").field("custom", &names).finish()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator with the built-in content predicates registered
    /// (`slug`, `tags`, `contentLength`, `skills`, `futureDate`, `imageFile`).
    pub fn new() -> Self {
        let mut validator = Self::empty();
        rules::register_content_rules(&mut validator);
        validator
    }

    /// A validator with no custom predicates.
    pub fn empty() -> Self {
        Self {
            custom: HashMap::new(),
        }
    }

    pub fn add_custom_rule<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.custom.insert(name.into(), Arc::new(predicate));
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Outcome of one rule, or `None` when a custom rule is not registered.
    pub fn check(&self, rule: &Rule, value: &Value) -> Option<bool> {
        let passed = match rule {
            Rule::Required => is_present(value),
            Rule::Min(min) => optional(value, |v| measure(v).is_none_or(|m| m >= *min)),
            Rule::Max(max) => optional(value, |v| measure(v).is_none_or(|m| m <= *max)),
            Rule::Email => optional(value, |v| v.as_str().is_some_and(is_email)),
            Rule::Url => optional(value, |v| v.as_str().is_some_and(|s| s.validate_url())),
            Rule::Numeric => optional(value, is_numeric),
            Rule::Alpha => optional(value, |v| {
                v.as_str()
                    .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()))
            }),
            Rule::AlphaNumeric => optional(value, |v| {
                v.as_str()
                    .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
            }),
            Rule::Phone => optional(value, |v| v.as_str().is_some_and(is_phone)),
            Rule::Custom { name, params } => {
                let predicate = self.custom.get(name)?;
                predicate(value, params)
            }
        };
        Some(passed)
    }

    pub fn validate(&self, values: &FormValues, rules: &RuleSet) -> ValidationResult {
        let mut errors = FieldErrors::new();

        for (field, field_rules) in rules {
            let value = values.get(field).unwrap_or(&Value::Null);
            for rule in field_rules {
                match self.check(&rule.rule, value) {
                    Some(true) => continue,
                    Some(false) => {
                        errors.insert(field.clone(), rule.message.clone());
                        break;
                    }
                    None => {
                        warn!(rule = rule.rule.name(), field = %field, "Validation rule not found");
                    }
                }
            }
        }

        ValidationResult::from_errors(errors)
    }
}

/// Falsy values: null, `false`, zero and the empty string.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// The `required` check: non-empty arrays, non-blank strings, anything not null.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn optional(value: &Value, check: impl FnOnce(&Value) -> bool) -> bool {
    is_blank(value) || check(value)
}

fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) | Value::Bool(_) => true,
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s.parse::<f64>().is_ok_and(|n| n.is_finite())
        }
        _ => false,
    }
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.contains('@') && !part.contains(char::is_whitespace);
    if !clean(local) || !clean(domain) {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Optional leading `+`, then 1 to 16 digits not starting with zero.
/// Whitespace is ignored.
pub fn is_phone(s: &str) -> bool {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    let mut chars = digits.chars();
    match chars.next() {
        Some('1'..='9') => {}
        _ => return false,
    }
    let rest = chars.as_str();
    rest.len() <= 15 && rest.chars().all(|c| c.is_ascii_digit())
}
