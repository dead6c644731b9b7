//! Content predicates and the rule sets used by the blog, role and
//! permission forms.

use chrono::{NaiveDate, Utc};
use quillboard_core::file_storage::ALLOWED_IMAGE_TYPES;
use quillboard_core::slug::is_valid_slug;
use quillboard_models::blogs::MAX_TAGS;
use serde_json::{Value, json};

use crate::validation::{RuleSet, ValidationRule, Validator, is_blank};

pub const DEFAULT_MIN_WORDS: u64 = 50;

pub(crate) fn register_content_rules(validator: &mut Validator) {
    validator.add_custom_rule("slug", |value, _| {
        is_blank(value) || value.as_str().is_some_and(is_valid_slug)
    });
    validator.add_custom_rule("tags", |value, params| {
        let max = params
            .first()
            .and_then(Value::as_u64)
            .map_or(MAX_TAGS, |n| n as usize);
        value.as_array().is_none_or(|tags| tags.len() <= max)
    });
    validator.add_custom_rule("contentLength", |value, params| {
        let min = params
            .first()
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_MIN_WORDS);
        is_blank(value) || value.as_str().is_some_and(|s| word_count(s) as u64 >= min)
    });
    validator.add_custom_rule("skills", |value, _| {
        value.as_array().is_some_and(|skills| !skills.is_empty())
    });
    validator.add_custom_rule("futureDate", |value, _| {
        is_on_or_after(value, Utc::now().date_naive())
    });
    validator.add_custom_rule("imageFile", |value, _| is_image_value(value));
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Blank dates pass. Anything that does not start with `YYYY-MM-DD` fails.
pub fn is_on_or_after(value: &Value, today: NaiveDate) -> bool {
    if is_blank(value) {
        return true;
    }
    value
        .as_str()
        .and_then(|s| s.get(..10))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .is_some_and(|date| date >= today)
}

/// An existing image reference (a string) or a picked file whose
/// `content_type` is an allowed image type.
pub fn is_image_value(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_empty(),
        Value::Object(file) => file
            .get("content_type")
            .and_then(Value::as_str)
            .is_some_and(|ct| ALLOWED_IMAGE_TYPES.contains(&ct)),
        _ => false,
    }
}

fn set(entries: Vec<(&str, Vec<ValidationRule>)>) -> RuleSet {
    entries
        .into_iter()
        .map(|(field, rules)| (field.to_string(), rules))
        .collect()
}

pub fn blog_rules() -> RuleSet {
    set(vec![
        (
            "title",
            vec![
                ValidationRule::required("Title is required"),
                ValidationRule::min(5, "Title must be at least 5 characters"),
                ValidationRule::max(100, "Title must not exceed 100 characters"),
            ],
        ),
        ("content", vec![ValidationRule::required("Content is required")]),
        ("category_id", vec![ValidationRule::required("Category is required")]),
        ("status", vec![ValidationRule::required("Status is required")]),
        ("priority", vec![ValidationRule::required("Priority is required")]),
        ("country_id", vec![ValidationRule::required("Country is required")]),
        ("state_id", vec![ValidationRule::required("State is required")]),
        ("city_id", vec![ValidationRule::required("City is required")]),
        (
            "skills",
            vec![ValidationRule::custom("skills", "At least one skill is required")],
        ),
        (
            "publish_date",
            vec![
                ValidationRule::required("Publish date is required"),
                ValidationRule::custom("futureDate", "Publish date cannot be in the past"),
            ],
        ),
        (
            "tags",
            vec![ValidationRule::custom_with(
                "tags",
                vec![json!(MAX_TAGS)],
                "Maximum 10 tags allowed",
            )],
        ),
        (
            "slug",
            vec![ValidationRule::custom(
                "slug",
                "Slug must contain only lowercase letters, numbers and hyphens",
            )],
        ),
        (
            "image",
            vec![ValidationRule::custom(
                "imageFile",
                "Please select a valid image file (JPEG, PNG, GIF, WebP)",
            )],
        ),
    ])
}

pub fn role_rules() -> RuleSet {
    set(vec![
        ("name", vec![ValidationRule::required("Role name is required")]),
        (
            "slug",
            vec![
                ValidationRule::required("Role slug is required"),
                ValidationRule::custom(
                    "slug",
                    "Slug must contain only lowercase letters, numbers and hyphens",
                ),
            ],
        ),
        (
            "permissions",
            vec![ValidationRule::required("At least one permission is required")],
        ),
    ])
}

pub fn permission_rules() -> RuleSet {
    set(vec![
        ("name", vec![ValidationRule::required("Permission name is required")]),
        ("slug", vec![ValidationRule::required("Permission slug is required")]),
        ("module", vec![ValidationRule::required("Module is required")]),
    ])
}
