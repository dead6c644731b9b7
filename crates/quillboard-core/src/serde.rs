//! Deserializers for query-string parameters.
//!
//! Values arriving through `Query<T>` (especially via `#[serde(flatten)]`) are
//! strings, and an empty string means "not supplied". These helpers accept both
//! the string and the native JSON form so the same DTO also works as a body.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOr<T> {
    Native(T),
    Text(String),
}

pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOr<i64>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOr::Native(n)) => Ok(Some(n)),
        Some(StringOr::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(StringOr::Text(s)) => s.trim().parse::<i64>().map(Some).map_err(D::Error::custom),
    }
}

/// Like [`deserialize_optional_i64`], wrapped in an id newtype.
pub fn deserialize_optional_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<i64>,
{
    deserialize_optional_i64(deserializer).map(|id| id.map(T::from))
}

pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOr<bool>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOr::Native(b)) => Ok(Some(b)),
        Some(StringOr::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid boolean: {other}"))),
        },
    }
}

/// Accepts `YYYY-MM-DD`; an empty string is `None`.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(D::Error::custom),
        None => Ok(None),
    }
}

/// Treats an empty string as `None` for free-text filters.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Filters {
        #[serde(default, deserialize_with = "deserialize_optional_i64")]
        category_id: Option<i64>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        is_featured: Option<bool>,
        #[serde(default, deserialize_with = "deserialize_optional_date")]
        date_from: Option<NaiveDate>,
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        search: Option<String>,
    }

    #[test]
    fn test_strings_are_parsed() {
        let f: Filters = serde_json::from_str(
            r#"{"category_id":"4","is_featured":"1","date_from":"2024-02-01","search":" launch "}"#,
        )
        .unwrap();
        assert_eq!(f.category_id, Some(4));
        assert_eq!(f.is_featured, Some(true));
        assert_eq!(f.date_from, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(f.search.as_deref(), Some("launch"));
    }

    #[test]
    fn test_native_values_are_accepted() {
        let f: Filters = serde_json::from_str(r#"{"category_id":9,"is_featured":false}"#).unwrap();
        assert_eq!(f.category_id, Some(9));
        assert_eq!(f.is_featured, Some(false));
    }

    #[test]
    fn test_empty_strings_are_none() {
        let f: Filters = serde_json::from_str(
            r#"{"category_id":"","is_featured":"","date_from":"","search":"  "}"#,
        )
        .unwrap();
        assert!(f.category_id.is_none());
        assert!(f.is_featured.is_none());
        assert!(f.date_from.is_none());
        assert!(f.search.is_none());
    }

    #[test]
    fn test_missing_fields_are_none() {
        let f: Filters = serde_json::from_str("{}").unwrap();
        assert!(f.category_id.is_none());
        assert!(f.search.is_none());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(serde_json::from_str::<Filters>(r#"{"category_id":"abc"}"#).is_err());
        assert!(serde_json::from_str::<Filters>(r#"{"is_featured":"maybe"}"#).is_err());
        assert!(serde_json::from_str::<Filters>(r#"{"date_from":"01/02/2024"}"#).is_err());
    }
}
