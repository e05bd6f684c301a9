use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

// ============ Database Models ============

/// A stored person record with its enriched attributes.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Human {
    /// Unique identifier.
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "John")]
    pub name: String,
    #[schema(example = "Doe")]
    pub surname: String,
    /// Empty when not supplied.
    #[schema(example = "Ivanovich")]
    pub patronymic: String,
    /// Estimated age, `0` when unknown.
    #[schema(example = 25)]
    pub age: i32,
    /// `male`, `female` or `unknown`.
    #[schema(example = "male")]
    pub gender: String,
    /// ISO country code, empty when unknown.
    #[schema(example = "RU")]
    pub nationality: String,
    pub created_at: DateTime<Utc>,
}

/// Fields of a human about to be inserted.
#[derive(Debug, Clone)]
pub struct NewHuman {
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub attributes: EnrichedAttributes,
}

/// Filter and pagination for listing stored humans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HumanFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub page: i64,
    pub page_size: i64,
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

impl HumanFilter {
    /// Row offset of the first record on the requested page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

// ============ API Request Models ============

/// Query parameters for `GET /humans`.
///
/// Kept as raw strings so that unparseable numbers are ignored instead of
/// rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HumanQueryParams {
    pub id: Option<String>,
    /// Case-insensitive substring match.
    pub name: Option<String>,
    /// Case-insensitive substring match.
    pub surname: Option<String>,
    /// Case-insensitive substring match.
    pub patronymic: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub min_age: Option<String>,
    pub max_age: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl From<HumanQueryParams> for HumanFilter {
    fn from(params: HumanQueryParams) -> Self {
        fn text(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }
        fn positive<T: std::str::FromStr + PartialOrd + Default>(value: Option<String>) -> Option<T> {
            value
                .and_then(|v| v.trim().parse::<T>().ok())
                .filter(|v| *v > T::default())
        }

        let page = params
            .page
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let page_size = params
            .page_size
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|s| *s > 0 && *s <= MAX_PAGE_SIZE)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        HumanFilter {
            id: positive(params.id),
            name: text(params.name),
            surname: text(params.surname),
            patronymic: text(params.patronymic),
            min_age: positive(params.min_age),
            max_age: positive(params.max_age),
            gender: text(params.gender),
            nationality: text(params.nationality),
            page,
            page_size,
        }
    }
}

/// Payload for `POST /humans`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddHumanRequest {
    #[serde(default)]
    #[schema(example = "John")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Doe")]
    pub surname: String,
    #[schema(example = "Johnny")]
    pub patronymic: Option<String>,
}

/// Payload for `PATCH /humans`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateHumanRequest {
    #[schema(example = 1)]
    pub id: i64,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
}

impl UpdateHumanRequest {
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.surname.is_some()
            || self.patronymic.is_some()
            || self.age.is_some()
            || self.gender.is_some()
            || self.nationality.is_some()
    }
}

/// Payload for `DELETE /humans`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteHumanRequest {
    #[schema(example = 1)]
    pub id: i64,
}

// ============ Enrichment Models ============

/// Subject of one enrichment call. Cheap to clone into each lookup task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    name: Arc<str>,
}

impl LookupRequest {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for LookupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Anything other than `male` or `female` collapses to `Unknown`.
    pub fn from_lookup(value: Option<&str>) -> Self {
        match value {
            Some("male") => Gender::Male,
            Some("female") => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merged output of one enrichment call. Always fully populated: every
/// attribute either carries the looked-up value or its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EnrichedAttributes {
    /// `0` when unknown.
    pub age: u32,
    pub gender: Gender,
    /// ISO country code, empty when unknown.
    pub nationality: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HumanQueryParams {
        let json: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(json)).unwrap()
    }

    #[test]
    fn test_filter_defaults_pagination() {
        let filter = HumanFilter::from(HumanQueryParams::default());
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn test_filter_clamps_invalid_pagination() {
        let filter = HumanFilter::from(params(&[("page", "0"), ("page_size", "500")]));
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, 20);

        let filter = HumanFilter::from(params(&[("page", "3"), ("page_size", "10")]));
        assert_eq!(filter.offset(), 20);
    }

    #[test]
    fn test_filter_ignores_unparseable_and_non_positive_numbers() {
        let filter = HumanFilter::from(params(&[
            ("min_age", "abc"),
            ("max_age", "0"),
            ("id", "-4"),
            ("name", "  "),
            ("gender", "female"),
        ]));
        assert_eq!(filter.min_age, None);
        assert_eq!(filter.max_age, None);
        assert_eq!(filter.id, None);
        assert_eq!(filter.name, None);
        assert_eq!(filter.gender.as_deref(), Some("female"));
    }

    #[test]
    fn test_gender_collapse() {
        assert_eq!(Gender::from_lookup(Some("male")), Gender::Male);
        assert_eq!(Gender::from_lookup(Some("female")), Gender::Female);
        assert_eq!(Gender::from_lookup(Some("nonbinary")), Gender::Unknown);
        assert_eq!(Gender::from_lookup(Some("Male")), Gender::Unknown);
        assert_eq!(Gender::from_lookup(None), Gender::Unknown);
    }

    #[test]
    fn test_enriched_attributes_serialize_shape() {
        let attrs = EnrichedAttributes {
            age: 30,
            gender: Gender::Female,
            nationality: "US".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&attrs).unwrap(),
            serde_json::json!({"Age": 30, "Gender": "female", "Nationality": "US"})
        );
    }

    #[test]
    fn test_update_request_has_changes() {
        let mut req = UpdateHumanRequest {
            id: 1,
            ..Default::default()
        };
        assert!(!req.has_changes());
        req.age = Some(40);
        assert!(req.has_changes());
    }
}
