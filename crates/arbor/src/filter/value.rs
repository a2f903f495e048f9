//! Values compared by filter items.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// A value a node exposes to filters, or a filter's comparison value.
///
/// Numbers are stored as `f64`; integers from JSON or TOML convert losslessly
/// up to 2^53.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// No value.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string value.
    Str(String),
    /// A list of values.
    List(Vec<FilterValue>),
    /// Named values, compared as a whole.
    Dict(BTreeMap<String, FilterValue>),
}

impl FilterValue {
    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list, if this is a `List`.
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the entries, if this is a `Dict`.
    pub fn as_dict(&self) -> Option<&BTreeMap<String, FilterValue>> {
        match self {
            Self::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Views the value as a list: lists as-is, anything else as one element.
    pub(crate) fn to_list(&self) -> Vec<FilterValue> {
        match self {
            Self::List(values) => values.clone(),
            other => vec![other.clone()],
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Number(f64::from(v))
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        FilterValue::Number(f64::from(v))
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Number(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Str(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Str(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FilterValue::Null, Into::into)
    }
}

impl From<BTreeMap<String, FilterValue>> for FilterValue {
    fn from(v: BTreeMap<String, FilterValue>) -> Self {
        FilterValue::Dict(v)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(v: NaiveDate) -> Self {
        FilterValue::Str(v.format("%Y-%m-%d").to_string())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for FilterValue
where
    Tz::Offset: fmt::Display,
{
    fn from(v: DateTime<Tz>) -> Self {
        FilterValue::Str(v.to_rfc3339())
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        FilterValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// Named fields a node exposes to [`FilterItem`](super::FilterItem)s.
///
/// Unknown fields read as [`FilterValue::Null`].
pub trait FilterFields {
    /// Returns the value of `name` for this node.
    fn field(&self, name: &str) -> FilterValue;
}

impl FilterFields for HashMap<String, FilterValue> {
    fn field(&self, name: &str) -> FilterValue {
        self.get(name).cloned().unwrap_or_default()
    }
}

impl FilterFields for BTreeMap<String, FilterValue> {
    fn field(&self, name: &str) -> FilterValue {
        self.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json() {
        let values: Vec<FilterValue> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "x", ["a", null], {"value": 1}]"#)
                .unwrap();
        assert_eq!(
            values,
            vec![
                FilterValue::Null,
                FilterValue::Bool(true),
                FilterValue::Number(3.0),
                FilterValue::Number(2.5),
                FilterValue::Str("x".into()),
                FilterValue::List(vec![FilterValue::Str("a".into()), FilterValue::Null]),
                FilterValue::Dict(BTreeMap::from([("value".to_string(), FilterValue::Number(1.0))])),
            ]
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(FilterValue::from(Some(5)), FilterValue::Number(5.0));
        assert_eq!(FilterValue::from(None::<&str>), FilterValue::Null);
        assert_eq!(
            FilterValue::from(vec!["a", "b"]).as_list().map(<[_]>::len),
            Some(2)
        );
        assert_eq!(FilterValue::Str("s".into()).to_list().len(), 1);

        let date = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert_eq!(FilterValue::from(date).as_str(), Some("2024-05-15"));
        let stamp = DateTime::parse_from_rfc3339("2024-05-15T09:30:00+02:00").unwrap();
        assert_eq!(FilterValue::from(stamp).as_str(), Some("2024-05-15T09:30:00+02:00"));
    }

    #[test]
    fn test_missing_field_is_null() {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), FilterValue::from("ip"));
        assert_eq!(fields.field("status").as_str(), Some("ip"));
        assert!(fields.field("missing").is_null());
    }
}
