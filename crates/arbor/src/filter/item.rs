//! Composable, serializable filter definitions.
//!
//! A [`FilterItem`] is either a test of one named field against a value, or
//! a group combining nested items with `and`/`or`. A [`FilterSet`] is the
//! top-level group and can be installed as a filter predicate.
//!
//! # JSON form
//!
//! ```json
//! {
//!   "op": "and",
//!   "items": [
//!     { "kind": "field", "field": "status", "type": "str", "op": "in", "value": "ip" },
//!     { "kind": "group", "op": "or", "filters": [
//!       { "kind": "field", "field": "frames", "type": "number", "op": ">", "value": 100 },
//!       { "kind": "field", "field": "approved", "type": "bool", "op": "true" }
//!     ]}
//!   ]
//! }
//! ```

use std::cmp::Ordering;
use std::fmt;

use arbor_core::logging::targets;
use chrono::{Local, NaiveDate};
use arbor_core::{Predicate, PredicateError};
use serde::{Deserialize, Serialize};

use super::date::DateBucket;
use super::value::{FilterFields, FilterValue};
use crate::error::{Error, Result};

/// The operation a filter item applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "true")]
    IsTrue,
    #[serde(rename = "false")]
    IsFalse,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "!in")]
    NotIn,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
}

impl FilterOp {
    /// Returns `true` for `And` and `Or`.
    pub fn is_group_op(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// The textual form used in filter definitions.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::IsTrue => "true",
            Self::IsFalse => "false",
            Self::In => "in",
            Self::NotIn => "!in",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a field value is interpreted by a field test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Bool,
    Str,
    Number,
    List,
    Dict,
    /// Field dates compared by [`DateBucket`] name.
    DateTime,
}

impl FilterType {
    /// The operation applied when a definition does not name one.
    pub fn default_op(self) -> FilterOp {
        match self {
            Self::List => FilterOp::In,
            Self::Bool | Self::Str | Self::Number | Self::Dict | Self::DateTime => FilterOp::Equal,
        }
    }

    /// Returns `true` if `op` can be applied to values of this type.
    pub fn supports(self, op: FilterOp) -> bool {
        use FilterOp::*;
        match self {
            Self::Bool => matches!(op, IsTrue | IsFalse | Equal | NotEqual),
            Self::Str | Self::List => matches!(op, Equal | NotEqual | In | NotIn),
            Self::Dict | Self::DateTime => matches!(op, Equal | NotEqual),
            Self::Number => matches!(
                op,
                Equal | NotEqual | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual
            ),
        }
    }

    /// The filter type naturally matching `value`, if any.
    pub fn of(value: &FilterValue) -> Option<Self> {
        match value {
            FilterValue::Null => None,
            FilterValue::Bool(_) => Some(Self::Bool),
            FilterValue::Number(_) => Some(Self::Number),
            FilterValue::Str(_) => Some(Self::Str),
            FilterValue::List(_) => Some(Self::List),
            FilterValue::Dict(_) => Some(Self::Dict),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Str => "str",
            Self::Number => "number",
            Self::List => "list",
            Self::Dict => "dict",
            Self::DateTime => "date_time",
        })
    }
}

/// A single field test, or a group of nested items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterItem {
    /// Tests one named field of the node.
    Field {
        /// The field name passed to [`FilterFields::field`].
        field: String,
        #[serde(rename = "type")]
        filter_type: FilterType,
        op: FilterOp,
        /// The comparison value. Ignored by `IsTrue`/`IsFalse`.
        #[serde(default)]
        value: FilterValue,
    },
    /// Combines nested items. An empty group accepts everything.
    Group {
        op: FilterOp,
        #[serde(default)]
        filters: Vec<FilterItem>,
    },
}

impl FilterItem {
    /// A field test using the type's default operation.
    pub fn field(field: impl Into<String>, value: impl Into<FilterValue>) -> Result<Self> {
        let value = value.into();
        let filter_type = FilterType::of(&value).ok_or_else(|| {
            Error::config("cannot infer a filter type from a null value")
        })?;
        Ok(Self::Field {
            field: field.into(),
            filter_type,
            op: filter_type.default_op(),
            value,
        })
    }

    /// A field test with an explicit type and operation.
    pub fn field_op(
        field: impl Into<String>,
        filter_type: FilterType,
        op: FilterOp,
        value: impl Into<FilterValue>,
    ) -> Result<Self> {
        let item = Self::Field {
            field: field.into(),
            filter_type,
            op,
            value: value.into(),
        };
        item.validate()?;
        Ok(item)
    }

    /// A group combining `filters` with `op`, which must be `And` or `Or`.
    pub fn group(op: FilterOp, filters: Vec<FilterItem>) -> Result<Self> {
        let item = Self::Group { op, filters };
        item.validate()?;
        Ok(item)
    }

    /// Returns `true` if this is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }

    /// The item's operation.
    pub fn op(&self) -> FilterOp {
        match self {
            Self::Field { op, .. } | Self::Group { op, .. } => *op,
        }
    }

    /// Checks the item and everything nested in it.
    ///
    /// Groups must use `and`/`or` ([`Error::InvalidGroupOp`]); field tests
    /// must use an operation their type supports
    /// ([`Error::UnsupportedOperation`]).
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Field {
                filter_type, op, ..
            } => {
                if filter_type.supports(*op) {
                    Ok(())
                } else {
                    Err(Error::UnsupportedOperation {
                        op: *op,
                        filter_type: *filter_type,
                    })
                }
            }
            Self::Group { op, filters } => {
                if !op.is_group_op() {
                    return Err(Error::InvalidGroupOp { op: *op });
                }
                filters.iter().try_for_each(FilterItem::validate)
            }
        }
    }

    /// Returns `true` if `data` passes this item.
    pub fn accepts<F: FilterFields + ?Sized>(&self, data: &F) -> Result<bool> {
        match self {
            Self::Group { op, filters } => combine(*op, filters, data),
            Self::Field {
                field,
                filter_type,
                op,
                value,
            } => {
                let actual = data.field(field);
                let accepted = match filter_type {
                    FilterType::Bool => bool_test(*op, &actual, value),
                    FilterType::Str => str_test(*op, &actual, value),
                    FilterType::Number => number_test(*op, &actual, value),
                    FilterType::List => list_test(*op, &actual, value),
                    FilterType::Dict => equality_test(*op, &actual, value),
                    FilterType::DateTime => {
                        date_test(*op, &actual, value, Local::now().date_naive())?
                    }
                };
                accepted.ok_or(Error::UnsupportedOperation {
                    op: *op,
                    filter_type: *filter_type,
                })
            }
        }
    }
}

/// Folds `items` with `op`, short-circuiting. Empty input accepts.
fn combine<F: FilterFields + ?Sized>(op: FilterOp, items: &[FilterItem], data: &F) -> Result<bool> {
    match op {
        FilterOp::And => {
            for item in items {
                if !item.accepts(data)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        FilterOp::Or => {
            if items.is_empty() {
                return Ok(true);
            }
            for item in items {
                if item.accepts(data)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        other => Err(Error::InvalidGroupOp { op: other }),
    }
}

fn bool_test(op: FilterOp, actual: &FilterValue, expected: &FilterValue) -> Option<bool> {
    match op {
        FilterOp::IsTrue => Some(actual.as_bool() == Some(true)),
        FilterOp::IsFalse => Some(actual.as_bool() == Some(false)),
        FilterOp::Equal => Some(actual == expected),
        FilterOp::NotEqual => Some(actual != expected),
        _ => None,
    }
}

/// `In`/`NotIn` are case-insensitive substring tests; null reads as "".
fn str_test(op: FilterOp, actual: &FilterValue, expected: &FilterValue) -> Option<bool> {
    match op {
        FilterOp::Equal => Some(actual == expected),
        FilterOp::NotEqual => Some(actual != expected),
        FilterOp::In | FilterOp::NotIn => {
            let found = match (text_of(actual), text_of(expected)) {
                (Some(haystack), Some(needle)) => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            };
            Some(if op == FilterOp::In { found } else { !found })
        }
        _ => None,
    }
}

fn text_of(value: &FilterValue) -> Option<&str> {
    match value {
        FilterValue::Null => Some(""),
        FilterValue::Str(s) => Some(s),
        _ => None,
    }
}

fn equality_test(op: FilterOp, actual: &FilterValue, expected: &FilterValue) -> Option<bool> {
    match op {
        FilterOp::Equal => Some(actual == expected),
        FilterOp::NotEqual => Some(actual != expected),
        _ => None,
    }
}

/// A bucket name as comparison value buckets the field first; any other
/// comparison value is matched against the raw field.
fn date_test(
    op: FilterOp,
    actual: &FilterValue,
    expected: &FilterValue,
    today: NaiveDate,
) -> Result<Option<bool>> {
    if !matches!(op, FilterOp::Equal | FilterOp::NotEqual) {
        return Ok(None);
    }
    let bucketed;
    let actual = match expected {
        FilterValue::Str(_) => {
            bucketed = FilterValue::from(DateBucket::of_value(actual, today)?.as_str());
            &bucketed
        }
        _ => actual,
    };
    Ok(equality_test(op, actual, expected))
}

/// Ordering against a missing number is always false. A dict field is read
/// through its `"value"` entry.
fn number_test(op: FilterOp, actual: &FilterValue, expected: &FilterValue) -> Option<bool> {
    let unwrapped;
    let actual = match actual {
        FilterValue::Dict(entries) => {
            unwrapped = entries.get("value").cloned().unwrap_or_default();
            &unwrapped
        }
        other => other,
    };

    match op {
        FilterOp::Equal => return Some(actual == expected),
        FilterOp::NotEqual => return Some(actual != expected),
        _ => {}
    }

    let ordering = match (actual.as_number(), expected.as_number()) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => None,
    };
    let test = |accept: fn(Ordering) -> bool| Some(ordering.is_some_and(accept));
    match op {
        FilterOp::LessThan => test(Ordering::is_lt),
        FilterOp::LessThanOrEqual => test(Ordering::is_le),
        FilterOp::GreaterThan => test(Ordering::is_gt),
        FilterOp::GreaterThanOrEqual => test(Ordering::is_ge),
        _ => None,
    }
}

/// `In` accepts when the two lists share an element. An empty side matches
/// only if the other side holds null; `NotIn` is the exact negation.
fn list_test(op: FilterOp, actual: &FilterValue, expected: &FilterValue) -> Option<bool> {
    match op {
        FilterOp::Equal => return Some(actual == expected),
        FilterOp::NotEqual => return Some(actual != expected),
        FilterOp::In | FilterOp::NotIn => {}
        _ => return None,
    }

    let values = actual.to_list();
    let wanted = expected.to_list();
    let common = if values.is_empty() {
        wanted.iter().any(FilterValue::is_null)
    } else if wanted.is_empty() {
        values.iter().any(FilterValue::is_null)
    } else {
        values.iter().any(|v| wanted.contains(v))
    };
    Some(if op == FilterOp::In { common } else { !common })
}

/// The top-level filter: items combined with `and` (default) or `or`.
///
/// An empty set accepts everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default = "default_group_op")]
    op: FilterOp,
    #[serde(default)]
    items: Vec<FilterItem>,
}

fn default_group_op() -> FilterOp {
    FilterOp::And
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            op: FilterOp::And,
            items: Vec::new(),
        }
    }
}

impl FilterSet {
    /// Creates a set combining `items` with `op`.
    pub fn new(op: FilterOp, items: Vec<FilterItem>) -> Result<Self> {
        let set = Self { op, items };
        set.validate()?;
        Ok(set)
    }

    /// All items must accept.
    pub fn all(items: Vec<FilterItem>) -> Result<Self> {
        Self::new(FilterOp::And, items)
    }

    /// Any item must accept.
    pub fn any(items: Vec<FilterItem>) -> Result<Self> {
        Self::new(FilterOp::Or, items)
    }

    /// Parses and validates a JSON definition.
    pub fn from_json(json: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(json)?;
        set.validate()?;
        tracing::debug!(target: targets::FILTER, items = set.items.len(), op = %set.op, "loaded filter set");
        Ok(set)
    }

    /// Serializes the definition as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the group operation and every item.
    pub fn validate(&self) -> Result<()> {
        if !self.op.is_group_op() {
            return Err(Error::InvalidGroupOp { op: self.op });
        }
        self.items.iter().try_for_each(FilterItem::validate)
    }

    /// Appends an item after validating it.
    pub fn push(&mut self, item: FilterItem) -> Result<()> {
        item.validate()?;
        self.items.push(item);
        Ok(())
    }

    /// The group operation.
    pub fn op(&self) -> FilterOp {
        self.op
    }

    /// The top-level items.
    pub fn items(&self) -> &[FilterItem] {
        &self.items
    }

    /// Returns `true` if the set has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if `data` passes the set.
    pub fn accepts<F: FilterFields + ?Sized>(&self, data: &F) -> Result<bool> {
        combine(self.op, &self.items, data)
    }
}

impl<T: FilterFields + ?Sized> Predicate<T> for FilterSet {
    fn accepts(&self, data: &T) -> std::result::Result<bool, PredicateError> {
        FilterSet::accepts(self, data)
            .map_err(|e| PredicateError::with_source("filter set evaluation failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn node(pairs: &[(&str, FilterValue)]) -> HashMap<String, FilterValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_bool_ops() {
        let data = node(&[("approved", true.into())]);
        let is_true = FilterItem::field_op("approved", FilterType::Bool, FilterOp::IsTrue, FilterValue::Null).unwrap();
        let is_false = FilterItem::field_op("approved", FilterType::Bool, FilterOp::IsFalse, FilterValue::Null).unwrap();
        assert!(is_true.accepts(&data).unwrap());
        assert!(!is_false.accepts(&data).unwrap());

        let missing = FilterItem::field_op("other", FilterType::Bool, FilterOp::IsFalse, FilterValue::Null).unwrap();
        assert!(!missing.accepts(&data).unwrap());
    }

    #[test]
    fn test_str_in_is_case_insensitive_substring() {
        let data = node(&[("name", "SH010_Comp".into())]);
        let item = FilterItem::field_op("name", FilterType::Str, FilterOp::In, "comp").unwrap();
        assert!(item.accepts(&data).unwrap());

        let not_in = FilterItem::field_op("name", FilterType::Str, FilterOp::NotIn, "comp").unwrap();
        assert!(!not_in.accepts(&data).unwrap());

        // A missing field reads as "", which contains the empty needle.
        let empty = FilterItem::field_op("missing", FilterType::Str, FilterOp::In, FilterValue::Null).unwrap();
        assert!(empty.accepts(&data).unwrap());
    }

    #[test]
    fn test_number_ordering_with_null_is_false() {
        let data = node(&[("frames", 120.into())]);
        let gt = FilterItem::field_op("frames", FilterType::Number, FilterOp::GreaterThan, 100).unwrap();
        let le = FilterItem::field_op("frames", FilterType::Number, FilterOp::LessThanOrEqual, 100).unwrap();
        assert!(gt.accepts(&data).unwrap());
        assert!(!le.accepts(&data).unwrap());

        let missing = FilterItem::field_op("budget", FilterType::Number, FilterOp::LessThan, 100).unwrap();
        assert!(!missing.accepts(&data).unwrap());
    }

    #[test]
    fn test_list_in_rules() {
        let tagged = node(&[("tags", vec!["fx", "comp"].into())]);
        let untagged = node(&[("tags", FilterValue::List(Vec::new()))]);

        let any_comp = FilterItem::field_op("tags", FilterType::List, FilterOp::In, vec!["comp", "lgt"]).unwrap();
        assert!(any_comp.accepts(&tagged).unwrap());
        assert!(!any_comp.accepts(&untagged).unwrap());

        // An empty list matches a filter asking for "no value".
        let no_value = FilterItem::field_op("tags", FilterType::List, FilterOp::In, FilterValue::List(vec![FilterValue::Null])).unwrap();
        assert!(no_value.accepts(&untagged).unwrap());
        assert!(!no_value.accepts(&tagged).unwrap());

        let not_in = FilterItem::field_op("tags", FilterType::List, FilterOp::NotIn, "fx").unwrap();
        assert!(!not_in.accepts(&tagged).unwrap());
        assert!(not_in.accepts(&untagged).unwrap());
    }

    #[test]
    fn test_dict_equality() {
        let owner = FilterValue::from(std::collections::BTreeMap::from([
            ("type".to_string(), FilterValue::from("HumanUser")),
            ("id".to_string(), FilterValue::from(42)),
        ]));
        let data = node(&[("owner", owner.clone())]);

        let same = FilterItem::field("owner", owner).unwrap();
        assert_eq!(same.op(), FilterOp::Equal);
        assert!(same.accepts(&data).unwrap());

        let other = FilterValue::from(std::collections::BTreeMap::from([(
            "id".to_string(),
            FilterValue::from(7),
        )]));
        let not_other = FilterItem::field_op("owner", FilterType::Dict, FilterOp::NotEqual, other).unwrap();
        assert!(not_other.accepts(&data).unwrap());

        let err = FilterItem::field_op("owner", FilterType::Dict, FilterOp::In, FilterValue::Null).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { filter_type: FilterType::Dict, .. }));
    }

    #[test]
    fn test_number_reads_dict_value_entry() {
        let progress = FilterValue::from(std::collections::BTreeMap::from([
            ("value".to_string(), FilterValue::from(75)),
            ("label".to_string(), FilterValue::from("75%")),
        ]));
        let data = node(&[("progress", progress)]);
        let over_half = FilterItem::field_op("progress", FilterType::Number, FilterOp::GreaterThan, 50).unwrap();
        assert!(over_half.accepts(&data).unwrap());

        let empty = node(&[("progress", FilterValue::Dict(Default::default()))]);
        assert!(!over_half.accepts(&empty).unwrap());
    }

    #[test]
    fn test_date_buckets_against_fixed_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let yesterday = FilterValue::from("2024-05-14");

        assert_eq!(
            date_test(FilterOp::Equal, &yesterday, &"Yesterday".into(), today).unwrap(),
            Some(true)
        );
        assert_eq!(
            date_test(FilterOp::NotEqual, &yesterday, &"This Week".into(), today).unwrap(),
            Some(true)
        );
        assert_eq!(
            date_test(FilterOp::Equal, &FilterValue::Null, &"No Date".into(), today).unwrap(),
            Some(true)
        );
        // A non-string comparison value matches the raw field.
        assert_eq!(
            date_test(FilterOp::Equal, &FilterValue::Null, &FilterValue::Null, today).unwrap(),
            Some(true)
        );
        assert_eq!(
            date_test(FilterOp::LessThan, &yesterday, &"Today".into(), today).unwrap(),
            None
        );
    }

    #[test]
    fn test_date_time_filter_from_json() {
        let json = r#"{ "items": [
            { "kind": "field", "field": "due", "type": "date_time", "op": "=", "value": "Today" }
        ]}"#;
        let set = FilterSet::from_json(json).unwrap();

        let due_today = node(&[("due", Local::now().date_naive().into())]);
        let undated = node(&[]);
        assert!(set.accepts(&due_today).unwrap());
        assert!(!set.accepts(&undated).unwrap());

        let garbled = node(&[("due", "next sprint".into())]);
        assert!(matches!(set.accepts(&garbled), Err(Error::InvalidDate { .. })));

        let bad_op = r#"{ "items": [
            { "kind": "field", "field": "due", "type": "date_time", "op": ">", "value": "Today" }
        ]}"#;
        assert!(matches!(
            FilterSet::from_json(bad_op),
            Err(Error::UnsupportedOperation { filter_type: FilterType::DateTime, .. })
        ));
    }

    #[test]
    fn test_unsupported_operation() {
        let err = FilterItem::field_op("x", FilterType::Bool, FilterOp::GreaterThan, true).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedOperation { op: FilterOp::GreaterThan, filter_type: FilterType::Bool }
        ));

        // Unvalidated items report the same error when evaluated.
        let item = FilterItem::Field {
            field: "x".into(),
            filter_type: FilterType::Str,
            op: FilterOp::LessThan,
            value: "a".into(),
        };
        assert!(matches!(
            item.accepts(&node(&[])),
            Err(Error::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_groups() {
        let data = node(&[("status", "ip".into()), ("frames", 10.into())]);
        let status = FilterItem::field("status", "ip").unwrap();
        let long = FilterItem::field_op("frames", FilterType::Number, FilterOp::GreaterThan, 100).unwrap();

        let and = FilterItem::group(FilterOp::And, vec![status.clone(), long.clone()]).unwrap();
        let or = FilterItem::group(FilterOp::Or, vec![status, long]).unwrap();
        assert!(!and.accepts(&data).unwrap());
        assert!(or.accepts(&data).unwrap());

        let empty = FilterItem::group(FilterOp::Or, Vec::new()).unwrap();
        assert!(empty.accepts(&data).unwrap());

        let err = FilterItem::group(FilterOp::Equal, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidGroupOp { op: FilterOp::Equal }));
    }

    #[test]
    fn test_filter_set_from_json() {
        let json = r#"{
            "op": "and",
            "items": [
                { "kind": "field", "field": "status", "type": "str", "op": "in", "value": "ip" },
                { "kind": "group", "op": "or", "filters": [
                    { "kind": "field", "field": "frames", "type": "number", "op": ">", "value": 100 },
                    { "kind": "field", "field": "approved", "type": "bool", "op": "true" }
                ]}
            ]
        }"#;
        let set = FilterSet::from_json(json).unwrap();
        assert_eq!(set.items().len(), 2);

        let long_shot = node(&[("status", "IP".into()), ("frames", 240.into())]);
        let short_shot = node(&[("status", "ip".into()), ("frames", 12.into())]);
        let approved = node(&[("status", "ip".into()), ("approved", true.into())]);
        assert!(set.accepts(&long_shot).unwrap());
        assert!(!set.accepts(&short_shot).unwrap());
        assert!(set.accepts(&approved).unwrap());

        let round_trip = FilterSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(round_trip, set);
    }

    #[test]
    fn test_filter_set_rejects_bad_definitions() {
        let bad_group = r#"{ "op": "=", "items": [] }"#;
        assert!(matches!(
            FilterSet::from_json(bad_group),
            Err(Error::InvalidGroupOp { .. })
        ));

        let bad_op = r#"{ "items": [ { "kind": "field", "field": "f", "type": "bool", "op": "in" } ] }"#;
        assert!(matches!(
            FilterSet::from_json(bad_op),
            Err(Error::UnsupportedOperation { .. })
        ));

        assert!(matches!(FilterSet::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_empty_filter_set_accepts_everything() {
        let set = FilterSet::default();
        assert!(set.is_empty());
        assert!(set.accepts(&node(&[])).unwrap());
        assert!(Predicate::<HashMap<String, FilterValue>>::accepts(&set, &node(&[])).unwrap());
    }
}
