//! Value classification and default field kind inference.
//!
//! Every raw sample value is classified once into a [`ValueShape`]; the rest
//! of the engine only compares shapes and never looks at the raw value's
//! structure again. A missing value (`None`) is the "undefined" bucket.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

use crate::schema::{DataType, FieldType};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B, %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%d %B, %Y %I:%M %p",
    "%I:%M %p %d %B, %Y",
    "%H:%M %d %B, %Y",
];

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern is valid")
});

/// Structural classification of a sample value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueShape {
    pub data_type: DataType,
    /// Type of the first element, for arrays only.
    pub sub_data_type: Option<DataType>,
}

impl ValueShape {
    pub fn of(value: Option<&Value>) -> Self {
        Self {
            data_type: data_type_for(value),
            sub_data_type: sub_data_type_for(value),
        }
    }

    pub fn is_nullish(&self) -> bool {
        self.data_type.is_nullish()
    }
}

pub fn data_type_for(value: Option<&Value>) -> DataType {
    match value {
        None => DataType::Undefined,
        Some(Value::Null) => DataType::Null,
        Some(Value::Bool(_)) => DataType::Boolean,
        Some(Value::Number(_)) => DataType::Number,
        Some(Value::String(_)) => DataType::String,
        Some(Value::Array(_)) => DataType::Array,
        Some(Value::Object(_)) => DataType::Object,
    }
}

/// Data type of an array's first element. Non-arrays and empty arrays have
/// no sub type.
pub fn sub_data_type_for(value: Option<&Value>) -> Option<DataType> {
    match value {
        Some(Value::Array(items)) => {
            normalize_array_value(items).map(|first| data_type_for(Some(first)))
        }
        _ => None,
    }
}

/// The element that stands in for a primitive array's shape.
pub fn normalize_array_value(items: &[Value]) -> Option<&Value> {
    items.first()
}

pub fn field_type_for(value: Option<&Value>) -> FieldType {
    let shape = ValueShape::of(value);
    match (shape.data_type, value) {
        (DataType::Array, _) => match shape.sub_data_type {
            Some(DataType::Object) | None => FieldType::Array,
            Some(_) => FieldType::Multiselect,
        },
        (DataType::Object, _) => FieldType::Object,
        (DataType::Number, _) => FieldType::NumberInput,
        (DataType::Boolean, _) => FieldType::Switch,
        (DataType::String, Some(Value::String(text))) => {
            if is_email(text) {
                FieldType::EmailInput
            } else if is_date_like(text) {
                FieldType::Datepicker
            } else {
                FieldType::TextInput
            }
        }
        _ => FieldType::TextInput,
    }
}

/// True when either side is null or absent.
pub fn has_null_or_undefined(current: Option<&Value>, previous: Option<&Value>) -> bool {
    [current, previous]
        .into_iter()
        .any(|value| matches!(value, None | Some(Value::Null)))
}

/// True when both values are arrays whose element type differs.
pub fn check_if_array_and_sub_data_type_changed(
    current: Option<&Value>,
    previous: Option<&Value>,
) -> bool {
    match (current, previous) {
        (Some(Value::Array(_)), Some(Value::Array(_))) => {
            sub_data_type_for(current) != sub_data_type_for(previous)
        }
        _ => false,
    }
}

pub fn is_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Whether `value` reads as a calendar date or timestamp in one of the
/// accepted formats. Bare digit runs are never dates.
pub fn is_date_like(value: &str) -> bool {
    parse_date_like(value).is_some()
}

pub fn parse_date_like(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_type_for_classifies_every_json_shape() {
        let cases = [
            (Some(json!("string")), DataType::String),
            (Some(json!(10)), DataType::Number),
            (Some(json!(true)), DataType::Boolean),
            (Some(json!([])), DataType::Array),
            (Some(Value::Null), DataType::Null),
            (None, DataType::Undefined),
            (Some(json!({})), DataType::Object),
        ];
        for (input, expected) in cases {
            assert_eq!(data_type_for(input.as_ref()), expected, "{input:?}");
        }
    }

    #[test]
    fn sub_data_type_only_applies_to_non_empty_arrays() {
        let cases = [
            (Some(json!("string")), None),
            (Some(json!(10)), None),
            (Some(json!([{}])), Some(DataType::Object)),
            (Some(json!([""])), Some(DataType::String)),
            (Some(json!([1])), Some(DataType::Number)),
            (Some(json!([null])), Some(DataType::Null)),
            (Some(json!([])), None),
            (Some(Value::Null), None),
            (None, None),
            (Some(json!({ "foo": "" })), None),
        ];
        for (input, expected) in cases {
            assert_eq!(sub_data_type_for(input.as_ref()), expected, "{input:?}");
        }
    }

    #[test]
    fn normalize_array_value_returns_first_element() {
        assert_eq!(normalize_array_value(&[json!(""), json!("x")]), Some(&json!("")));
        assert_eq!(normalize_array_value(&[json!(1), json!(2)]), Some(&json!(1)));
        assert_eq!(normalize_array_value(&[]), None);
        assert_eq!(normalize_array_value(&[Value::Null]), Some(&Value::Null));
    }

    #[test]
    fn field_type_for_recognises_dates_in_common_formats() {
        let dates = [
            "2021-12-30T10:36:12.1212+05:30",
            "December 30, 2021 10:36 AM",
            "December 30, 2021",
            "2021-12-30 10:36",
            "2021-12-30T10:36:12",
            "2021-12-30 10:36:12 AM",
            "30/12/2021 10:36",
            "30 December, 2021",
            "10:36 AM 30 December, 2021",
            "2021-12-30",
            "12-30-2021",
            "30-12-2021",
            "12/30/2021",
            "30/12/2021",
            "30/12/21",
            "12/30/21",
        ];
        for date in dates {
            assert_eq!(
                field_type_for(Some(&json!(date))),
                FieldType::Datepicker,
                "{date}"
            );
        }
    }

    #[test]
    fn field_type_for_rejects_number_like_and_malformed_dates() {
        for text in ["string", "40/10/40", "2000/10", "1", "#111", "999", "test@.com"] {
            assert_eq!(
                field_type_for(Some(&json!(text))),
                FieldType::TextInput,
                "{text}"
            );
        }
    }

    #[test]
    fn field_type_for_covers_non_string_values() {
        assert_eq!(field_type_for(Some(&json!("test@demo.com"))), FieldType::EmailInput);
        assert_eq!(field_type_for(Some(&json!(10))), FieldType::NumberInput);
        assert_eq!(field_type_for(Some(&json!(false))), FieldType::Switch);
        assert_eq!(field_type_for(Some(&json!([{}]))), FieldType::Array);
        assert_eq!(field_type_for(Some(&json!([""]))), FieldType::Multiselect);
        assert_eq!(field_type_for(Some(&json!([1]))), FieldType::Multiselect);
        assert_eq!(field_type_for(Some(&json!([null]))), FieldType::Multiselect);
        assert_eq!(field_type_for(Some(&Value::Null)), FieldType::TextInput);
        assert_eq!(field_type_for(None), FieldType::TextInput);
        assert_eq!(field_type_for(Some(&json!({ "foo": "" }))), FieldType::Object);
    }

    #[test]
    fn has_null_or_undefined_flags_either_side() {
        let cases: [((Option<Value>, Option<Value>), bool); 11] = [
            ((Some(json!("1")), Some(json!("2"))), false),
            ((Some(json!(0)), Some(json!(""))), false),
            ((None, Some(json!("2"))), true),
            ((None, Some(Value::Null)), true),
            ((None, None), true),
            ((Some(Value::Null), Some(Value::Null)), true),
            ((Some(Value::Null), Some(json!("null"))), true),
            ((Some(json!("null")), Some(json!("null"))), false),
            ((Some(json!("undefined")), Some(json!("undefined"))), false),
            ((Some(json!(0)), Some(json!(0))), false),
            ((Some(json!("")), Some(json!(""))), false),
        ];
        for ((current, previous), expected) in cases {
            assert_eq!(
                has_null_or_undefined(current.as_ref(), previous.as_ref()),
                expected,
                "{current:?} / {previous:?}"
            );
        }
    }

    #[test]
    fn array_sub_type_change_is_detected() {
        let objects = json!([{}]);
        let strings = json!([""]);
        assert!(check_if_array_and_sub_data_type_changed(Some(&objects), Some(&strings)));
        assert!(!check_if_array_and_sub_data_type_changed(Some(&objects), Some(&json!([{}]))));
        assert!(!check_if_array_and_sub_data_type_changed(Some(&objects), Some(&json!("x"))));
    }

    #[test]
    fn parse_date_like_normalises_to_naive_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2021, 12, 30)
            .and_then(|date| date.and_hms_opt(10, 36, 0))
            .expect("valid timestamp");
        assert_eq!(parse_date_like("December 30, 2021 10:36 AM"), Some(expected));
        assert_eq!(parse_date_like("30/12/2021 10:36"), Some(expected));
        assert_eq!(parse_date_like("   "), None);
    }
}
