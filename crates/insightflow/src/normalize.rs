//! Label/value normalization for arbitrary record shapes.
//!
//! Input payloads arrive with unknown shapes: mock-table rows, direct-JSON
//! arrays typed by the user, or fragments extracted from model output. This
//! module coerces them all into canonical [`DataPoint`] rows, dropping
//! records that fail coercion instead of defaulting them.
//!
//! # Field convention
//!
//! The field mapping is decided once, from the first object record:
//!
//! - records carrying explicit `label`/`value` fields use those verbatim;
//! - otherwise the **first** own key is the label source and the **second**
//!   own key is the value source (a documented convention, not a heuristic —
//!   it relies on `serde_json/preserve_order` keeping insertion order).
//!
//! Subsequent records missing the chosen fields are dropped. Labels are
//! string-coerced and trimmed; values accept JSON numbers and numeric
//! strings. A partial series is a valid outcome; an empty one is reported
//! as [`Normalized::Empty`], distinct from [`Normalized::NoInput`].

use serde_json::Value;

use crate::types::DataPoint;

/// Field names that win over the positional convention when present.
const LABEL_FIELD: &str = "label";
const VALUE_FIELD: &str = "value";

/// Outcome of normalizing a batch of records.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// No records were given at all.
    NoInput,
    /// Records were given, but none survived coercion.
    Empty,
    /// At least one record survived.
    Points {
        /// The surviving points, in input order
        points: Vec<DataPoint>,
        /// Name of the field values were read from (`"value"` or the
        /// positional second key), usable as a display data-type tag
        value_key: String,
    },
}

impl Normalized {
    /// The surviving points, if any.
    #[must_use]
    pub fn points(&self) -> Option<&[DataPoint]> {
        match self {
            Normalized::Points { points, .. } => Some(points),
            _ => None,
        }
    }
}

/// Coerce arbitrary key-value records into a canonical label/value series.
#[must_use]
pub fn normalize_records(records: &[Value]) -> Normalized {
    if records.is_empty() {
        return Normalized::NoInput;
    }

    let Some(first) = records.iter().find_map(Value::as_object) else {
        return Normalized::Empty;
    };

    // Decide the field mapping once, from the first object record.
    let (label_key, value_key) =
        if first.contains_key(LABEL_FIELD) && first.contains_key(VALUE_FIELD) {
            (LABEL_FIELD.to_string(), VALUE_FIELD.to_string())
        } else {
            let mut keys = first.keys();
            match (keys.next(), keys.next()) {
                (Some(label), Some(value)) => (label.clone(), value.clone()),
                _ => return Normalized::Empty,
            }
        };

    let points: Vec<DataPoint> = records
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|record| {
            let label = coerce_label(record.get(&label_key)?)?;
            let value = coerce_value(record.get(&value_key)?)?;
            DataPoint::new(label, value).ok()
        })
        .collect();

    if points.is_empty() {
        Normalized::Empty
    } else {
        Normalized::Points { points, value_key }
    }
}

/// String-coerce a label. Strings pass through, numbers and booleans are
/// rendered; null and nested structures are dropped.
fn coerce_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric-coerce a value. JSON numbers and numeric strings are accepted;
/// everything else is dropped. Non-finite results are rejected upstream.
fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(raw: &str) -> Vec<Value> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_no_input_distinct_from_empty() {
        assert_eq!(normalize_records(&[]), Normalized::NoInput);
        let dropped = records(r#"[{"label":"","value":"x"}]"#);
        assert_eq!(normalize_records(&dropped), Normalized::Empty);
    }

    #[test]
    fn test_explicit_label_value_fields() {
        let input = records(r#"[{"label":"A","value":10},{"label":"B","value":"20"}]"#);
        let Normalized::Points { points, value_key } = normalize_records(&input) else {
            panic!("expected points");
        };
        assert_eq!(value_key, "value");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "A");
        assert_eq!(points[0].value, 10.0);
        assert_eq!(points[1].value, 20.0);
    }

    #[test]
    fn test_positional_first_and_second_key() {
        let input = records(r#"[{"category":"Electronics","revenue":12000},{"category":"Clothing","revenue":8000}]"#);
        let Normalized::Points { points, value_key } = normalize_records(&input) else {
            panic!("expected points");
        };
        assert_eq!(value_key, "revenue");
        assert_eq!(points[0].label, "Electronics");
        assert_eq!(points[1].value, 8000.0);
    }

    #[test]
    fn test_explicit_fields_win_over_position() {
        // "value" and "label" are not the first two keys here
        let input = records(r#"[{"extra":1,"value":7,"label":"A"}]"#);
        let Normalized::Points { points, value_key } = normalize_records(&input) else {
            panic!("expected points");
        };
        assert_eq!(value_key, "value");
        assert_eq!(points[0].label, "A");
        assert_eq!(points[0].value, 7.0);
    }

    #[test]
    fn test_invalid_rows_dropped_not_defaulted() {
        let input = records(
            r#"[{"label":"","value":5},{"label":"B","value":"x"},{"label":"C","value":3}]"#,
        );
        let Normalized::Points { points, .. } = normalize_records(&input) else {
            panic!("expected points");
        };
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "C");
    }

    #[test]
    fn test_all_invalid_yields_empty() {
        let input = records(r#"[{"label":"","value":5},{"label":"B","value":"x"}]"#);
        assert_eq!(normalize_records(&input), Normalized::Empty);
    }

    #[test]
    fn test_labels_trimmed_and_numbers_coerced() {
        let input = records(r#"[{"month":"  Jan  ","cac":"200"}]"#);
        let Normalized::Points { points, .. } = normalize_records(&input) else {
            panic!("expected points");
        };
        assert_eq!(points[0].label, "Jan");
        assert_eq!(points[0].value, 200.0);
    }

    #[test]
    fn test_numeric_labels_rendered() {
        let input = records(r#"[{"year":2024,"revenue":100}]"#);
        let Normalized::Points { points, .. } = normalize_records(&input) else {
            panic!("expected points");
        };
        assert_eq!(points[0].label, "2024");
    }

    #[test]
    fn test_non_object_rows_dropped() {
        let input = vec![json!("just a string"), json!({"label":"A","value":1})];
        let Normalized::Points { points, .. } = normalize_records(&input) else {
            panic!("expected points");
        };
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_single_key_records_are_empty() {
        let input = records(r#"[{"only":"one"}]"#);
        assert_eq!(normalize_records(&input), Normalized::Empty);
    }

    #[test]
    fn test_every_output_point_satisfies_invariant() {
        let input = records(
            r#"[{"label":" A ","value":1},{"label":"B","value":"nan"},{"label":"C","value":"2.5"}]"#,
        );
        if let Normalized::Points { points, .. } = normalize_records(&input) {
            for point in &points {
                assert!(!point.label.trim().is_empty());
                assert!(point.value.is_finite());
                assert_eq!(point.label, point.label.trim());
            }
        } else {
            panic!("expected points");
        }
    }
}
