//! Default filter stage.

use chrono::DateTime;
use serde_json::Value;

use super::{failing_stage, FilterFactory, Stage};
use crate::pointer::Pointer;
use crate::state::{ClauseType, FilterClause, FilterOperator, FilterSpec};

/// Default filter factory: AND across paths, AND across each path's
/// clauses.
///
/// Both the record field and the clause value are coerced per the clause
/// type before comparing; a value that cannot be coerced makes the clause
/// false (not an error). Records missing the pointed-at field fail every
/// clause on that path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilter;

impl FilterFactory for DefaultFilter {
    fn build(&self, spec: &FilterSpec) -> Stage {
        let mut compiled: Vec<(Pointer, Vec<FilterClause>)> = Vec::new();
        for (path, clauses) in spec.clauses() {
            match Pointer::parse(path) {
                Ok(pointer) => compiled.push((pointer, clauses.clone())),
                Err(err) => return failing_stage(format!("filter: {err}")),
            }
        }

        Box::new(move |rows| {
            Ok(rows
                .into_iter()
                .filter(|row| {
                    compiled.iter().all(|(pointer, clauses)| {
                        let field = pointer.resolve(&row.value);
                        clauses.iter().all(|clause| clause_matches(clause, field))
                    })
                })
                .collect())
        })
    }
}

fn clause_matches(clause: &FilterClause, field: Option<&Value>) -> bool {
    let Some(field) = field else {
        return false;
    };
    match clause.clause_type {
        ClauseType::String => {
            let field = as_text(field);
            match clause.operator {
                FilterOperator::Includes => field.contains(&as_text(&clause.value)),
                FilterOperator::AnyOf => any_of(&clause.value, |v| as_text(v) == field),
                _ => compare(clause.operator, &field, &as_text(&clause.value)),
            }
        }
        ClauseType::Number => match as_number(field) {
            Some(field) => match clause.operator {
                FilterOperator::AnyOf => {
                    any_of(&clause.value, |v| as_number(v) == Some(field))
                }
                _ => match as_number(&clause.value) {
                    Some(value) => compare(clause.operator, &field, &value),
                    None => false,
                },
            },
            None => false,
        },
        ClauseType::Boolean => match (as_boolean(field), as_boolean(&clause.value)) {
            (Some(field), Some(value)) => compare(clause.operator, &field, &value),
            _ => match clause.operator {
                FilterOperator::AnyOf => as_boolean(field)
                    .map(|field| any_of(&clause.value, |v| as_boolean(v) == Some(field)))
                    .unwrap_or(false),
                _ => false,
            },
        },
        ClauseType::Date => match (as_timestamp(field), as_timestamp(&clause.value)) {
            (Some(field), Some(value)) => compare(clause.operator, &field, &value),
            _ => match clause.operator {
                FilterOperator::AnyOf => as_timestamp(field)
                    .map(|field| any_of(&clause.value, |v| as_timestamp(v) == Some(field)))
                    .unwrap_or(false),
                _ => false,
            },
        },
    }
}

/// Equality and ordering comparisons shared by every clause type. The
/// substring and membership operators are handled per-type by the caller;
/// reaching them here degrades to equality.
fn compare<T: PartialOrd>(operator: FilterOperator, field: &T, value: &T) -> bool {
    match operator {
        FilterOperator::Is | FilterOperator::Equals | FilterOperator::Includes => field == value,
        FilterOperator::IsNot | FilterOperator::NotEquals => field != value,
        FilterOperator::Lt => field < value,
        FilterOperator::Gt => field > value,
        FilterOperator::Lte => field <= value,
        FilterOperator::Gte => field >= value,
        FilterOperator::AnyOf => field == value,
    }
}

fn any_of(value: &Value, matches: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| matches(item)),
        single => matches(single),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Milliseconds since the epoch: RFC 3339 strings or numeric timestamps.
fn as_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Row;
    use crate::state::FilterPatch;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| Row { index, value })
            .collect()
    }

    fn spec(patch: FilterPatch) -> FilterSpec {
        let mut spec = FilterSpec::default();
        spec.merge(patch);
        spec
    }

    #[test]
    fn test_includes_is_substring_match() {
        let stage = DefaultFilter.build(&spec(
            FilterPatch::new().set("name", vec![FilterClause::new("b")]),
        ));
        let kept = stage(rows(vec![
            json!({"name": "foo"}),
            json!({"name": "blah"}),
            json!({"name": "bip"}),
        ]))
        .unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].index, 1);
        assert_eq!(kept[1].index, 2);
    }

    #[test]
    fn test_all_paths_must_match() {
        let stage = DefaultFilter.build(&spec(
            FilterPatch::new()
                .set("name", vec![FilterClause::new("b")])
                .set(
                    "id",
                    vec![FilterClause::new(2)
                        .operator(FilterOperator::Gte)
                        .clause_type(ClauseType::Number)],
                ),
        ));
        let kept = stage(rows(vec![
            json!({"id": 1, "name": "blah"}),
            json!({"id": 2, "name": "blah"}),
            json!({"id": 3, "name": "foo"}),
        ]))
        .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value["id"], json!(2));
    }

    #[test]
    fn test_number_coercion_from_strings() {
        let stage = DefaultFilter.build(&spec(FilterPatch::new().set(
            "age",
            vec![FilterClause::new("21")
                .operator(FilterOperator::Lt)
                .clause_type(ClauseType::Number)],
        )));
        let kept = stage(rows(vec![json!({"age": 18}), json!({"age": 30})])).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value["age"], json!(18));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let stage = DefaultFilter.build(&spec(
            FilterPatch::new().set("name", vec![FilterClause::new("b").operator(FilterOperator::IsNot)]),
        ));
        let kept = stage(rows(vec![json!({"other": 1})])).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn test_any_of_membership() {
        let stage = DefaultFilter.build(&spec(FilterPatch::new().set(
            "name",
            vec![FilterClause::new(json!(["foo", "bip"])).operator(FilterOperator::AnyOf)],
        )));
        let kept = stage(rows(vec![
            json!({"name": "foo"}),
            json!({"name": "blah"}),
            json!({"name": "bip"}),
        ]))
        .unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_date_comparison() {
        let stage = DefaultFilter.build(&spec(FilterPatch::new().set(
            "created",
            vec![FilterClause::new("2024-06-01T00:00:00Z")
                .operator(FilterOperator::Gte)
                .clause_type(ClauseType::Date)],
        )));
        let kept = stage(rows(vec![
            json!({"created": "2024-01-15T09:00:00Z"}),
            json!({"created": "2024-07-01T09:00:00Z"}),
        ]))
        .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].index, 1);
    }

    #[test]
    fn test_empty_spec_keeps_everything() {
        let stage = DefaultFilter.build(&FilterSpec::default());
        let kept = stage(rows(vec![json!({"a": 1}), json!({"a": 2})])).unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_uncoercible_clause_is_false() {
        let stage = DefaultFilter.build(&spec(FilterPatch::new().set(
            "age",
            vec![FilterClause::new("not a number")
                .operator(FilterOperator::Equals)
                .clause_type(ClauseType::Number)],
        )));
        let kept = stage(rows(vec![json!({"age": 18})])).unwrap();
        assert!(kept.is_empty());
    }
}
