//! Default ordering stage.

use std::cmp::Ordering;

use serde_json::Value;

use super::{identity_stage, failing_stage, SortFactory, Stage};
use crate::pointer::Pointer;
use crate::state::{SortDirection, SortSpec};

/// Default sort factory: stable ordering on the pointed-at record field.
///
/// Missing fields sort after any present value regardless of direction.
/// Present values order null < bool < number < string, same-type values by
/// their natural order, reversed for [`SortDirection::Desc`]. With an
/// absent pointer or a `none` direction the stage is an identity pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSort;

impl SortFactory for DefaultSort {
    fn build(&self, spec: &SortSpec) -> Stage {
        let pointer = match (&spec.pointer, spec.direction) {
            (_, Some(SortDirection::None)) | (None, _) => return identity_stage(),
            (Some(path), _) => match Pointer::parse(path) {
                Ok(pointer) => pointer,
                Err(err) => return failing_stage(format!("sort: {err}")),
            },
        };
        let descending = spec.direction == Some(SortDirection::Desc);

        Box::new(move |mut rows| {
            rows.sort_by(|a, b| {
                compare_fields(pointer.resolve(&a.value), pointer.resolve(&b.value), descending)
            });
            Ok(rows)
        })
    }
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>, descending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        // Missing values always sort last, independent of direction.
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b);
            if descending { ordering.reverse() } else { ordering }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .unwrap_or(f64::NAN)
            .partial_cmp(&b.as_f64().unwrap_or(f64::NAN))
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
