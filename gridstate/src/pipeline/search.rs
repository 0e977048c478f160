//! Default search stage.

use serde_json::Value;

use super::{failing_stage, identity_stage, SearchFactory, Stage};
use crate::pointer::Pointer;
use crate::state::SearchSpec;

/// Default search factory: case-insensitive substring match over the
/// scoped record fields.
///
/// A record passes when any scoped field contains the search value. The
/// stage is an identity pass when the value is blank or the scope is
/// empty. The `escape`/`flags` knobs on [`SearchSpec`] are meant for
/// pattern-based replacement factories and are ignored here.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSearch;

impl SearchFactory for DefaultSearch {
    fn build(&self, spec: &SearchSpec) -> Stage {
        let needle = match &spec.value {
            Some(value) if !value.is_empty() && !spec.scope.is_empty() => value.to_lowercase(),
            _ => return identity_stage(),
        };

        let mut scope = Vec::with_capacity(spec.scope.len());
        for path in &spec.scope {
            match Pointer::parse(path) {
                Ok(pointer) => scope.push(pointer),
                Err(err) => return failing_stage(format!("search: {err}")),
            }
        }

        Box::new(move |rows| {
            Ok(rows
                .into_iter()
                .filter(|row| {
                    scope.iter().any(|pointer| {
                        pointer
                            .resolve(&row.value)
                            .is_some_and(|field| as_text(field).to_lowercase().contains(&needle))
                    })
                })
                .collect())
        })
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
