//! Search parameters.

use serde::{Deserialize, Serialize};

/// The current search parameters.
///
/// `escape` and `flags` are carried for the benefit of pattern-based
/// search factories (escaping user input, regex flags); the default
/// factory performs plain substring matching and ignores them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSpec {
    /// The text to look for. Empty or absent means "no search".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Dotted paths of the record fields to search in. An empty scope
    /// makes the search stage a no-op.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    /// Whether a pattern-based factory should escape the input.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub escape: bool,
    /// Pattern flags for a pattern-based factory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

impl SearchSpec {
    /// Merges a partial update into this spec.
    pub fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.value {
            self.value = Some(value);
        }
        if let Some(scope) = patch.scope {
            self.scope = scope;
        }
        if let Some(escape) = patch.escape {
            self.escape = escape;
        }
        if let Some(flags) = patch.flags {
            self.flags = Some(flags);
        }
    }
}

/// Partial update for [`SearchSpec`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escape: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

impl SearchPatch {
    /// Creates an empty patch (a state-wise no-op when merged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search text.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the searched fields.
    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = Some(scope.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the escape knob.
    pub fn escape(mut self, escape: bool) -> Self {
        self.escape = Some(escape);
        self
    }

    /// Sets the pattern flags.
    pub fn flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_scope_when_only_value_changes() {
        let mut spec = SearchSpec::default();
        spec.merge(SearchPatch::new().value("a").scope(["name", "id"]));
        spec.merge(SearchPatch::new().value("ab"));
        assert_eq!(spec.value.as_deref(), Some("ab"));
        assert_eq!(spec.scope, vec!["name".to_string(), "id".to_string()]);
    }

    #[test]
    fn test_default_spec_serializes_empty() {
        let json = serde_json::to_value(SearchSpec::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
