//! Parameter schema fragments describing tool arguments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared type of a single tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// UTF-8 string value.
    String,
    /// Integer value; floats and booleans do not qualify.
    Int,
    /// Boolean value.
    Bool,
    /// JSON array; contents are not inspected.
    List,
    /// JSON object; contents are not inspected.
    Dict,
    /// Any value is acceptable.
    Any,
}

impl ParamKind {
    /// Returns `true` when the runtime type of `value` satisfies this kind.
    ///
    /// Only the scalar kinds are checked exactly; `List`, `Dict`, and `Any`
    /// accept every value unconditionally.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::List | Self::Dict | Self::Any => true,
        }
    }

    /// Human-readable label used in validation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "integer",
            Self::Bool => "boolean",
            Self::List => "list",
            Self::Dict => "dict",
            Self::Any => "any",
        }
    }
}

/// Schema fragment for one named parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    kind: ParamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    required: bool,
}

impl ParamSpec {
    /// Creates a required parameter with no default value.
    #[must_use]
    pub const fn required(kind: ParamKind) -> Self {
        Self {
            kind,
            default: None,
            required: true,
        }
    }

    /// Creates an optional parameter carrying a default value.
    #[must_use]
    pub fn optional(kind: ParamKind, default: Value) -> Self {
        Self {
            kind,
            default: Some(default),
            required: false,
        }
    }

    /// Returns the declared parameter kind.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Returns the default value, if one was supplied.
    #[must_use]
    pub const fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns `true` when the parameter must be supplied by the caller.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }
}

/// Ordered mapping from parameter name to its schema fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSchema {
    params: BTreeMap<String, ParamSpec>,
}

impl ParamSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, returning the updated schema for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.params.insert(name.into(), spec);
        self
    }

    /// Returns the spec for the named parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.get(name)
    }

    /// Iterates over parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamSpec)> {
        self.params.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Returns the number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` when no parameters are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Derives the ordered list of parameter names that must be supplied.
    ///
    /// A parameter is required exactly when its spec marks it required;
    /// a spec carrying a default never appears here.
    #[must_use]
    pub fn required_names(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|(_, spec)| spec.is_required())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_names_skips_defaulted_params() {
        let schema = ParamSchema::new()
            .with("url", ParamSpec::required(ParamKind::String))
            .with("retries", ParamSpec::optional(ParamKind::Int, json!(3)))
            .with("headless", ParamSpec::required(ParamKind::Bool));

        assert_eq!(schema.required_names(), ["headless", "url"]);
        assert_eq!(schema.get("retries").unwrap().default(), Some(&json!(3)));
    }

    #[test]
    fn scalar_kinds_check_runtime_type() {
        assert!(ParamKind::String.matches(&json!("hi")));
        assert!(!ParamKind::String.matches(&json!(1)));
        assert!(ParamKind::Int.matches(&json!(42)));
        assert!(!ParamKind::Int.matches(&json!(4.2)));
        assert!(!ParamKind::Int.matches(&json!(true)));
        assert!(ParamKind::Bool.matches(&json!(false)));
        assert!(!ParamKind::Bool.matches(&json!("false")));
    }

    #[test]
    fn container_kinds_accept_everything() {
        for kind in [ParamKind::List, ParamKind::Dict, ParamKind::Any] {
            assert!(kind.matches(&json!("anything")));
            assert!(kind.matches(&json!({"k": 1})));
            assert!(kind.matches(&json!([1, 2])));
            assert!(kind.matches(&Value::Null));
        }
    }
}
