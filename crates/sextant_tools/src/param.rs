//! Argument validation and parameter extraction.
//!
//! - [`validate_arguments`] checks a model's raw arguments against a tool's
//!   analyzed signature and produces [`CallArgs`] or a list of
//!   [`ValidationIssue`]s.
//! - [`FunctionParam`] extracts typed values from validated [`CallArgs`].
//! - [`Kwargs`] collects extra named arguments for tools that accept them.

use crate::error::ToolError;
use crate::schema::StructuredSchema;
use crate::signature::{AnalyzedSignature, ParamKind};
use core::ops::{Deref, DerefMut};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// One problem found while validating a model's arguments.
///
/// Serialized into the retry prompt sent back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Machine-readable category, e.g. `missing`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Path to the offending argument; empty for the whole object.
    pub loc: Vec<String>,
    /// Human-readable message.
    pub msg: String,
}

impl ValidationIssue {
    fn new(kind: &'static str, loc: &[&str], msg: impl Into<String>) -> Self {
        Self {
            kind,
            loc: loc.iter().map(|part| (*part).to_string()).collect(),
            msg: msg.into(),
        }
    }
}

/// Validated arguments for one tool call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    values: Map<String, Value>,
    extra: Map<String, Value>,
}

impl CallArgs {
    /// Creates arguments from an already-validated object.
    #[must_use]
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            extra: Map::new(),
        }
    }

    /// Deserializes a required argument by name.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ToolError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ToolError::parameter_error(format!("Missing parameter: {name}")))?;

        T::deserialize(value).map_err(|err| {
            ToolError::parameter_error(format!("Failed to deserialize parameter '{name}': {err}"))
        })
    }

    /// Deserializes an optional argument by name. Returns `None` if missing or null.
    pub fn get_optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ToolError> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value).map(Some).map_err(|err| {
                ToolError::parameter_error(format!("Failed to deserialize parameter '{name}': {err}"))
            }),
        }
    }

    /// Deserializes every extra named argument.
    pub fn kwargs<T: DeserializeOwned>(&self) -> Result<Kwargs<T>, ToolError> {
        self.extra
            .iter()
            .map(|(name, value)| {
                T::deserialize(value).map(|v| (name.clone(), v)).map_err(|err| {
                    ToolError::parameter_error(format!(
                        "Failed to deserialize keyword argument '{name}': {err}"
                    ))
                })
            })
            .collect::<Result<IndexMap<_, _>, _>>()
            .map(Kwargs)
    }

    /// Named arguments bound to declared parameters.
    #[must_use]
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Extra named arguments collected for a variadic-keyword parameter.
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Types that can be extracted as tool parameters.
pub trait FunctionParam: Sized {
    /// Extracts a required parameter.
    fn extract(args: &CallArgs, name: &str) -> Result<Self, ToolError>;

    /// Extracts an optional parameter.
    ///
    /// Returns `Ok(None)` when the argument is missing or null.
    /// Used by `Option<T>` parameters and `#[default]` parameters.
    fn extract_optional(args: &CallArgs, name: &str) -> Result<Option<Self>, ToolError>;
}

impl<T: DeserializeOwned> FunctionParam for T {
    fn extract(args: &CallArgs, name: &str) -> Result<Self, ToolError> {
        args.get(name)
    }

    fn extract_optional(args: &CallArgs, name: &str) -> Result<Option<Self>, ToolError> {
        args.get_optional(name)
    }
}

/// Extra named arguments, for tools that accept arbitrary keywords.
///
/// Declaring a `Kwargs<T>` parameter sets `additionalProperties: true` on the
/// tool's schema; every undeclared argument must deserialize as `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kwargs<T = Value>(pub IndexMap<String, T>);

impl<T> Default for Kwargs<T> {
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl<T> Deref for Kwargs<T> {
    type Target = IndexMap<String, T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Kwargs<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> IntoIterator for Kwargs<T> {
    type Item = (String, T);
    type IntoIter = indexmap::map::IntoIter<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Validates raw model arguments against an analyzed signature.
///
/// `raw` may be a JSON object, a string containing one, or null (no
/// arguments). Declared defaults are filled in for absent arguments; null or
/// absent optional arguments are left out.
pub fn validate_arguments(
    signature: &AnalyzedSignature,
    schema: &StructuredSchema,
    raw: &Value,
) -> Result<CallArgs, Vec<ValidationIssue>> {
    let object = match raw {
        Value::Object(object) => object.clone(),
        Value::Null => Map::new(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return Err(vec![not_an_object()]),
            Err(err) => {
                return Err(vec![ValidationIssue::new(
                    "json_invalid",
                    &[],
                    format!("Invalid JSON: {err}"),
                )]);
            }
        },
        _ => return Err(vec![not_an_object()]),
    };

    if let Some(param) = schema.passthrough_param() {
        let Some((_, ty)) = signature.plain_params().next() else {
            return Ok(CallArgs::default());
        };
        let value = Value::Object(object);
        return match ty.validate(&value) {
            Ok(()) => {
                let mut values = Map::new();
                values.insert(param.to_string(), value);
                Ok(CallArgs::new(values))
            }
            Err(msg) => Err(vec![ValidationIssue::new("model_type", &[], msg)]),
        };
    }

    let mut issues = Vec::new();
    let mut values = Map::new();
    let mut extra = Map::new();
    let mut var_keyword = None;

    for (param, ty) in signature.plain_params() {
        let name = param.name.as_str();
        match param.kind {
            ParamKind::VarKeyword => {
                var_keyword = Some(ty);
                continue;
            }
            ParamKind::VarPositional => {
                match object.get(name) {
                    None | Some(Value::Null) => {
                        values.insert(name.to_string(), Value::Array(Vec::new()));
                    }
                    Some(Value::Array(items)) => {
                        for (index, item) in items.iter().enumerate() {
                            if let Err(msg) = ty.validate(item) {
                                let index = index.to_string();
                                issues.push(ValidationIssue::new("invalid_value", &[name, index.as_str()], msg));
                            }
                        }
                        values.insert(name.to_string(), Value::Array(items.clone()));
                    }
                    Some(_) => {
                        issues.push(ValidationIssue::new("list_type", &[name], "Input should be a valid list"));
                    }
                }
                continue;
            }
            _ => {}
        }

        match object.get(name) {
            Some(Value::Null) if param.optional => {}
            Some(value) => match ty.validate(value) {
                Ok(()) => {
                    values.insert(name.to_string(), value.clone());
                }
                Err(msg) => issues.push(ValidationIssue::new("invalid_value", &[name], msg)),
            },
            None => {
                if let Some(default) = &param.default {
                    values.insert(name.to_string(), default.clone());
                } else if !param.optional {
                    issues.push(ValidationIssue::new("missing", &[name], "Field required"));
                }
            }
        }
    }

    let declared = |key: &str| {
        signature
            .plain_params()
            .any(|(param, _)| param.name == key && param.kind != ParamKind::VarKeyword)
    };
    for (key, value) in &object {
        if declared(key) {
            continue;
        }
        match var_keyword {
            Some(ty) => match ty.validate(value) {
                Ok(()) => {
                    extra.insert(key.clone(), value.clone());
                }
                Err(msg) => issues.push(ValidationIssue::new("invalid_value", &[key.as_str()], msg)),
            },
            None => issues.push(ValidationIssue::new(
                "extra_forbidden",
                &[key.as_str()],
                "Extra inputs are not permitted",
            )),
        }
    }

    if issues.is_empty() {
        Ok(CallArgs { values, extra })
    } else {
        Err(issues)
    }
}

fn not_an_object() -> ValidationIssue {
    ValidationIssue::new("dict_type", &[], "Input should be an object")
}
