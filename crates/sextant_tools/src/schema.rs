//! JSON Schema derivation for tool parameters.
//!
//! Type schemas come from a [`TypeSchemaProvider`]; the default provider,
//! [`JsonSchemaType`], delegates to `schemars`. [`build_schema`] assembles the
//! provider output and the parsed documentation into a [`StructuredSchema`].
//!
//! Two shapes are produced:
//!
//! - **Passthrough**: a function whose only parameter is a required
//!   structured type (a struct with named fields) uses that type's own schema
//!   directly.
//! - **Object**: everything else gets a wrapping object with one property per
//!   parameter; structured types are referenced from `$defs`.

use crate::docstring::ParsedDocstring;
use crate::signature::{AnalyzedSignature, ParamKind};
use indexmap::IndexMap;
use schemars::{JsonSchema, SchemaGenerator};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

/// Maps a type to its schema and validates values against it.
pub trait TypeSchemaProvider: Send + Sync + 'static {
    /// Name of the type; the `$defs` key for structured types.
    fn type_name(&self) -> Cow<'static, str>;

    /// Whether values are multi-field records with named properties.
    fn is_structured(&self) -> bool;

    /// Schema for use inside another schema. Structured types register
    /// themselves with `generator` and return a `$ref`.
    fn subschema(&self, generator: &mut SchemaGenerator) -> Value;

    /// Standalone schema for the type, including its own `$defs`.
    fn root_schema(&self) -> Map<String, Value>;

    /// Checks that `value` can be read as this type.
    fn validate(&self, value: &Value) -> Result<(), String>;
}

/// Shared handle to a [`TypeSchemaProvider`].
pub type TypeRef = Arc<dyn TypeSchemaProvider>;

/// [`TypeSchemaProvider`] backed by `schemars` and `serde`.
pub struct JsonSchemaType<T>(PhantomData<fn() -> T>);

impl<T> JsonSchemaType<T>
where
    T: JsonSchema + DeserializeOwned + 'static,
{
    /// Creates a shared provider for `T`.
    #[must_use]
    pub fn new_ref() -> TypeRef {
        Arc::new(Self(PhantomData))
    }
}

impl<T> TypeSchemaProvider for JsonSchemaType<T>
where
    T: JsonSchema + DeserializeOwned + 'static,
{
    fn type_name(&self) -> Cow<'static, str> {
        T::schema_name()
    }

    fn is_structured(&self) -> bool {
        let root = self.root_schema();
        root.get("type").and_then(Value::as_str) == Some("object")
            && root.contains_key("properties")
    }

    fn subschema(&self, generator: &mut SchemaGenerator) -> Value {
        match generator.subschema_for::<T>().to_value() {
            // `true` accepts anything; an empty object does too and can carry keywords.
            Value::Bool(true) => json!({}),
            schema => schema,
        }
    }

    fn root_schema(&self) -> Map<String, Value> {
        let schema = SchemaGenerator::default().root_schema_for::<T>().to_value();
        let mut object = match schema {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        object.shift_remove("$schema");
        object
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        T::deserialize(value).map(drop).map_err(|err| err.to_string())
    }
}

/// A wrapping object schema: one property per parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Function-level description.
    pub description: Option<String>,
    /// Property schemas in parameter order.
    pub properties: IndexMap<String, Value>,
    /// Names of required properties.
    pub required: Vec<String>,
    /// Whether undeclared properties are accepted.
    pub additional_properties: bool,
    /// Nested definitions referenced by properties.
    pub defs: Map<String, Value>,
}

/// The derived input schema of a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredSchema {
    /// Wrapping object schema.
    Object(ObjectSchema),
    /// The single structured parameter's own schema.
    Passthrough {
        /// Name of the parameter the arguments bind to.
        param: String,
        /// Function-level description.
        description: Option<String>,
        /// The type's schema.
        schema: Map<String, Value>,
    },
}

impl StructuredSchema {
    /// Function-level description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Object(object) => object.description.as_deref(),
            Self::Passthrough { description, .. } => description.as_deref(),
        }
    }

    /// The parameter receiving the whole argument object, for passthrough schemas.
    #[must_use]
    pub fn passthrough_param(&self) -> Option<&str> {
        match self {
            Self::Object(_) => None,
            Self::Passthrough { param, .. } => Some(param),
        }
    }

    /// Renders the schema as JSON. `description` is always the first key.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        match self {
            Self::Object(object) => {
                if let Some(description) = &object.description {
                    out.insert("description".into(), description.clone().into());
                }
                if !object.defs.is_empty() {
                    out.insert("$defs".into(), Value::Object(object.defs.clone()));
                }
                out.insert(
                    "additionalProperties".into(),
                    object.additional_properties.into(),
                );
                let properties: Map<String, Value> = object
                    .properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.clone()))
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                if !object.required.is_empty() {
                    out.insert("required".into(), json!(object.required));
                }
                out.insert("type".into(), "object".into());
            }
            Self::Passthrough {
                description,
                schema,
                ..
            } => {
                if let Some(description) = description.clone().or_else(|| {
                    schema
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                }) {
                    out.insert("description".into(), description.into());
                }
                for (key, value) in schema {
                    if key != "description" {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Value::Object(out)
    }
}

impl Serialize for StructuredSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Builds the input schema from the analyzed signature and its documentation.
///
/// Descriptions resolve as: explicit parameter description, then the
/// documentation's entry for that name, then none.
#[must_use]
pub fn build_schema(signature: &AnalyzedSignature, docs: &ParsedDocstring) -> StructuredSchema {
    let description = docs.description.clone();
    let plain: Vec<_> = signature.plain_params().collect();

    if let [(param, ty)] = plain.as_slice()
        && param.kind != ParamKind::VarPositional
        && param.kind != ParamKind::VarKeyword
        && param.is_required()
        && ty.is_structured()
    {
        return StructuredSchema::Passthrough {
            param: param.name.clone(),
            description,
            schema: ty.root_schema(),
        };
    }

    let mut generator = SchemaGenerator::default();
    let mut object = ObjectSchema {
        description,
        additional_properties: signature.accepts_var_keyword(),
        ..ObjectSchema::default()
    };

    for (param, ty) in plain {
        if param.kind == ParamKind::VarKeyword {
            continue;
        }

        let mut schema = ty.subschema(&mut generator);
        if param.kind == ParamKind::VarPositional {
            schema = json!({ "type": "array", "items": schema });
        }

        if let Some(obj) = schema.as_object_mut() {
            let param_description = param
                .description
                .clone()
                .or_else(|| docs.params.get(&param.name).cloned());
            if let Some(desc) = param_description {
                obj.insert("description".to_string(), Value::String(desc));
            }
            if let Some(default) = &param.default {
                obj.insert("default".to_string(), default.clone());
            }
        }

        if param.is_required() {
            object.required.push(param.name.clone());
        }
        object.properties.insert(param.name.clone(), schema);
    }

    object.defs = generator.definitions().clone();
    StructuredSchema::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstring::parse_docstring;
    use serde::Deserialize;
    use crate::signature::{FunctionSignature, ParamSpec, analyze};

    #[derive(Deserialize, JsonSchema)]
    #[expect(dead_code, reason = "only the schema is used")]
    struct Foo {
        x: i64,
        y: String,
    }

    fn derive(signature: &FunctionSignature) -> Value {
        let analyzed = analyze(signature, None).unwrap();
        let docs = signature
            .doc
            .as_deref()
            .map_or_else(ParsedDocstring::empty, parse_docstring);
        build_schema(&analyzed, &docs).to_value()
    }

    #[test]
    fn google_docstring_schema() {
        let signature = FunctionSignature::new("google_style_docstring")
            .with_doc("Do foobar stuff, a lot.\n\nArgs:\n    foo: The foo thing.\n    bar: The bar thing.")
            .param(ParamSpec::of::<i64>("foo"))
            .param(ParamSpec::of::<String>("bar"));

        let schema = derive(&signature);
        assert_eq!(
            schema,
            json!({
                "description": "Do foobar stuff, a lot.",
                "additionalProperties": false,
                "properties": {
                    "foo": {"description": "The foo thing.", "type": "integer", "format": "int64"},
                    "bar": {"description": "The bar thing.", "type": "string"},
                },
                "required": ["foo", "bar"],
                "type": "object",
            })
        );
        let first_key = schema.as_object().unwrap().keys().next().unwrap();
        assert_eq!(first_key, "description");
    }

    #[test]
    fn unknown_docstring_with_var_keyword() {
        let signature = FunctionSignature::new("unknown_docstring")
            .with_doc("Unknown style docstring.")
            .param(ParamSpec::of::<i64>("kwargs").with_kind(ParamKind::VarKeyword));

        assert_eq!(
            derive(&signature),
            json!({
                "description": "Unknown style docstring.",
                "additionalProperties": true,
                "properties": {},
                "type": "object",
            })
        );
    }

    #[test]
    fn explicit_description_beats_docstring() {
        let signature = FunctionSignature::new("no_body")
            .with_doc("Args:\n    foo: The foo thing.\n    bar: The bar thing.")
            .param(ParamSpec::of::<i64>("foo"))
            .param(ParamSpec::of::<String>("bar").with_description("from fields"));

        let schema = derive(&signature);
        assert!(schema.get("description").is_none());
        assert_eq!(schema["properties"]["foo"]["description"], "The foo thing.");
        assert_eq!(schema["properties"]["bar"]["description"], "from fields");
    }

    #[test]
    fn single_structured_param_passes_through() {
        let signature = FunctionSignature::new("takes_just_model").param(ParamSpec::of::<Foo>("model"));
        let schema = derive(&signature);

        assert_eq!(schema["title"], "Foo");
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["x", "y"]));
        assert!(schema.get("properties").unwrap().get("model").is_none());
        assert!(schema.get("$defs").is_none());
        assert!(schema.get("$schema").is_none());
    }

    #[test]
    fn structured_param_with_scalar_uses_defs() {
        let signature = FunctionSignature::new("takes_model_and_int")
            .param(ParamSpec::of::<Foo>("model"))
            .param(ParamSpec::of::<i64>("z"));
        let schema = derive(&signature);

        assert_eq!(schema["properties"]["model"], json!({"$ref": "#/$defs/Foo"}));
        assert_eq!(schema["$defs"]["Foo"]["type"], "object");
        assert_eq!(schema["required"], json!(["model", "z"]));
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn omittable_structured_param_is_wrapped() {
        let optional = FunctionSignature::new("maybe_model").param(ParamSpec::of::<Foo>("model").optional());
        let schema = derive(&optional);
        assert_eq!(schema["properties"]["model"], json!({"$ref": "#/$defs/Foo"}));
        assert!(schema.get("required").is_none());
        assert_eq!(schema["$defs"]["Foo"]["required"], json!(["x", "y"]));

        let defaulted = FunctionSignature::new("model_with_default").param(
            ParamSpec::of::<Foo>("model")
                .with_default(json!({"x": 1, "y": "d"}))
                .with_description("The model."),
        );
        let schema = derive(&defaulted);
        assert_eq!(schema["properties"]["model"]["default"], json!({"x": 1, "y": "d"}));
        assert_eq!(schema["properties"]["model"]["description"], "The model.");
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn defaults_and_variadic_positionals() {
        let signature = FunctionSignature::new("f")
            .param(ParamSpec::of::<String>("query"))
            .param(ParamSpec::of::<u32>("limit").with_default(json!(10)))
            .param(ParamSpec::of::<String>("tags").with_kind(ParamKind::VarPositional));
        let schema = derive(&signature);

        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["limit"]["default"], 10);
        assert_eq!(schema["properties"]["tags"]["type"], "array");
        assert_eq!(schema["properties"]["tags"]["items"]["type"], "string");
        let keys: Vec<_> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["query", "limit", "tags"]);
    }

    #[test]
    fn no_parameters() {
        let schema = derive(&FunctionSignature::new("nothing"));
        assert_eq!(
            schema,
            json!({"additionalProperties": false, "properties": {}, "type": "object"})
        );
    }

    #[test]
    fn derivation_is_idempotent() {
        let signature = FunctionSignature::new("takes_model_and_int")
            .with_doc("Summary.\n\n:param z: The z.")
            .param(ParamSpec::of::<Foo>("model"))
            .param(ParamSpec::of::<i64>("z"));
        let first = serde_json::to_string(&derive(&signature)).unwrap();
        let second = serde_json::to_string(&derive(&signature)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn provider_validation() {
        let ty = JsonSchemaType::<i64>::new_ref();
        assert!(ty.validate(&json!(3)).is_ok());
        assert!(ty.validate(&json!("three")).is_err());
        assert!(!ty.is_structured());
        assert!(JsonSchemaType::<Foo>::new_ref().is_structured());
    }
}
