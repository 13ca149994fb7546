//! Function signatures and context-parameter analysis.
//!
//! A [`FunctionSignature`] is a plain description of a tool function's
//! parameters, produced by the `#[tool]` macro or written by hand. [`analyze`]
//! resolves it once into [`ParamDescriptor`]s tagged [`ParamTag::Plain`] or
//! [`ParamTag::Context`]; nothing downstream inspects annotations again.

use crate::error::ConfigError;
use crate::schema::{JsonSchemaType, TypeRef};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

const CONTEXT_MUST_BE_FIRST: &str =
    "First parameter of tools that take context must be annotated with RunContext<...>";
const CONTEXT_NOT_TAKEN: &str =
    "RunContext annotations can only be used with tools that take context";
const CONTEXT_NOT_FIRST: &str = "RunContext annotations can only be used as the first argument";

/// How a parameter accepts its argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParamKind {
    /// Only bindable by position.
    PositionalOnly,
    /// Bindable by position or by name.
    #[default]
    PositionalOrKeyword,
    /// Only bindable by name.
    KeywordOnly,
    /// Collects any number of extra positional values into a list.
    VarPositional,
    /// Collects any extra named values; enables `additionalProperties`.
    VarKeyword,
}

/// The declared type of a parameter.
#[derive(Clone)]
pub enum Annotation {
    /// Annotated with the `RunContext<...>` marker.
    Context,
    /// An ordinary type with a schema.
    Type(TypeRef),
}

impl Annotation {
    /// Returns `true` for the context marker.
    #[must_use]
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context)
    }
}

impl core::fmt::Debug for Annotation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Context => f.write_str("Context"),
            Self::Type(ty) => f.debug_tuple("Type").field(&ty.type_name()).finish(),
        }
    }
}

/// One parameter as declared on the function.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Binding kind.
    pub kind: ParamKind,
    /// Declared type.
    pub annotation: Annotation,
    /// Default value used when the argument is absent.
    pub default: Option<Value>,
    /// Whether the argument may be omitted without a default (`Option<T>`).
    pub optional: bool,
    /// Explicit field-level description. Wins over documentation.
    pub description: Option<String>,
}

impl ParamSpec {
    /// Creates a required parameter of the given type.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::default(),
            annotation: Annotation::Type(ty),
            default: None,
            optional: false,
            description: None,
        }
    }

    /// Creates a required parameter whose schema comes from `T`.
    pub fn of<T>(name: impl Into<String>) -> Self
    where
        T: JsonSchema + DeserializeOwned + 'static,
    {
        Self::new(name, JsonSchemaType::<T>::new_ref())
    }

    /// Creates a parameter annotated with the context marker.
    pub fn context(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::default(),
            annotation: Annotation::Context,
            default: None,
            optional: false,
            description: None,
        }
    }

    /// Sets the binding kind.
    #[must_use]
    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets a default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Marks the parameter as omittable.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Sets an explicit description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A tool function's name, documentation and parameters.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    /// Function name; becomes the default tool name.
    pub name: String,
    /// Free-text documentation (docstring).
    pub doc: Option<String>,
    /// Parameters in declaration order.
    pub params: Vec<ParamSpec>,
}

impl FunctionSignature {
    /// Creates a signature with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
        }
    }

    /// Sets the documentation text.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }
}

/// Resolved role of a parameter.
#[derive(Clone)]
pub enum ParamTag {
    /// Filled from the model's arguments.
    Plain(TypeRef),
    /// Filled with the run context.
    Context,
}

impl core::fmt::Debug for ParamTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Plain(ty) => f.debug_tuple("Plain").field(&ty.type_name()).finish(),
            Self::Context => f.write_str("Context"),
        }
    }
}

/// A parameter after analysis.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    /// Parameter name.
    pub name: String,
    /// Zero-based position in the declaration.
    pub position: usize,
    /// Binding kind.
    pub kind: ParamKind,
    /// Resolved role.
    pub tag: ParamTag,
    /// Default value.
    pub default: Option<Value>,
    /// Whether the argument may be omitted.
    pub optional: bool,
    /// Explicit description.
    pub description: Option<String>,
}

impl ParamDescriptor {
    /// Returns `true` if the model must supply this argument.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.optional && self.kind != ParamKind::VarPositional
    }
}

/// Output of [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalyzedSignature {
    /// Function name.
    pub function: String,
    /// Whether the first parameter receives the run context.
    pub takes_context: bool,
    /// All parameters, context included.
    pub params: Vec<ParamDescriptor>,
}

impl AnalyzedSignature {
    /// Iterates the model-visible parameters with their types.
    pub fn plain_params(&self) -> impl Iterator<Item = (&ParamDescriptor, &TypeRef)> {
        self.params.iter().filter_map(|param| match &param.tag {
            ParamTag::Plain(ty) => Some((param, ty)),
            ParamTag::Context => None,
        })
    }

    /// Returns `true` if the function accepts arbitrary extra keyword arguments.
    #[must_use]
    pub fn accepts_var_keyword(&self) -> bool {
        self.params
            .iter()
            .any(|param| param.kind == ParamKind::VarKeyword)
    }
}

/// Classifies each parameter and validates the context convention.
///
/// `takes_context` is the caller's declaration; `None` infers it from whether
/// the first parameter carries the context marker. Every violated rule is
/// collected into a single [`ConfigError::Signature`].
pub fn analyze(
    signature: &FunctionSignature,
    takes_context: Option<bool>,
) -> Result<AnalyzedSignature, ConfigError> {
    let takes_context = takes_context.unwrap_or_else(|| {
        signature
            .params
            .first()
            .is_some_and(|param| param.annotation.is_context())
    });

    let mut errors = Vec::new();
    let mut params = Vec::with_capacity(signature.params.len());

    if takes_context && signature.params.is_empty() {
        errors.push(CONTEXT_MUST_BE_FIRST.to_string());
    }

    for (position, param) in signature.params.iter().enumerate() {
        let is_context = param.annotation.is_context();

        if position == 0 && takes_context {
            if !is_context {
                errors.push(CONTEXT_MUST_BE_FIRST.to_string());
                continue;
            }
        } else if is_context {
            errors.push(if takes_context {
                CONTEXT_NOT_FIRST.to_string()
            } else {
                CONTEXT_NOT_TAKEN.to_string()
            });
            continue;
        }

        let tag = match &param.annotation {
            Annotation::Context => ParamTag::Context,
            Annotation::Type(ty) => ParamTag::Plain(ty.clone()),
        };
        params.push(ParamDescriptor {
            name: param.name.clone(),
            position,
            kind: param.kind,
            tag,
            default: param.default.clone(),
            optional: param.optional,
            description: param.description.clone(),
        });
    }

    if !errors.is_empty() {
        return Err(ConfigError::Signature {
            function: signature.name.clone(),
            errors,
        });
    }

    Ok(AnalyzedSignature {
        function: signature.name.clone(),
        takes_context,
        params,
    })
}
