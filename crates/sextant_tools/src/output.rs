//! Tool return values and their conversion to model-facing text.

use crate::error::SerializationError;
use core::any::Any;
use core::fmt;
use serde::Serialize;
use serde_json::Value;

/// A value returned by a tool, before it is sent back to the model.
pub enum ToolOutput {
    /// Text, sent as-is.
    Text(String),
    /// Bytes, sent as UTF-8 text.
    Binary(Vec<u8>),
    /// A structured value, sent as compact JSON.
    Structured(Value),
    /// A value whose type is only known at runtime.
    Dynamic {
        /// Name of the concrete type, used in error messages.
        type_name: &'static str,
        /// The value itself.
        value: Box<dyn Any + Send>,
    },
}

impl fmt::Debug for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Binary(bytes) => f.debug_tuple("Binary").field(bytes).finish(),
            Self::Structured(value) => f.debug_tuple("Structured").field(value).finish(),
            Self::Dynamic { type_name, .. } => f
                .debug_struct("Dynamic")
                .field("type_name", type_name)
                .finish_non_exhaustive(),
        }
    }
}

impl ToolOutput {
    /// Converts any serializable value into a structured output.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self, SerializationError> {
        Ok(Self::Structured(serde_json::to_value(value)?))
    }

    /// Wraps a value whose serialization is decided at runtime.
    ///
    /// Strings, byte vectors and JSON values are recognized; anything else
    /// fails to serialize.
    pub fn dynamic<T: Any + Send>(value: T) -> Self {
        Self::Dynamic {
            type_name: core::any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Produces the text sent back to the model.
    pub fn serialize(self) -> Result<String, SerializationError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Binary(bytes) => String::from_utf8(bytes).map_err(|err| err.utf8_error().into()),
            Self::Structured(value) => Ok(serde_json::to_string(&value)?),
            Self::Dynamic { type_name, value } => {
                let value = match value.downcast::<String>() {
                    Ok(text) => return Ok(*text),
                    Err(value) => value,
                };
                let value = match value.downcast::<&'static str>() {
                    Ok(text) => return Ok((*text).to_string()),
                    Err(value) => value,
                };
                let value = match value.downcast::<Vec<u8>>() {
                    Ok(bytes) => return Self::Binary(*bytes).serialize(),
                    Err(value) => value,
                };
                match value.downcast::<Value>() {
                    Ok(json) => Self::Structured(*json).serialize(),
                    Err(_) => Err(SerializationError::UnknownType(type_name)),
                }
            }
        }
    }
}

impl From<String> for ToolOutput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ToolOutput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<u8>> for ToolOutput {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Foo {
        x: i64,
        y: String,
    }

    #[test]
    fn text_passes_through() {
        assert_eq!(ToolOutput::from("hello").serialize().unwrap(), "hello");
    }

    #[test]
    fn bytes_decode_as_utf8() {
        let output = ToolOutput::from(b"hello".to_vec());
        assert_eq!(output.serialize().unwrap(), "hello");

        let err = ToolOutput::from(b"\x00\x01\xfe\x02".to_vec()).serialize().unwrap_err();
        assert_eq!(err.to_string(), "invalid utf-8 sequence of 1 bytes from index 2");
    }

    #[test]
    fn structured_values_are_compact_json() {
        let output = ToolOutput::structured(&Foo { x: 0, y: "a".into() }).unwrap();
        assert_eq!(output.serialize().unwrap(), r#"{"x":0,"y":"a"}"#);
        assert_eq!(ToolOutput::from(json!([1, 2])).serialize().unwrap(), "[1,2]");
    }

    #[test]
    fn dynamic_values() {
        assert_eq!(ToolOutput::dynamic("text").serialize().unwrap(), "text");
        assert_eq!(ToolOutput::dynamic(json!({"a": 1})).serialize().unwrap(), r#"{"a":1}"#);

        struct Opaque;
        let err = ToolOutput::dynamic(Opaque).serialize().unwrap_err();
        assert!(err.to_string().starts_with("Unable to serialize unknown type: "));
        assert!(err.to_string().ends_with("Opaque"));
    }
}
