use sextant_tools::{tool, ToolError};

#[tool]
/// Echo the value back.
async fn echo<T: ToString>(value: T) -> Result<String, ToolError> {
    Ok(value.to_string())
}

fn main() {}
