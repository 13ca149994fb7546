use sextant_tools::{tool, ToolError};

#[tool]
/// Call across the C boundary.
extern "C" fn add_one(x: i64) -> Result<i64, ToolError> {
    Ok(x + 1)
}

fn main() {}
