use sextant_tools::{tool, ToolError};

#[tool]
/// Read a raw pointer.
unsafe fn peek(offset: u32) -> Result<u32, ToolError> {
    Ok(offset)
}

fn main() {}
