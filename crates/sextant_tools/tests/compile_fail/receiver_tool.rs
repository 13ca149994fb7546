use sextant_tools::{tool, ToolError};

struct Counter;

impl Counter {
    #[tool]
    /// Count something.
    async fn count(&self, n: u32) -> Result<u32, ToolError> {
        Ok(n)
    }
}

fn main() {}
