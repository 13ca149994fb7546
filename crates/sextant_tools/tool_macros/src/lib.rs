//! Procedural macros for the Sextant tool framework.
//!
//! Provides `#[tool]`, which turns a function into a `ToolFunction`.

mod common;
mod tool_fn;

use proc_macro::TokenStream;

/// Defines a tool from a function.
///
/// Generates a `<Name>Tool` struct implementing `ToolFunction` and a
/// constructor named after the function. The function's doc comment becomes
/// the tool's documentation; Google, Sphinx and NumPy sections describing
/// parameters are recognized.
///
/// Async functions are awaited in place; synchronous functions run on tokio's
/// blocking pool.
///
/// # Parameters
///
/// - `ctx: &RunContext<D>` (or by value) as the first parameter receives the run context
/// - `Option<T>` may be omitted by the model
/// - `Kwargs<T>` collects extra named arguments
///
/// # Parameter Attributes
///
/// - `/// doc comment`: the parameter's description, preferred over the function docs
/// - `#[default(value)]`: makes the parameter optional with a default value
/// - `#[variadic]` on a `Vec<T>`: collects extra positional values
///
/// # Example
///
/// ```ignore
/// use sextant_tools::{tool, RunContext, ToolError};
///
/// #[tool]
/// /// Search for documents.
/// async fn search(
///     ctx: &RunContext<Vec<String>>,
///     /// The search query.
///     query: String,
///     /// Max results.
///     #[default(10)]
///     limit: usize,
/// ) -> Result<Vec<String>, ToolError> {
///     Ok(ctx
///         .deps()
///         .iter()
///         .filter(|doc| doc.contains(&query))
///         .take(limit)
///         .cloned()
///         .collect())
/// }
/// ```
#[proc_macro_attribute]
pub fn tool(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    tool_fn::generate_tool_fn(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
