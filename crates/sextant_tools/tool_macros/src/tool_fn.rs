//! Code generation for `#[tool]` on standalone functions.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use sextant_macro_utils::{SextantCrate, resolve_crate_path};
use syn::{FnArg, ItemFn};

use crate::common::{
    context_deps_type, extract_doc_text, generate_call, generate_signature, is_tool_attr,
    parse_param, to_pascal_case, validate_tool_signature,
};

/// Generates a `ToolFunction` impl struct for a standalone `#[tool]` function.
///
/// The macro consumes the original function and generates:
/// - A private `__tool_impl_<name>` function with the original body
/// - A `<Name>Tool` struct implementing `ToolFunction`
/// - A constructor `fn <name>() -> <Name>Tool`
///
/// Tools without a context parameter implement `ToolFunction<D>` for every
/// `D`; tools with one implement it for the context's dependency type.
pub(crate) fn generate_tool_fn(input: &ItemFn) -> Result<TokenStream, syn::Error> {
    validate_tool_signature(&input.sig)?;

    let pt = resolve_crate_path(SextantCrate::Tools);

    let fn_name = &input.sig.ident;
    let fn_name_str = fn_name.to_string();
    let struct_name = format_ident!("{}Tool", to_pascal_case(&fn_name_str));
    let impl_fn_name = format_ident!("__tool_impl_{}", fn_name);
    let is_async = input.sig.asyncness.is_some();

    let doc = extract_doc_text(&input.attrs);

    let params = input
        .sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat_type) => Some(parse_param(pat_type)),
            FnArg::Receiver(_) => None,
        })
        .collect::<Result<Vec<_>, _>>()?;

    let signature_code = generate_signature(&fn_name_str, doc.as_deref(), &params, &pt);
    let call_target = quote! { #impl_fn_name };
    let call_code = generate_call(&call_target, &params, &input.sig.output, is_async, &pt);

    let (impl_generics, deps) = match context_deps_type(&params) {
        Some(deps) => (quote! {}, quote! { #deps }),
        None => (quote! { <__D: Send + Sync + 'static> }, quote! { __D }),
    };

    let vis = &input.vis;
    let block = &input.block;
    let asyncness = &input.sig.asyncness;
    let output = &input.sig.output;

    // Build the private impl function with macro attributes removed
    let cleaned_params: Vec<_> = input
        .sig
        .inputs
        .iter()
        .map(|arg| {
            if let FnArg::Typed(pat_type) = arg {
                let mut cleaned = pat_type.clone();
                cleaned.attrs.retain(|attr| !is_tool_attr(attr));
                FnArg::Typed(cleaned)
            } else {
                arg.clone()
            }
        })
        .collect();

    let constructor_doc = format!("Creates an instance of the `{fn_name_str}` tool.");

    Ok(quote! {
        #asyncness fn #impl_fn_name(#(#cleaned_params),*) #output #block

        #vis struct #struct_name;

        impl #impl_generics #pt::ToolFunction<#deps> for #struct_name {
            fn signature(&self) -> #pt::FunctionSignature {
                #signature_code
            }

            fn call<'a>(
                &'a self,
                __ctx: &'a #pt::RunContext<#deps>,
                __args: #pt::CallArgs,
            ) -> #pt::ToolFuture<'a> {
                Box::pin(async move {
                    #call_code
                })
            }
        }

        #[doc = #constructor_doc]
        #[must_use]
        #vis fn #fn_name() -> #struct_name {
            #struct_name
        }
    })
}
