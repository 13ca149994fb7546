//! Shared utilities for tool macro code generation.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Attribute, Expr, ExprLit, FnArg, GenericArgument, Lit, Meta, Pat, PatType, PathArguments,
    ReturnType, Signature, Type,
};

/// Validates that a function signature is suitable for `#[tool]`.
///
/// Rejects generic, unsafe and extern functions, and methods.
pub(crate) fn validate_tool_signature(sig: &Signature) -> Result<(), syn::Error> {
    if let Some(unsafety) = &sig.unsafety {
        return Err(syn::Error::new_spanned(
            unsafety,
            "#[tool] cannot be applied to unsafe functions",
        ));
    }

    if let Some(abi) = &sig.abi {
        return Err(syn::Error::new_spanned(
            abi,
            "#[tool] cannot be applied to extern functions",
        ));
    }

    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "#[tool] does not support generic parameters",
        ));
    }

    if let Some(FnArg::Receiver(receiver)) = sig.inputs.first() {
        return Err(syn::Error::new_spanned(
            receiver,
            "#[tool] functions cannot have a `self` receiver",
        ));
    }

    Ok(())
}

/// What a parameter is filled with.
#[derive(Debug, Clone)]
pub(crate) enum ParamRole {
    /// `RunContext<D>` or `&RunContext<D>`.
    Context { by_ref: bool, deps: Type },
    /// `Kwargs<T>`: extra named arguments.
    Kwargs { item: Option<Type> },
    /// `#[variadic] Vec<T>`: extra positional arguments.
    Variadic { item: Type },
    /// `Option<T>`: may be omitted.
    Optional { inner: Type },
    /// Any other type.
    Plain,
}

/// Parsed information about a single function parameter.
#[derive(Debug, Clone)]
pub(crate) struct ParamInfo {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: Type,
    /// Description from doc comments.
    pub description: Option<String>,
    /// Default value expression from `#[default(expr)]`.
    pub default_expr: Option<TokenStream>,
    /// How the parameter is filled.
    pub role: ParamRole,
}

/// Extracts parameter doc comments as one trimmed paragraph per line.
pub(crate) fn extract_doc_comments(attrs: &[Attribute]) -> Option<String> {
    let docs: Vec<_> = doc_lines(attrs)
        .map(|line| line.trim().to_string())
        .collect();

    if docs.is_empty() {
        None
    } else {
        Some(docs.join("\n"))
    }
}

/// Extracts function documentation with its indentation intact.
///
/// Only the single space rustdoc puts after `///` is removed, so indented
/// sections (`Args:` bodies, `----` rules) survive for the docstring parser.
pub(crate) fn extract_doc_text(attrs: &[Attribute]) -> Option<String> {
    let docs: Vec<_> = doc_lines(attrs)
        .map(|line| line.strip_prefix(' ').map_or_else(|| line.clone(), str::to_string))
        .collect();

    if docs.is_empty() {
        None
    } else {
        Some(docs.join("\n"))
    }
}

fn doc_lines(attrs: &[Attribute]) -> impl Iterator<Item = String> + '_ {
    attrs.iter().filter_map(|attr| {
        if attr.path().is_ident("doc")
            && let Meta::NameValue(meta) = &attr.meta
            && let Expr::Lit(ExprLit {
                lit: Lit::Str(lit_str),
                ..
            }) = &meta.value
        {
            Some(lit_str.value())
        } else {
            None
        }
    })
}

/// Parses a typed function parameter into a [`ParamInfo`].
pub(crate) fn parse_param(pat_type: &PatType) -> Result<ParamInfo, syn::Error> {
    let Pat::Ident(pat_ident) = &*pat_type.pat else {
        return Err(syn::Error::new_spanned(
            &pat_type.pat,
            "#[tool] parameters must be simple identifiers",
        ));
    };

    let ty = (*pat_type.ty).clone();
    let description = extract_doc_comments(&pat_type.attrs);
    let default_expr = extract_default_expr(&pat_type.attrs)?;
    let variadic = pat_type.attrs.iter().any(|attr| attr.path().is_ident("variadic"));

    let role = if let Some((by_ref, deps)) = context_deps(&ty) {
        ParamRole::Context { by_ref, deps }
    } else if variadic {
        let Some(item) = single_type_arg(&ty, "Vec") else {
            return Err(syn::Error::new_spanned(&ty, "#[variadic] parameters must be `Vec<T>`"));
        };
        ParamRole::Variadic { item: item.clone() }
    } else if let Some(item) = kwargs_item(&ty) {
        ParamRole::Kwargs { item }
    } else if let Some(inner) = single_type_arg(&ty, "Option") {
        ParamRole::Optional {
            inner: inner.clone(),
        }
    } else {
        ParamRole::Plain
    };

    Ok(ParamInfo {
        name: pat_ident.ident.to_string(),
        ty,
        description,
        default_expr,
        role,
    })
}

/// Extracts the default value from `#[default(expr)]`.
fn extract_default_expr(attrs: &[Attribute]) -> Result<Option<TokenStream>, syn::Error> {
    attrs
        .iter()
        .find(|attr| attr.path().is_ident("default"))
        .map(|attr| attr.parse_args::<TokenStream>())
        .transpose()
}

/// Attributes consumed by the macro; stripped from the generated function.
pub(crate) fn is_tool_attr(attr: &Attribute) -> bool {
    ["default", "doc", "variadic"]
        .iter()
        .any(|name| attr.path().is_ident(name))
}

/// Returns `T` if `ty` is `Name<T>` (by last path segment).
fn single_type_arg<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == name
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && args.args.len() == 1
        && let GenericArgument::Type(inner) = &args.args[0]
    {
        Some(inner)
    } else {
        None
    }
}

/// Detects `RunContext<D>` and `&RunContext<D>`, returning whether it is a
/// reference and the dependency type.
fn context_deps(ty: &Type) -> Option<(bool, Type)> {
    let (by_ref, ty) = match ty {
        Type::Reference(reference) if reference.mutability.is_none() => (true, &*reference.elem),
        other => (false, other),
    };
    single_type_arg(ty, "RunContext").map(|deps| (by_ref, deps.clone()))
}

/// Detects `Kwargs` and `Kwargs<T>`. The inner `Option` is `None` for the
/// bare form, whose value type defaults to JSON.
fn kwargs_item(ty: &Type) -> Option<Option<Type>> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == "Kwargs"
    {
        if let Some(item) = single_type_arg(ty, "Kwargs") {
            return Some(Some(item.clone()));
        }
        if segment.arguments.is_empty() {
            return Some(None);
        }
    }
    None
}

fn kwargs_value_type(item: Option<&Type>, pt: &TokenStream) -> TokenStream {
    match item {
        Some(item) => quote! { #item },
        None => quote! { #pt::__private::serde_json::Value },
    }
}

/// How a return value becomes a `ToolOutput`.
fn output_conversion(ty: &Type, pt: &TokenStream) -> TokenStream {
    let direct = match ty {
        Type::Reference(reference) => matches!(&*reference.elem, Type::Path(p) if p.path.is_ident("str")),
        Type::Path(type_path) => type_path.path.segments.last().is_some_and(|segment| {
            segment.ident == "String"
                || segment.ident == "ToolOutput"
                || (segment.ident == "Value" && segment.arguments.is_empty())
                || single_type_arg(ty, "Vec").is_some_and(|item| {
                    matches!(item, Type::Path(p) if p.path.is_ident("u8"))
                })
        }),
        _ => false,
    };

    if direct {
        quote! { ::core::convert::Into::<#pt::ToolOutput>::into(__value) }
    } else {
        quote! { #pt::ToolOutput::structured(&__value)? }
    }
}

/// Converts a `snake_case` string to `PascalCase`.
pub(crate) fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
            }
        })
        .collect()
}

/// Generates the `signature()` body, producing a `FunctionSignature`.
pub(crate) fn generate_signature(
    fn_name: &str,
    doc: Option<&str>,
    params: &[ParamInfo],
    pt: &TokenStream,
) -> TokenStream {
    let param_specs: Vec<_> = params
        .iter()
        .map(|param| {
            let name = &param.name;
            let base = match &param.role {
                ParamRole::Context { .. } => {
                    return quote! { #pt::ParamSpec::context(#name) };
                }
                ParamRole::Kwargs { item } => {
                    let item = kwargs_value_type(item.as_ref(), pt);
                    quote! {
                        #pt::ParamSpec::of::<#item>(#name).with_kind(#pt::ParamKind::VarKeyword)
                    }
                }
                ParamRole::Variadic { item } => quote! {
                    #pt::ParamSpec::of::<#item>(#name).with_kind(#pt::ParamKind::VarPositional)
                },
                ParamRole::Optional { inner } => quote! {
                    #pt::ParamSpec::of::<#inner>(#name).optional()
                },
                ParamRole::Plain => {
                    let ty = &param.ty;
                    quote! { #pt::ParamSpec::of::<#ty>(#name) }
                }
            };

            let desc_code = param
                .description
                .as_ref()
                .map(|d| quote! { .with_description(#d) });
            let default_code = param
                .default_expr
                .as_ref()
                .map(|expr| quote! { .with_default(#pt::__private::serde_json::json!(#expr)) });

            quote! { #base #desc_code #default_code }
        })
        .collect();

    let doc_builder = doc.map(|doc| quote! { .with_doc(#doc) });

    quote! {
        #pt::FunctionSignature::new(#fn_name)
            #doc_builder
            #(
                .param(#param_specs)
            )*
    }
}

/// Generates the body of `call()`.
///
/// Synchronous functions run on the blocking pool with an owned copy of the
/// context.
pub(crate) fn generate_call(
    call_target: &TokenStream,
    params: &[ParamInfo],
    return_type: &ReturnType,
    is_async: bool,
    pt: &TokenStream,
) -> TokenStream {
    let param_extractions: Vec<_> = params
        .iter()
        .filter_map(|param| {
            let ident = format_ident!("{}", &param.name);
            let name = &param.name;
            let ty = &param.ty;

            let extraction = match &param.role {
                ParamRole::Context { .. } => return None,
                ParamRole::Kwargs { item } => {
                    let item = kwargs_value_type(item.as_ref(), pt);
                    quote! {
                        let #ident: #ty = __args.kwargs::<#item>()?;
                    }
                }
                ParamRole::Optional { inner } => quote! {
                    let #ident: #ty = <#inner as #pt::FunctionParam>::extract_optional(&__args, #name)?;
                },
                ParamRole::Variadic { .. } | ParamRole::Plain => match &param.default_expr {
                    Some(default_expr) => quote! {
                        let #ident: #ty = <#ty as #pt::FunctionParam>::extract_optional(&__args, #name)?
                            .unwrap_or(#default_expr);
                    },
                    None => quote! {
                        let #ident: #ty = <#ty as #pt::FunctionParam>::extract(&__args, #name)?;
                    },
                },
            };
            Some(extraction)
        })
        .collect();

    let context = params.iter().find_map(|param| match &param.role {
        ParamRole::Context { by_ref, .. } => Some(*by_ref),
        _ => None,
    });

    let call_args: Vec<_> = params
        .iter()
        .map(|param| match (&param.role, is_async) {
            (ParamRole::Context { by_ref: true, .. }, true) => quote! { __ctx },
            (ParamRole::Context { by_ref: false, .. }, true) => quote! { ::core::clone::Clone::clone(__ctx) },
            (ParamRole::Context { by_ref: true, .. }, false) => quote! { &__ctx_owned },
            (ParamRole::Context { by_ref: false, .. }, false) => quote! { __ctx_owned },
            _ => {
                let ident = format_ident!("{}", &param.name);
                quote! { #ident }
            }
        })
        .collect();

    let invocation = if is_async {
        quote! { #call_target(#(#call_args),*).await }
    } else {
        let ctx_owned = context.map(|_| quote! { let __ctx_owned = ::core::clone::Clone::clone(__ctx); });
        quote! {
            {
                #ctx_owned
                #pt::run_blocking(move || #call_target(#(#call_args),*)).await?
            }
        }
    };

    let (value_binding, value_ty) = match return_type {
        ReturnType::Default => (quote! { let __value = __result; }, None),
        ReturnType::Type(_, ty) => match result_ok_type(ty) {
            Some(ok) => (
                quote! {
                    let __value = __result.map_err(::core::convert::Into::<#pt::ToolError>::into)?;
                },
                Some(ok),
            ),
            None => (quote! { let __value = __result; }, Some(&**ty)),
        },
    };

    let conversion = match value_ty {
        Some(ty) => output_conversion(ty, pt),
        None => quote! { #pt::ToolOutput::structured(&__value)? },
    };

    quote! {
        #(#param_extractions)*
        let __result = #invocation;
        #value_binding
        ::core::result::Result::Ok::<#pt::ToolOutput, #pt::ToolError>(#conversion)
    }
}

/// Returns `T` if `ty` is `Result<T, E>`.
fn result_ok_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == "Result"
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(ok)) = args.args.first()
    {
        Some(ok)
    } else {
        None
    }
}

/// Returns the dependency type of the context parameter, if any.
pub(crate) fn context_deps_type(params: &[ParamInfo]) -> Option<&Type> {
    params.iter().find_map(|param| match &param.role {
        ParamRole::Context { deps, .. } => Some(deps),
        _ => None,
    })
}
