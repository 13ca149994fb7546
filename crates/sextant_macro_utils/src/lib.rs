//! Path resolution for code emitted by Sextant's procedural macros.
//!
//! A consumer can reach `sextant_tools` in three ways: as a direct dependency
//! (possibly renamed), through the `sextant` umbrella crate, or not at all.
//! [`resolve_crate_path`] returns the path that works for the calling crate.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;

/// Package name of the umbrella crate.
const UMBRELLA: &str = "sextant";

/// A Sextant crate that macro-generated code may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SextantCrate {
    /// `sextant_tools`
    Tools,
}

impl SextantCrate {
    fn package(self) -> &'static str {
        match self {
            Self::Tools => "sextant_tools",
        }
    }
}

fn ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

/// Returns the path generated code should use to name `krate`.
///
/// `sextant_tools` declares `extern crate self as sextant_tools`, so its own
/// unit and integration tests resolve through the plain package name. When
/// neither the crate nor the umbrella is a dependency the plain name is still
/// emitted and the compiler reports the missing dependency.
pub fn resolve_crate_path(krate: SextantCrate) -> TokenStream {
    let package = krate.package();

    if let Ok(found) = crate_name(package) {
        let name = match found {
            FoundCrate::Itself => ident(package),
            FoundCrate::Name(renamed) => ident(&renamed),
        };
        return quote!(#name);
    }

    if let Ok(FoundCrate::Name(umbrella)) = crate_name(UMBRELLA) {
        let umbrella = ident(&umbrella);
        let member = ident(package);
        return quote!(#umbrella::#member);
    }

    let name = ident(package);
    quote!(#name)
}
