//! `#[derive(Error)]` for interpreter error enums and structs.
//!
//! ```ignore
//! use exa_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum RunError {
//!     #[error("line {line}: undefined label {label}")]
//!     UnknownLabel { line: usize, label: String },
//!
//!     #[error("bad seed: {0}")]
//!     Seed(String),
//!
//!     #[error("halted")]
//!     Halted,
//! }
//! ```
//!
//! Only the fields a message mentions are bound, so a variant may carry
//! context the message leaves out without tripping the unused-argument lint
//! inside `write!`.

use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Enum(data) => {
            let arms = data
                .variants
                .iter()
                .map(|variant| {
                    let message = message_of(&variant.attrs, &variant.ident)?;
                    let ident = &variant.ident;
                    let (pattern, write) = render(quote!(Self::#ident), &variant.fields, &message);
                    Ok(quote! { #pattern => #write, })
                })
                .collect::<syn::Result<Vec<_>>>()?;
            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Struct(data) => {
            let message = message_of(&input.attrs, &input.ident)?;
            let (pattern, write) = render(quote!(Self), &data.fields, &message);
            quote! {
                let #pattern = self;
                #write
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Error cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #body
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Builds the destructuring pattern and the `write!` call for one set of fields.
fn render(path: TokenStream2, fields: &Fields, message: &str) -> (TokenStream2, TokenStream2) {
    match fields {
        Fields::Unit => (path, quote! { write!(f, #message) }),
        Fields::Named(named) => {
            let used: Vec<&Ident> = named
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .filter(|ident| mentions(message, &ident.to_string()))
                .collect();
            (
                quote! { #path { #(#used,)* .. } },
                quote! { write!(f, #message, #(#used = #used),*) },
            )
        }
        Fields::Unnamed(unnamed) => {
            let mut message = message.to_string();
            let mut binders = Vec::with_capacity(unnamed.unnamed.len());
            let mut used = Vec::new();
            for index in 0..unnamed.unnamed.len() {
                let positional = index.to_string();
                if mentions(&message, &positional) {
                    let ident = format_ident!("f{}", index);
                    message = rename(&message, &positional, &ident.to_string());
                    binders.push(ident.to_token_stream());
                    used.push(ident);
                } else {
                    binders.push(quote!(_));
                }
            }
            (
                quote! { #path(#(#binders),*) },
                quote! { write!(f, #message, #(#used = #used),*) },
            )
        }
    }
}

/// True when `message` contains `{name}` or `{name:...}`.
fn mentions(message: &str, name: &str) -> bool {
    message.contains(&format!("{{{name}}}")) || message.contains(&format!("{{{name}:"))
}

fn rename(message: &str, from: &str, to: &str) -> String {
    message
        .replace(&format!("{{{from}}}"), &format!("{{{to}}}"))
        .replace(&format!("{{{from}:"), &format!("{{{to}:"))
}

/// Reads the string literal out of `#[error("...")]`.
fn message_of<T: ToTokens>(attrs: &[Attribute], target: &T) -> syn::Result<String> {
    let attr = attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                target,
                "missing #[error(\"...\")] attribute; every error needs a display message",
            )
        })?;

    attr.parse_args::<LitStr>()
        .map(|lit| lit.value())
        .map_err(|_| {
            syn::Error::new_spanned(
                &attr.meta,
                "expected a string literal, e.g. #[error(\"undefined label: {0}\")]",
            )
        })
}
