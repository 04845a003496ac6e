//! Derive macros for Composable State
//!
//! This crate provides procedural macros that remove the boilerplate of
//! making a state struct patchable.
//!
//! # Available Macros
//!
//! - `#[derive(Record)]` - Generates a companion `…Patch` type and a
//!   shallow-merge `StateShape` implementation
//!
//! # Example
//!
//! ```ignore
//! use composable_state_macros::Record;
//!
//! #[derive(Record, Clone, Debug)]
//! struct TodosState {
//!     loading: bool,
//!     todos: Arc<[Todo]>,
//! }
//!
//! // Generated:
//! let patch = TodosStatePatch::default().with_loading(true);
//! let next = state.merge(patch);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derive macro for record states
///
/// For a struct `Name` with named fields, generates:
/// - `NamePatch`: same fields, each wrapped in `Option`, with `Default`,
///   `Clone` and `Debug`
/// - `NamePatch::with_<field>(value)` builders and `NamePatch::is_empty()`
/// - `impl StateShape for Name` with `Partial = NamePatch`: fields set in the
///   patch override, all others are cloned from the current state
///
/// Every field type must implement `Clone` and `Debug`.
///
/// # Errors
///
/// Produces a compile error (not a runtime panic) if applied to an enum,
/// a union, or a struct without named fields.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Clone, Debug)]
/// pub struct Settings {
///     pub theme: String,
///     pub font_size: u8,
/// }
///
/// let next = settings.merge(SettingsPatch::default().with_font_size(14));
/// assert_eq!(next.theme, settings.theme);
/// ```
#[proc_macro_derive(Record)]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let vis = &input.vis;
    let patch_name = format_ident!("{}Patch", name);

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Record)] can only be used on structs")
            .to_compile_error()
            .into();
    };

    let Fields::Named(named) = &data_struct.fields else {
        return syn::Error::new_spanned(
            input,
            "#[derive(Record)] requires a struct with named fields",
        )
        .to_compile_error()
        .into();
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let generics = &input.generics;

    let mut patch_fields = Vec::new();
    let mut builders = Vec::new();
    let mut merges = Vec::new();
    let mut presence = Vec::new();

    for field in &named.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let field_vis = &field.vis;
        let builder = format_ident!("with_{}", ident.unraw());
        let doc = format!("Override `{}` when merged", ident.unraw());

        patch_fields.push(quote! {
            #[doc = #doc]
            #field_vis #ident: ::core::option::Option<#ty>,
        });

        builders.push(quote! {
            #[doc = #doc]
            #[must_use]
            pub fn #builder(mut self, value: impl ::core::convert::Into<#ty>) -> Self {
                self.#ident = ::core::option::Option::Some(value.into());
                self
            }
        });

        merges.push(quote! {
            #ident: match partial.#ident {
                ::core::option::Option::Some(value) => value,
                ::core::option::Option::None => ::core::clone::Clone::clone(&self.#ident),
            },
        });

        presence.push(quote! { self.#ident.is_none() });
    }

    let patch_doc = format!("Partial update for [`{name}`]; `None` fields are left unchanged");

    let expanded = quote! {
        #[doc = #patch_doc]
        #[derive(Clone, Debug, Default)]
        #vis struct #patch_name #generics #where_clause {
            #(#patch_fields)*
        }

        impl #impl_generics #patch_name #ty_generics #where_clause {
            #(#builders)*

            /// Returns true if this patch overrides no field
            #[must_use]
            pub const fn is_empty(&self) -> bool {
                true #(&& #presence)*
            }
        }

        impl #impl_generics ::composable_state_core::shape::StateShape for #name #ty_generics #where_clause {
            type Partial = #patch_name #ty_generics;

            const KIND: ::composable_state_core::shape::ShapeKind =
                ::composable_state_core::shape::ShapeKind::Record;

            fn merge(&self, partial: Self::Partial) -> Self {
                Self {
                    #(#merges)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}
