//! # Shopkeeper Macros
//!
//! Derive macros for the shopkeeper reducer kernel.
//!
//! Actions flowing through a reducer split into **commands** (validated
//! requests to change state) and **events** (facts the reducer has applied).
//! `#[derive(Action)]` reads `#[command]` / `#[event]` variant attributes and
//! generates const classification helpers used for dispatch guards and
//! tracing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, parse_macro_input};

/// Derives `is_command()`, `is_event()`, and `name()` for an action enum.
///
/// Mark each variant with `#[command]` or `#[event]`. Variants carrying
/// neither attribute answer `false` to both predicates; a variant cannot
/// carry both.
///
/// # Example
///
/// ```
/// use shopkeeper_macros::Action;
///
/// #[derive(Action)]
/// enum CartAction {
///     #[command]
///     AddItem { quantity: u32 },
///     #[event]
///     ItemAdded { quantity: u32 },
/// }
///
/// let action = CartAction::AddItem { quantity: 1 };
/// assert!(action.is_command());
/// assert!(!action.is_event());
/// assert_eq!(action.name(), "AddItem");
/// ```
#[proc_macro_derive(Action, attributes(command, event))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(name, "Action can only be derived for enums")
            .to_compile_error()
            .into();
    };

    let mut command_patterns = Vec::new();
    let mut event_patterns = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data.variants {
        let ident = &variant.ident;
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        if is_command && is_event {
            return syn::Error::new_spanned(
                ident,
                "variant cannot be marked both #[command] and #[event]",
            )
            .to_compile_error()
            .into();
        }

        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { Self::#ident { .. } },
            Fields::Unnamed(_) => quote! { Self::#ident(..) },
            Fields::Unit => quote! { Self::#ident },
        };

        if is_command {
            command_patterns.push(pattern.clone());
        }
        if is_event {
            event_patterns.push(pattern.clone());
        }

        let label = ident.to_string();
        name_arms.push(quote! { #pattern => #label });
    }

    let expanded = quote! {
        impl #name {
            /// `true` when this action is a command (a validated request)
            #[must_use]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#command_patterns => true,)*
                    _ => false,
                }
            }

            /// `true` when this action is an event (a fact applied to state)
            #[must_use]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#event_patterns => true,)*
                    _ => false,
                }
            }

            /// The variant name, for logs and metrics labels
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#name_arms,)*
                }
            }
        }
    };

    expanded.into()
}

fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
