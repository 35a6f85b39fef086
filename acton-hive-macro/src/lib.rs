/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![forbid(unsafe_code)]

//! Acton Hive Macro Library
//!
//! Procedural macros for the Acton Hive agent runtime. They remove the
//! boilerplate needed to declare routable events and persistable agent state.
//!
//! # Event Macro
//!
//! ```ignore
//! #[agent_event]
//! pub struct Increment {
//!     pub amount: u32,
//! }
//!
//! // Pin the wire identifier explicitly
//! #[agent_event(name = "counter.reset")]
//! pub struct Reset;
//! ```
//!
//! # State Macro
//!
//! ```ignore
//! #[agent_state]
//! pub struct CounterState {
//!     pub count: i64,
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, DeriveInput, LitStr};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta
                    .path
                    .segments
                    .last()
                    .is_some_and(|segment| segment.ident == trait_name)
                {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Builds the serde derive list and the `#[serde(crate = ...)]` attribute for
/// whichever serde traits the input does not already derive.
fn serde_derives(input: &DeriveInput) -> (Vec<proc_macro2::TokenStream>, proc_macro2::TokenStream) {
    let mut traits = Vec::new();
    if !has_derive(input, "Serialize") {
        traits.push(quote!(::acton_hive::serde::Serialize));
    }
    if !has_derive(input, "Deserialize") {
        traits.push(quote!(::acton_hive::serde::Deserialize));
    }
    let crate_attr = if traits.is_empty() {
        quote!()
    } else {
        quote!(#[serde(crate = "::acton_hive::serde")])
    };
    (traits, crate_attr)
}

/// Declares a type as an event that can travel inside an `EventEnvelope`.
///
/// Expands to:
/// - `#[derive(Clone, Debug, Serialize, Deserialize)]` for traits not already derived
/// - an `AgentEvent` implementation whose `TYPE_NAME` is the type's name, or the
///   value given with `name = "..."`
///
/// The type name is the identifier carried on the wire, so renaming a type
/// without pinning `name` breaks replay of previously persisted events.
#[proc_macro_attribute]
pub fn agent_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut type_name: Option<LitStr> = None;
    let attr_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            type_name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported agent_event option, expected `name = \"...\"`"))
        }
    });
    parse_macro_input!(attr with attr_parser);

    let input = parse_macro_input!(item as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut traits = Vec::new();
    if !has_derive(&input, "Clone") {
        traits.push(quote!(Clone));
    }
    if !has_derive(&input, "Debug") {
        traits.push(quote!(Debug));
    }
    let (serde_traits, serde_crate) = serde_derives(&input);
    traits.extend(serde_traits);

    let derives = if traits.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#traits),*)])
    };

    let wire_name = type_name.map_or_else(|| name.to_string(), |lit| lit.value());

    let expanded = quote! {
        #derives
        #serde_crate
        #input

        impl #impl_generics ::acton_hive::prelude::AgentEvent for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #wire_name;
        }
    };

    TokenStream::from(expanded)
}

/// Declares a type as the persistable state of an agent.
///
/// Expands to `#[derive(Default, Debug, Clone, Serialize, Deserialize)]` (only the
/// traits not already present) plus a compile-time assertion that the type is
/// `Send + Sync + 'static`. The `AgentState` implementation stays manual so the
/// agent can provide its own `transition_state`.
///
/// Use `#[agent_state(no_default)]` when `Default` is implemented by hand.
#[proc_macro_attribute]
pub fn agent_state(attr: TokenStream, item: TokenStream) -> TokenStream {
    let no_default = attr
        .to_string()
        .split(',')
        .any(|part| part.trim() == "no_default");

    let input = parse_macro_input!(item as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut traits = Vec::new();
    if !no_default && !has_derive(&input, "Default") {
        traits.push(quote!(Default));
    }
    if !has_derive(&input, "Debug") {
        traits.push(quote!(Debug));
    }
    if !has_derive(&input, "Clone") {
        traits.push(quote!(Clone));
    }
    let (serde_traits, serde_crate) = serde_derives(&input);
    traits.extend(serde_traits);

    let derives = if traits.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#traits),*)])
    };

    let assert_ident = quote::format_ident!("_AssertAgentState_{}", name);

    let expanded = quote! {
        #derives
        #serde_crate
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
