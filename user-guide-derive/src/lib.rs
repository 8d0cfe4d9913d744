//! Derive support for the `user-guide` crate.

mod attributes;
mod controller;

use crate::attributes::ControllerAttributes;
use crate::controller::generate_controller;
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Error, Item};

/// Turns an `impl` block into a registered controller.
///
/// Controller arguments: `path = "/prefix"`, `server_names = [...]`, `tags = [...]`.
/// Handlers are associated functions marked with `#[get]`, `#[post]`, `#[put]`, `#[delete]` or
/// `#[patch]`, taking a path and optional `summary = "..."`, `params = [...]` and `body = Type`.
#[proc_macro_attribute]
pub fn controller(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as ControllerAttributes);
    let item = parse_macro_input!(input as Item);
    let controller = generate_controller(item, &args).unwrap_or_else(Error::into_compile_error);

    (quote! {
        #controller
    })
    .into()
}
