//! Procedural macros for agent tool definitions.
//!
//! `#[tool]` turns a free function into a registrable tool: the function is
//! emitted unchanged, and a companion `<Name>Tool` struct plus a link-time
//! declaration carry the derived signature, schema inputs, and an invocation
//! binding. `#[derive(ToolParam)]` describes closed enums as parameter types.

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

mod derive;
mod tool;
mod types;

/// Declares a function as an agent tool.
///
/// Accepted arguments, all optional:
///
/// * `description = "..."`: defaults to the first line of the doc comment.
/// * `name = "..."`: defaults to the function name.
/// * `category = "..."`, `version = "..."`
/// * `enabled = bool`, `auto_schema = bool`, `auto_register = bool`
/// * `parameters = path::to::schema_fn`: an explicit `fn() -> SchemaNode`.
///
/// Parameters may carry `#[param(default = expr, description = "...")]`.
/// They are decoded as owned values; `&T` and `Option<&T>` parameters borrow
/// from the decoded owned form. When the function returns a `Result` whose
/// error is `Display`, an `Err` fails the invocation with the error's text.
#[proc_macro_attribute]
pub fn tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = tool::ToolArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(&meta));
    parse_macro_input!(attr with parser);
    let function = parse_macro_input!(item as ItemFn);

    tool::expand(&args, function)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Implements `ToolParam` for an enum.
///
/// Unit-only enums become a closed set of string literals, honouring serde
/// `rename` and `rename_all`. `#[serde(untagged)]` enums whose variants are
/// newtypes or units become a union of the wrapped types.
#[proc_macro_derive(ToolParam, attributes(serde))]
pub fn derive_tool_param(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
