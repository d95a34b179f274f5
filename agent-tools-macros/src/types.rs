//! Mapping of parameter types to `TypeDescriptor` expressions.
//!
//! Wrappers whose shape is visible in the syntax (references, `Option`,
//! standard collections and maps, smart pointers) are unwrapped here so that
//! an unresolvable element type only degrades that element. Every other type
//! is resolved at compile time through the `TypeProbe` in the runtime crate.

use proc_macro2::{TokenStream, TokenTree};
use quote::{ToTokens, quote};
use syn::{GenericArgument, PathArguments, Type, TypePath, TypeReference};

const SEQUENCES: &[&str] = &[
    "Vec",
    "VecDeque",
    "HashSet",
    "BTreeSet",
    "LinkedList",
    "BinaryHeap",
];
const MAPPINGS: &[&str] = &["HashMap", "BTreeMap", "IndexMap"];
const TRANSPARENT: &[&str] = &["Box", "Rc", "Arc", "Cow"];

/// Builds an expression evaluating to the descriptor of `ty`.
pub(crate) fn descriptor(ty: &Type) -> syn::Result<TokenStream> {
    reject_unsupported(ty)?;
    Ok(match ty {
        Type::Reference(reference) => descriptor(&reference.elem)?,
        Type::Paren(paren) => descriptor(&paren.elem)?,
        Type::Group(group) => descriptor(&group.elem)?,
        Type::Tuple(tuple) if tuple.elems.is_empty() => {
            quote!(::agent_tools::TypeDescriptor::Null)
        }
        Type::Slice(slice) => sequence(&descriptor(&slice.elem)?),
        Type::Array(array) => sequence(&descriptor(&array.elem)?),
        Type::Path(path) => {
            let Some((name, arguments)) = wrapper(path) else {
                return Ok(probe(ty));
            };
            match (name, arguments.as_slice()) {
                ("Option", [inner]) => {
                    let inner = descriptor(inner)?;
                    quote!(::agent_tools::TypeDescriptor::optional(#inner))
                }
                (name, [inner]) if SEQUENCES.contains(&name) => sequence(&descriptor(inner)?),
                (name, [_, values, ..]) if MAPPINGS.contains(&name) => {
                    let values = descriptor(values)?;
                    quote!(::agent_tools::TypeDescriptor::mapping_of(#values))
                }
                (name, [inner]) if TRANSPARENT.contains(&name) => descriptor(inner)?,
                _ => probe(ty),
            }
        }
        _ => probe(ty),
    })
}

/// Type a parameter is decoded into before being passed to the function.
///
/// `&T` and `Option<&T>` decode into the owned form of `T`.
pub(crate) fn owned(ty: &Type) -> TokenStream {
    if let Type::Reference(reference) = ty {
        return owned_referent(reference);
    }
    match optional_reference(ty) {
        Some(reference) => {
            let inner = owned_referent(reference);
            quote!(::core::option::Option<#inner>)
        }
        None => ty.to_token_stream(),
    }
}

/// Returns the reference inside `Option<&T>`.
pub(crate) fn optional_reference(ty: &Type) -> Option<&TypeReference> {
    let Type::Path(path) = ty else {
        return None;
    };
    let (name, arguments) = wrapper(path)?;
    let [inner] = arguments[..] else {
        return None;
    };
    match (name, inner) {
        ("Option", Type::Reference(reference)) => Some(reference),
        _ => None,
    }
}

fn owned_referent(reference: &TypeReference) -> TokenStream {
    let inner = &reference.elem;
    quote!(<#inner as ::std::borrow::ToOwned>::Owned)
}

/// Rejects types a generated binding cannot decode.
pub(crate) fn reject_unsupported(ty: &Type) -> syn::Result<()> {
    if let Type::ImplTrait(_) = ty {
        return Err(syn::Error::new_spanned(ty, "tool parameters cannot use `impl Trait`"));
    }
    let is_impl = |token: &TokenTree| matches!(token, TokenTree::Ident(ident) if ident == "impl");
    if mentions(ty.to_token_stream(), &is_impl) {
        return Err(syn::Error::new_spanned(ty, "tool parameters cannot use `impl Trait`"));
    }

    let referent = match ty {
        Type::Reference(reference) => Some(reference),
        _ => optional_reference(ty),
    };
    if referent.is_some_and(|reference| reference.mutability.is_some()) {
        return Err(syn::Error::new_spanned(ty, "tool parameters cannot be `&mut` references"));
    }
    let rest = referent.map_or_else(
        || ty.to_token_stream(),
        |reference| reference.elem.to_token_stream(),
    );
    let is_borrow =
        |token: &TokenTree| matches!(token, TokenTree::Punct(punct) if punct.as_char() == '&');
    if mentions(rest, &is_borrow) {
        return Err(syn::Error::new_spanned(
            ty,
            "tool parameters may borrow only as `&T` or `Option<&T>`; \
             use owned element types such as `Vec<String>`",
        ));
    }
    Ok(())
}

fn mentions<F>(tokens: TokenStream, matches: &F) -> bool
where
    F: Fn(&TokenTree) -> bool,
{
    tokens.into_iter().any(|token| match &token {
        TokenTree::Group(group) => mentions(group.stream(), matches),
        other => matches(other),
    })
}

fn sequence(items: &TokenStream) -> TokenStream {
    quote!(::agent_tools::TypeDescriptor::sequence_of(#items))
}

fn probe(ty: &Type) -> TokenStream {
    quote! {
        (&&::agent_tools::__private::TypeProbe::<#ty>::new()).type_descriptor()
    }
}

/// Splits `path::Name<A, B>` into `("Name", [A, B])`, ignoring lifetimes.
fn wrapper(path: &TypePath) -> Option<(&'static str, Vec<&Type>)> {
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    let name = SEQUENCES
        .iter()
        .chain(MAPPINGS)
        .chain(TRANSPARENT)
        .chain(&["Option"])
        .copied()
        .find(|candidate| segment.ident == candidate)?;
    let types = arguments
        .args
        .iter()
        .filter_map(|argument| match argument {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect();
    Some((name, types))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn render(ty: &Type) -> String {
        descriptor(ty).unwrap().to_string().replace(' ', "")
    }

    #[test]
    fn option_of_string_wraps_probe() {
        let rendered = render(&parse_quote!(Option<String>));
        assert!(rendered.starts_with("::agent_tools::TypeDescriptor::optional("));
        assert!(rendered.contains("TypeProbe::<String>"));
    }

    #[test]
    fn collections_and_maps_unwrap_element_types() {
        let rendered = render(&parse_quote!(Vec<std::collections::HashMap<String, Handle>>));
        assert!(rendered.starts_with("::agent_tools::TypeDescriptor::sequence_of("));
        assert!(rendered.contains("mapping_of("));
        assert!(rendered.contains("TypeProbe::<Handle>"));
        assert!(!rendered.contains("TypeProbe::<String>"));
    }

    #[test]
    fn references_and_smart_pointers_are_transparent() {
        assert!(render(&parse_quote!(&str)).contains("TypeProbe::<str>"));
        assert!(render(&parse_quote!(Cow<'_, str>)).contains("TypeProbe::<str>"));
        assert!(render(&parse_quote!(Box<u8>)).contains("TypeProbe::<u8>"));
        assert!(
            render(&parse_quote!(&[u8])).starts_with("::agent_tools::TypeDescriptor::sequence_of(")
        );
        assert_eq!(render(&parse_quote!(())), "::agent_tools::TypeDescriptor::Null");
    }

    #[test]
    fn unsupported_types_are_rejected() {
        assert!(descriptor(&parse_quote!(&mut String)).is_err());
        assert!(descriptor(&parse_quote!(Option<&mut String>)).is_err());
        assert!(descriptor(&parse_quote!(impl AsRef<str>)).is_err());
        assert!(descriptor(&parse_quote!(Vec<impl AsRef<str>>)).is_err());
        assert!(descriptor(&parse_quote!(Vec<&str>)).is_err());
        assert!(descriptor(&parse_quote!(&Option<&str>)).is_err());
        assert!(descriptor(&parse_quote!(Option<&str>)).is_ok());
        assert!(descriptor(&parse_quote!(&[u8])).is_ok());
    }

    #[test]
    fn references_decode_into_owned_form() {
        let rendered = owned(&parse_quote!(&str)).to_string().replace(' ', "");
        assert_eq!(rendered, "<stras::std::borrow::ToOwned>::Owned");
        let rendered = owned(&parse_quote!(Option<&str>)).to_string().replace(' ', "");
        assert_eq!(rendered, "::core::option::Option<<stras::std::borrow::ToOwned>::Owned>");
        assert_eq!(owned(&parse_quote!(u32)).to_string(), "u32");
    }
}
