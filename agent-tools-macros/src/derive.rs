//! Expansion of `#[derive(ToolParam)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Token, Variant};

use crate::types;

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "`ToolParam` can only be derived for enums; implement it by hand for other types",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "`ToolParam` cannot be derived for generic enums",
        ));
    }

    let container = SerdeAttrs::parse(&input.attrs)?;
    if container.tag.is_some() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "internally tagged enums are not supported by `ToolParam`",
        ));
    }

    let body = if container.untagged {
        let mut members = Vec::new();
        for variant in &data.variants {
            if !skipped(variant)? {
                members.push(untagged_member(variant)?);
            }
        }
        quote!(::agent_tools::TypeDescriptor::union([#(#members),*]))
    } else {
        let rule = container
            .rename_all
            .as_ref()
            .map(RenameRule::from_lit)
            .transpose()?;
        let mut values = Vec::new();
        for variant in &data.variants {
            if skipped(variant)? {
                continue;
            }
            if !matches!(variant.fields, Fields::Unit) {
                return Err(syn::Error::new_spanned(
                    variant,
                    "`ToolParam` needs unit variants, \
                     or `#[serde(untagged)]` with newtype variants",
                ));
            }
            let attrs = SerdeAttrs::parse(&variant.attrs)?;
            let value = match attrs.rename {
                Some(rename) => rename.value(),
                None => match rule {
                    Some(rule) => rule.apply(&variant.ident.to_string()),
                    None => variant.ident.to_string(),
                },
            };
            values.push(value);
        }
        if values.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "`ToolParam` needs at least one deserializable variant",
            ));
        }
        quote!(::agent_tools::TypeDescriptor::literal([#(#values),*]))
    };

    let ident = &input.ident;
    Ok(quote! {
        impl ::agent_tools::ToolParam for #ident {
            fn type_descriptor() -> ::agent_tools::TypeDescriptor {
                #[allow(unused_imports)]
                use ::agent_tools::__private::{ViaToolParam as _, ViaUnknownType as _};
                #body
            }
        }
    })
}

fn untagged_member(variant: &Variant) -> syn::Result<TokenStream> {
    match &variant.fields {
        Fields::Unit => Ok(quote!(::agent_tools::TypeDescriptor::Null)),
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            types::descriptor(&fields.unnamed[0].ty)
        }
        _ => Err(syn::Error::new_spanned(
            variant,
            "untagged `ToolParam` variants must be unit or newtype variants",
        )),
    }
}

fn skipped(variant: &Variant) -> syn::Result<bool> {
    Ok(SerdeAttrs::parse(&variant.attrs)?.skip)
}

/// The subset of serde attributes that changes the wire shape of an enum.
#[derive(Default)]
struct SerdeAttrs {
    rename: Option<LitStr>,
    rename_all: Option<LitStr>,
    tag: Option<LitStr>,
    untagged: bool,
    skip: bool,
}

impl SerdeAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| parsed.apply(&meta))?;
        }
        Ok(parsed)
    }

    fn apply(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("rename") {
            self.rename = Some(deserialize_name(meta)?);
        } else if meta.path.is_ident("rename_all") {
            self.rename_all = Some(deserialize_name(meta)?);
        } else if meta.path.is_ident("tag") {
            self.tag = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("untagged") {
            self.untagged = true;
        } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing") {
            self.skip = true;
        } else {
            skip_value(meta)?;
        }
        Ok(())
    }
}

/// Reads `key = "name"` or `key(serialize = "..", deserialize = "name")`.
fn deserialize_name(meta: &ParseNestedMeta<'_>) -> syn::Result<LitStr> {
    if meta.input.peek(Token![=]) {
        return meta.value()?.parse();
    }
    let mut name = None;
    meta.parse_nested_meta(|inner| {
        let value: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("deserialize") {
            name = Some(value);
        }
        Ok(())
    })?;
    name.ok_or_else(|| meta.error("expected `deserialize = \"...\"`"))
}

fn skip_value(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream = content.parse()?;
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> syn::Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            _ => return Err(syn::Error::new_spanned(lit, "unknown `rename_all` rule")),
        })
    }

    /// Renames a `PascalCase` variant identifier.
    fn apply(self, variant: &str) -> String {
        match self {
            Self::Lower => variant.to_ascii_lowercase(),
            Self::Upper => variant.to_ascii_uppercase(),
            Self::Pascal => variant.to_owned(),
            Self::Camel => {
                let mut chars = variant.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_lowercase().chain(chars).collect()
                })
            }
            Self::Snake => {
                let mut snake = String::with_capacity(variant.len() + 4);
                for (index, ch) in variant.char_indices() {
                    if index > 0 && ch.is_uppercase() {
                        snake.push('_');
                    }
                    snake.extend(ch.to_lowercase());
                }
                snake
            }
            Self::ScreamingSnake => Self::Snake.apply(variant).to_ascii_uppercase(),
            Self::Kebab => Self::Snake.apply(variant).replace('_', "-"),
            Self::ScreamingKebab => Self::ScreamingSnake.apply(variant).replace('_', "-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn rename_rules() {
        let cases = [
            (RenameRule::Lower, "lightrain"),
            (RenameRule::Upper, "LIGHTRAIN"),
            (RenameRule::Pascal, "LightRain"),
            (RenameRule::Camel, "lightRain"),
            (RenameRule::Snake, "light_rain"),
            (RenameRule::ScreamingSnake, "LIGHT_RAIN"),
            (RenameRule::Kebab, "light-rain"),
            (RenameRule::ScreamingKebab, "LIGHT-RAIN"),
        ];
        for (rule, expected) in cases {
            assert_eq!(rule.apply("LightRain"), expected);
        }
    }

    #[test]
    fn unit_enum_becomes_literal() {
        let input: DeriveInput = parse_quote! {
            #[derive(Deserialize)]
            #[serde(rename_all = "lowercase", deny_unknown_fields)]
            enum Unit {
                Celsius,
                #[serde(rename = "F")]
                Fahrenheit,
                #[serde(skip)]
                Kelvin,
            }
        };
        let expanded = expand(&input).unwrap().to_string().replace(' ', "");
        assert!(expanded.contains("literal([\"celsius\",\"F\"])"), "{expanded}");
    }

    #[test]
    fn split_rename_uses_deserialize_name() {
        let input: DeriveInput = parse_quote! {
            enum Mode {
                #[serde(rename(serialize = "out", deserialize = "in"))]
                Either,
            }
        };
        let expanded = expand(&input).unwrap().to_string();
        assert!(expanded.contains("\"in\""));
        assert!(!expanded.contains("\"out\""));
    }

    #[test]
    fn untagged_enum_becomes_union() {
        let input: DeriveInput = parse_quote! {
            #[serde(untagged)]
            enum Limit {
                Count(u32),
                Label(String),
                Unlimited,
            }
        };
        let expanded = expand(&input).unwrap().to_string().replace(' ', "");
        assert!(expanded.contains("TypeDescriptor::union(["));
        assert!(expanded.contains("TypeProbe::<u32>"));
        assert!(expanded.contains("TypeDescriptor::Null"));
    }

    #[test]
    fn unsupported_shapes_are_rejected() {
        let inputs: Vec<DeriveInput> = vec![
            parse_quote!(struct Plain { value: u8 }),
            parse_quote!(enum Data { Value(u8) }),
            parse_quote!(#[serde(tag = "kind")] enum Tagged { A, B }),
            parse_quote!(#[serde(rename_all = "Title Case")] enum Odd { A }),
            parse_quote!(enum Generic<T> { A }),
        ];
        for input in inputs {
            assert!(expand(&input).is_err());
        }
    }
}
