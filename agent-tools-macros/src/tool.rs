//! Expansion of the `#[tool]` attribute.

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Expr, ExprLit, FnArg, Ident, ItemFn, Lit, LitBool, LitStr, Meta, Pat, Path,
    ReturnType, Type,
};

use crate::types;

/// Arguments accepted by `#[tool(...)]`.
#[derive(Default)]
pub(crate) struct ToolArgs {
    description: Option<LitStr>,
    name: Option<LitStr>,
    category: Option<LitStr>,
    version: Option<LitStr>,
    enabled: Option<LitBool>,
    auto_schema: Option<LitBool>,
    auto_register: Option<LitBool>,
    parameters: Option<Path>,
}

impl ToolArgs {
    pub(crate) fn parse(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("description") {
            set_once(&mut self.description, meta)
        } else if meta.path.is_ident("name") {
            set_once(&mut self.name, meta)
        } else if meta.path.is_ident("category") {
            set_once(&mut self.category, meta)
        } else if meta.path.is_ident("version") {
            set_once(&mut self.version, meta)
        } else if meta.path.is_ident("enabled") {
            set_once(&mut self.enabled, meta)
        } else if meta.path.is_ident("auto_schema") {
            set_once(&mut self.auto_schema, meta)
        } else if meta.path.is_ident("auto_register") {
            set_once(&mut self.auto_register, meta)
        } else if meta.path.is_ident("parameters") {
            set_once(&mut self.parameters, meta)
        } else {
            Err(meta.error(
                "unsupported tool property; expected one of `description`, `name`, `category`, \
                 `version`, `enabled`, `auto_schema`, `auto_register`, `parameters`",
            ))
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, meta: &ParseNestedMeta<'_>) -> syn::Result<()>
where
    T: syn::parse::Parse,
{
    if slot.is_some() {
        return Err(meta.error("duplicate tool property"));
    }
    *slot = Some(meta.value()?.parse()?);
    Ok(())
}

/// Options from `#[param(...)]` on a single parameter.
#[derive(Default)]
struct ParamArgs {
    default: Option<Expr>,
    description: Option<LitStr>,
}

impl ParamArgs {
    fn take(attrs: &mut Vec<Attribute>) -> syn::Result<Self> {
        let mut args = Self::default();
        let mut error: Option<syn::Error> = None;
        attrs.retain(|attr| {
            if !attr.path().is_ident("param") {
                return true;
            }
            if let Err(err) = attr.parse_nested_meta(|meta| args.parse(&meta)) {
                match &mut error {
                    Some(existing) => existing.combine(err),
                    None => error = Some(err),
                }
            }
            false
        });
        error.map_or(Ok(args), Err)
    }

    fn parse(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("default") {
            set_once(&mut self.default, meta)
        } else if meta.path.is_ident("description") {
            set_once(&mut self.description, meta)
        } else {
            Err(meta.error("unsupported param property; expected `default` or `description`"))
        }
    }
}

struct Argument {
    ident: Ident,
    ty: Type,
    options: ParamArgs,
}

impl Argument {
    fn name(&self) -> String {
        unraw(&self.ident)
    }

    fn signature_param(&self) -> syn::Result<TokenStream> {
        let name = self.name();
        let descriptor = types::descriptor(&self.ty)?;
        let owned = types::owned(&self.ty);

        let default = self.options.default.as_ref().map(|expr| match expr {
            Expr::Lit(ExprLit {
                lit: Lit::Str(text), ..
            }) => quote!(.with_default(#text)),
            expr => quote!(.with_default(&{
                let __default: #owned = #expr;
                __default
            })),
        });
        let description = self
            .options
            .description
            .as_ref()
            .map(|text| quote!(.with_description(#text)));

        Ok(quote! {
            ::agent_tools::Param::new(#name, #descriptor) #default #description
        })
    }

    fn binding(&self) -> TokenStream {
        let ident = &self.ident;
        let name = self.name();
        let owned = types::owned(&self.ty);
        quote! {
            let #ident: #owned =
                ::agent_tools::__private::take_argument(&mut __args, __TOOL_NAME, #name)?;
        }
    }

    fn call_argument(&self) -> TokenStream {
        let ident = &self.ident;
        if let Type::Reference(reference) = &self.ty {
            let inner = &reference.elem;
            let owned = types::owned(&self.ty);
            return quote!(<#owned as ::std::borrow::Borrow<#inner>>::borrow(&#ident));
        }
        match types::optional_reference(&self.ty) {
            Some(reference) => {
                let inner = &reference.elem;
                let owned = quote!(<#inner as ::std::borrow::ToOwned>::Owned);
                quote! {
                    ::core::option::Option::as_ref(&#ident)
                        .map(<#owned as ::std::borrow::Borrow<#inner>>::borrow)
                }
            }
            None => quote!(#ident),
        }
    }
}

pub(crate) fn expand(args: &ToolArgs, mut function: ItemFn) -> syn::Result<TokenStream> {
    check_signature(&function)?;

    let fn_ident = function.sig.ident.clone();
    let fn_name = unraw(&fn_ident);
    let doc = doc_text(&function.attrs);

    let mut arguments = Vec::new();
    for input in &mut function.sig.inputs {
        arguments.push(argument(input)?);
    }

    let description = match (&args.description, summary(&doc)) {
        (Some(description), _) => description.value(),
        (None, Some(summary)) => summary,
        (None, None) => {
            return Err(syn::Error::new_spanned(
                &fn_ident,
                "tools need a description: add a doc comment or `#[tool(description = \"...\")]`",
            ));
        }
    };
    let tool_name = args.name.as_ref().map_or_else(|| fn_name.clone(), LitStr::value);
    let category = args
        .category
        .as_ref()
        .map_or_else(|| quote!(::agent_tools::DEFAULT_CATEGORY), |c| quote!(#c));
    let version = args
        .version
        .as_ref()
        .map_or_else(|| quote!(::agent_tools::DEFAULT_VERSION), |v| quote!(#v));
    let enabled = flag(args.enabled.as_ref());
    let auto_schema = flag(args.auto_schema.as_ref());
    let auto_register = flag(args.auto_register.as_ref());
    let parameters = match &args.parameters {
        Some(path) => quote! {
            ::core::option::Option::Some(#path as fn() -> ::agent_tools::SchemaNode)
        },
        None => quote!(::core::option::Option::None),
    };

    let with_doc = (!doc.is_empty()).then(|| quote!(.with_doc(#doc)));
    let params = arguments
        .iter()
        .map(Argument::signature_param)
        .collect::<syn::Result<Vec<_>>>()?;
    let bindings = arguments.iter().map(Argument::binding);
    let call_arguments = arguments.iter().map(Argument::call_argument);
    let await_output = function.sig.asyncness.map(|_| quote!(.await));

    let companion = format_ident!("{}Tool", pascal_case(&fn_name), span = fn_ident.span());
    let companion_doc = format!("Declaration companion of the `{fn_name}` tool.");
    let vis = &function.vis;
    let source_line = quote_spanned!(fn_ident.span()=> ::core::line!());

    Ok(quote! {
        #function

        #[doc = #companion_doc]
        #[derive(Clone, Copy, Debug, Default)]
        #vis struct #companion;

        const _: () = {
            const __TOOL_NAME: &str = #tool_name;

            fn __signature() -> ::agent_tools::Signature {
                #[allow(unused_imports)]
                use ::agent_tools::__private::{ViaToolParam as _, ViaUnknownType as _};
                ::agent_tools::Signature::new(#fn_name)
                    #with_doc
                    #(.param(#params))*
            }

            #[allow(unused_mut, unused_variables, clippy::let_unit_value)]
            fn __invoke(
                mut __args: ::agent_tools::__private::Map<
                    ::std::string::String,
                    ::agent_tools::__private::Value,
                >,
            ) -> ::agent_tools::ToolFuture {
                ::std::boxed::Box::pin(async move {
                    #[allow(unused_imports)]
                    use ::agent_tools::__private::{
                        ViaDebug as _, ViaDisplay as _, ViaResult as _, ViaSerialize as _,
                        ViaSerializeOrDebug as _, ViaValue as _,
                    };
                    #(#bindings)*
                    let __output = #fn_ident(#(#call_arguments),*) #await_output;
                    let __output = (&&::agent_tools::__private::OutcomeProbe(&__output)).outcome()?;
                    (&&&&::agent_tools::__private::OutputProbe(__output)).canonicalize()
                })
            }

            const __DECLARATION: ::agent_tools::ToolDeclaration = ::agent_tools::ToolDeclaration {
                name: __TOOL_NAME,
                description: #description,
                category: #category,
                version: #version,
                enabled: #enabled,
                auto_schema: #auto_schema,
                auto_register: #auto_register,
                parameters: #parameters,
                signature: __signature,
                invoke: __invoke,
                source_file: ::core::file!(),
                source_line: #source_line,
                module_path: ::core::module_path!(),
            };

            impl ::agent_tools::DeclaredTool for #companion {
                fn declaration() -> &'static ::agent_tools::ToolDeclaration {
                    &__DECLARATION
                }
            }

            ::agent_tools::__private::inventory::submit! { __DECLARATION }
        };
    })
}

fn check_signature(function: &ItemFn) -> syn::Result<()> {
    let sig = &function.sig;
    if let Some(unsafety) = &sig.unsafety {
        return Err(syn::Error::new_spanned(unsafety, "tools cannot be `unsafe fn`"));
    }
    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "tools cannot be generic; declare concrete parameter types",
        ));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new_spanned(variadic, "tools cannot be variadic"));
    }
    if let ReturnType::Type(_, ty) = &sig.output {
        if let Type::ImplTrait(_) = ty.as_ref() {
            return Err(syn::Error::new_spanned(ty, "tools cannot return `impl Trait`"));
        }
    }
    Ok(())
}

fn argument(input: &mut FnArg) -> syn::Result<Argument> {
    let typed = match input {
        FnArg::Receiver(receiver) => {
            return Err(syn::Error::new_spanned(
                receiver,
                "tools must be free functions; `self` parameters are not supported",
            ));
        }
        FnArg::Typed(typed) => typed,
    };

    let options = ParamArgs::take(&mut typed.attrs)?;
    let ident = match typed.pat.as_ref() {
        Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => pat.ident.clone(),
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "tool parameters must be plain identifiers",
            ));
        }
    };
    types::reject_unsupported(&typed.ty)?;

    Ok(Argument {
        ident,
        ty: (*typed.ty).clone(),
        options,
    })
}

/// Joins `#[doc]` attributes, dropping the single space rustdoc adds.
fn doc_text(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) if meta.path.is_ident("doc") => match &meta.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .flat_map(|chunk| {
            chunk
                .split('\n')
                .map(|line| line.strip_prefix(' ').unwrap_or(line).to_owned())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First non-blank line, matching the runtime doc parser.
fn summary(doc: &str) -> Option<String> {
    doc.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(ToOwned::to_owned)
}

fn flag(value: Option<&LitBool>) -> TokenStream {
    let value = value.is_none_or(LitBool::value);
    let value = LitBool::new(value, Span::call_site());
    quote!(#value)
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(ToOwned::to_owned).unwrap_or(name)
}

fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn companion_names() {
        assert_eq!(pascal_case("get_weather"), "GetWeather");
        assert_eq!(pascal_case("_private_helper"), "PrivateHelper");
        assert_eq!(pascal_case("ping"), "Ping");
    }

    #[test]
    fn doc_text_strips_rustdoc_padding() {
        let function: ItemFn = parse_quote! {
            /// Get the weather.
            ///
            /// # Arguments
            ///
            /// * `location` - City name.
            fn get_weather(location: String) {}
        };
        let doc = doc_text(&function.attrs);
        assert_eq!(
            doc,
            "Get the weather.\n\n# Arguments\n\n* `location` - City name."
        );
        assert_eq!(summary(&doc).as_deref(), Some("Get the weather."));
    }

    #[test]
    fn outputs_go_through_the_outcome_probe_regardless_of_name() {
        let args = ToolArgs::default();
        let function: ItemFn = parse_quote! {
            /// Search the index.
            fn search(query: String) -> SearchResult { SearchResult::default() }
        };
        let expanded = expand(&args, function).unwrap().to_string();
        assert!(expanded.contains("OutcomeProbe"));
        assert!(!expanded.contains("Result :: Ok"));
    }

    #[test]
    fn optional_borrows_are_passed_as_option_of_reference() {
        let mut function: ItemFn = parse_quote!(fn greet(name: Option<&str>) {});
        let argument = argument(function.sig.inputs.first_mut().unwrap()).unwrap();
        let binding = argument.binding().to_string().replace(' ', "");
        let expected = "letname:::core::option::Option<<stras::std::borrow::ToOwned>::Owned>";
        assert!(binding.contains(expected));
        let call = argument.call_argument().to_string().replace(' ', "");
        assert!(call.starts_with("::core::option::Option::as_ref(&name).map("));
    }

    #[test]
    fn param_attributes_are_stripped() {
        let mut function: ItemFn = parse_quote! {
            fn f(#[param(default = 3, description = "How many")] count: u32) {}
        };
        let argument = argument(function.sig.inputs.first_mut().unwrap()).unwrap();
        assert!(argument.options.default.is_some());
        assert_eq!(argument.options.description.unwrap().value(), "How many");
        let FnArg::Typed(typed) = function.sig.inputs.first().unwrap() else {
            unreachable!()
        };
        assert!(typed.attrs.is_empty());
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        let args = ToolArgs::default();
        let cases: Vec<ItemFn> = vec![
            parse_quote!(/// Doc
                fn generic<T>(value: T) {}),
            parse_quote!(/// Doc
                fn destructure((a, b): (u8, u8)) {}),
            parse_quote!(/// Doc
                fn mutable(value: &mut String) {}),
            parse_quote!(/// Doc
                fn nested(values: Vec<&str>) {}),
            parse_quote!(/// Doc
                unsafe fn dangerous() {}),
            parse_quote!(fn undocumented() {}),
        ];
        for function in cases {
            assert!(expand(&args, function).is_err());
        }
    }

    #[test]
    fn expansion_keeps_function_and_emits_companion() {
        let args = ToolArgs::default();
        let function: ItemFn = parse_quote! {
            /// Echo text back.
            pub fn echo(text: &str) -> String { text.to_owned() }
        };
        let expanded = expand(&args, function).unwrap().to_string();
        assert!(expanded.contains("pub fn echo"));
        assert!(expanded.contains("pub struct EchoTool"));
        assert!(expanded.contains("\"Echo text back.\""));
        assert!(expanded.contains("inventory :: submit !"));
    }
}
