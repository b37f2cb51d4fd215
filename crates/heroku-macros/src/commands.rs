//! `#[commands]` proc macro for command handler types.
//!
//! Applied to an inherent impl block, it turns every public, argument-less
//! method into an action of the type's namespace. Each method's doc comment
//! is its help text.
//!
//! # Example
//!
//! ```rust,ignore
//! /// manage apps (create, destroy)
//! #[commands(namespace = "app")]
//! impl App {
//!     /// list
//!     ///
//!     /// list your apps
//!     #[alias("apps")]
//!     pub fn list(&self) -> HandlerResult { ... }
//! }
//!
//! // Generates:
//! // impl ::heroku_dispatch::Handler for App {
//! //     fn responds_to(&self, action: &str) -> bool { ["list"].contains(&action) }
//! //     fn invoke(&mut self, action: &str) -> HandlerResult {
//! //         match action { "list" => self.list()..., other => Err(invalid(other)) }
//! //     }
//! // }
//! //
//! // impl ::heroku_dispatch::CommandSet for App {
//! //     const NAMESPACE: &'static str = "app";
//! //     fn register(registry: &mut Registry) {
//! //         registry.register_namespace("app", Some("manage apps (create, destroy)"));
//! //         registry.alias("apps", "app:list");
//! //         registry.register_command(CommandEntry::new("app", Some("list"), ...));
//! //     }
//! // }
//! ```
//!
//! # Attribute Arguments
//!
//! | Argument | Default |
//! |----------|---------|
//! | `namespace = "x"` | the type name, lowercased |
//! | `description = "x"` | the impl block's doc comment |
//!
//! # Action Rules
//!
//! - Only `pub fn` methods taking `&self` or `&mut self` and nothing else
//!   become actions. Other methods are left alone.
//! - A method named `index` is the namespace's default action.
//! - Actions return `Result<Output, E>` with `E: Into<CommandError>`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, FnArg, ImplItem, ImplItemFn, ItemImpl, LitStr, Meta, Result, Token,
    Type, Visibility,
};

/// Name of the default action.
const INDEX: &str = "index";

/// Arguments of `#[commands(...)]`.
#[derive(Default)]
struct CommandsArgs {
    namespace: Option<String>,
    description: Option<String>,
}

impl Parse for CommandsArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = CommandsArgs::default();

        if input.is_empty() {
            return Ok(args);
        }

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            let nv = match meta {
                Meta::NameValue(nv) => nv,
                other => return Err(Error::new(other.span(), "expected `key = \"value\"`")),
            };
            let value = match &nv.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    syn::Lit::Str(lit_str) => lit_str.value(),
                    _ => return Err(Error::new(nv.value.span(), "expected string literal")),
                },
                _ => return Err(Error::new(nv.value.span(), "expected string literal")),
            };

            if nv.path.is_ident("namespace") {
                if value.is_empty() || value.contains(':') {
                    return Err(Error::new(
                        nv.value.span(),
                        "namespace must be non-empty and contain no `:`",
                    ));
                }
                args.namespace = Some(value);
            } else if nv.path.is_ident("description") {
                args.description = Some(value);
            } else {
                return Err(Error::new(
                    nv.path.span(),
                    "unknown attribute, expected `namespace` or `description`",
                ));
            }
        }

        Ok(args)
    }
}

/// One action found in the impl block.
struct Action {
    method: syn::Ident,
    help: String,
    aliases: Vec<LitStr>,
}

impl Action {
    fn name(&self) -> String {
        self.method.to_string()
    }

    fn is_index(&self) -> bool {
        self.method == INDEX
    }

    fn key(&self, namespace: &str) -> String {
        if self.is_index() {
            namespace.to_string()
        } else {
            format!("{}:{}", namespace, self.method)
        }
    }
}

/// Joins doc comment lines, dropping the single space rustdoc inserts
/// after `///`.
fn doc_text(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    syn::Lit::Str(lit_str) => Some(lit_str.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').map(String::from).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes `#[alias(...)]` attributes from a method, returning their values.
fn take_aliases(method: &mut ImplItemFn) -> Result<Vec<LitStr>> {
    let mut aliases = Vec::new();
    let mut kept = Vec::with_capacity(method.attrs.len());

    for attr in method.attrs.drain(..) {
        if attr.path().is_ident("alias") {
            let names = attr.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
            if names.is_empty() {
                return Err(Error::new(attr.span(), "#[alias] expects at least one name"));
            }
            aliases.extend(names);
        } else {
            kept.push(attr);
        }
    }

    method.attrs = kept;
    Ok(aliases)
}

/// Returns true if the method can be invoked by name: public, with a
/// `&self`/`&mut self` receiver and no other inputs.
fn is_action(method: &ImplItemFn) -> bool {
    let sig = &method.sig;
    matches!(method.vis, Visibility::Public(_))
        && sig.generics.params.is_empty()
        && sig.asyncness.is_none()
        && sig.inputs.len() == 1
        && matches!(sig.inputs.first(), Some(FnArg::Receiver(r)) if r.reference.is_some())
}

/// Last path segment of the implementing type.
fn type_name(ty: &Type) -> Result<String> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .ok_or_else(|| Error::new(ty.span(), "expected a named type")),
        _ => Err(Error::new(ty.span(), "#[commands] requires a named type")),
    }
}

/// Implementation of the `#[commands]` attribute.
pub fn commands_impl(attr: TokenStream, item: TokenStream) -> Result<TokenStream> {
    let args: CommandsArgs = syn::parse2(attr)?;
    let mut item_impl: ItemImpl = syn::parse2(item)?;

    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(Error::new(
            path.span(),
            "#[commands] applies to inherent impl blocks, not trait impls",
        ));
    }
    if !item_impl.generics.params.is_empty() {
        return Err(Error::new(
            item_impl.generics.span(),
            "#[commands] does not support generic impl blocks",
        ));
    }

    let namespace = match args.namespace {
        Some(namespace) => namespace,
        None => type_name(&item_impl.self_ty)?.to_lowercase(),
    };
    let description = args.description.unwrap_or_else(|| doc_text(&item_impl.attrs));

    let mut actions = Vec::new();
    for item in &mut item_impl.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let aliases = take_aliases(method)?;
        if !is_action(method) {
            if let Some(alias) = aliases.first() {
                return Err(Error::new(
                    alias.span(),
                    "#[alias] requires a public method taking only `&self` or `&mut self`",
                ));
            }
            continue;
        }
        actions.push(Action {
            method: method.sig.ident.clone(),
            help: doc_text(&method.attrs),
            aliases,
        });
    }

    if actions.is_empty() {
        return Err(Error::new(
            item_impl.self_ty.span(),
            "#[commands] found no public actions; actions take only `&self` or `&mut self`",
        ));
    }

    let self_ty = &item_impl.self_ty;
    let names: Vec<String> = actions.iter().map(Action::name).collect();
    let methods: Vec<&syn::Ident> = actions.iter().map(|a| &a.method).collect();

    let description = if description.trim().is_empty() {
        quote! { ::core::option::Option::None }
    } else {
        quote! { ::core::option::Option::Some(#description) }
    };

    let registrations = actions.iter().map(|action| {
        let name = action.name();
        let key = action.key(&namespace);
        let help = &action.help;
        let alias_calls = action
            .aliases
            .iter()
            .map(|alias| quote! { registry.alias(#alias, #key); });
        let action_name = if action.is_index() {
            quote! { ::core::option::Option::None }
        } else {
            quote! { ::core::option::Option::Some(#name) }
        };
        quote! {
            #( #alias_calls )*
            registry.register_command(::heroku_dispatch::CommandEntry::new(
                #namespace,
                #action_name,
                ::heroku_dispatch::HandlerRef::of::<Self>(#name),
                #help,
            ));
        }
    });

    Ok(quote! {
        #item_impl

        impl ::heroku_dispatch::Handler for #self_ty {
            fn responds_to(&self, action: &str) -> bool {
                const ACTIONS: &[&str] = &[#(#names),*];
                ACTIONS.contains(&action)
            }

            fn invoke(&mut self, action: &str) -> ::heroku_dispatch::HandlerResult {
                match action {
                    #( #names => self.#methods().map_err(::core::convert::Into::into), )*
                    other => ::core::result::Result::Err(
                        ::heroku_dispatch::CommandError::invalid(other),
                    ),
                }
            }
        }

        impl ::heroku_dispatch::CommandSet for #self_ty {
            const NAMESPACE: &'static str = #namespace;

            fn register(registry: &mut ::heroku_dispatch::Registry) {
                registry.register_namespace(#namespace, #description);
                #( #registrations )*
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expansion with all whitespace removed, so assertions do not depend
    /// on token spacing.
    fn expand(attr: TokenStream, item: TokenStream) -> String {
        compact(&commands_impl(attr, item).unwrap().to_string())
    }

    fn compact(text: &str) -> String {
        text.split_whitespace().collect()
    }

    fn expand_err(attr: TokenStream, item: TokenStream) -> String {
        match commands_impl(attr, item) {
            Ok(tokens) => panic!("expected an error, got {}", tokens),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn test_doc_text_strips_rustdoc_space() {
        let attrs: Vec<Attribute> = vec![
            syn::parse_quote!(#[doc = " apps:create [NAME]"]),
            syn::parse_quote!(#[doc = ""]),
            syn::parse_quote!(#[doc = "   -b, --buildpack BUILDPACK  # a buildpack url"]),
            syn::parse_quote!(#[inline]),
        ];
        assert_eq!(
            doc_text(&attrs),
            "apps:create [NAME]\n\n  -b, --buildpack BUILDPACK  # a buildpack url"
        );
    }

    #[test]
    fn test_is_action() {
        let method: ImplItemFn = syn::parse_quote!(pub fn list(&self) -> HandlerResult {});
        assert!(is_action(&method));
        let method: ImplItemFn = syn::parse_quote!(pub fn create(&mut self) -> HandlerResult {});
        assert!(is_action(&method));
        let method: ImplItemFn = syn::parse_quote!(fn private(&self) -> HandlerResult {});
        assert!(!is_action(&method));
        let method: ImplItemFn = syn::parse_quote!(pub fn takes(&self, n: u8) -> HandlerResult {});
        assert!(!is_action(&method));
        let method: ImplItemFn = syn::parse_quote!(pub fn owned(self) -> HandlerResult {});
        assert!(!is_action(&method));
        let method: ImplItemFn = syn::parse_quote!(pub fn new() -> Self {});
        assert!(!is_action(&method));
    }

    #[test]
    fn test_namespace_defaults_to_lowercase_type_name() {
        let out = expand(
            quote!(),
            quote! {
                /// manage stacks
                impl Stack {
                    /// stack
                    ///
                    /// list available stacks
                    pub fn index(&self) -> HandlerResult { todo!() }
                    pub fn migrate(&mut self) -> HandlerResult { todo!() }
                    fn helper(&self) {}
                }
            },
        );
        assert!(out.contains(&compact("const NAMESPACE: &'static str = \"stack\"")), "{out}");
        assert!(out.contains(&compact("Some(\"manage stacks\")")), "{out}");
        assert!(out.contains(&compact("&[\"index\", \"migrate\"]")), "{out}");
        assert!(out.contains(&compact("\"stack\\n\\nlist available stacks\"")), "{out}");
        let index_entry = compact("CommandEntry::new(\"stack\", ::core::option::Option::None");
        assert!(out.contains(&index_entry), "{out}");
        assert!(!out.contains("\"helper\""), "{out}");
    }

    #[test]
    fn test_explicit_namespace_and_aliases() {
        let out = expand(
            quote!(namespace = "app", description = "manage apps"),
            quote! {
                impl Apps {
                    #[alias("apps", "ls")]
                    pub fn list(&self) -> HandlerResult { todo!() }
                }
            },
        );
        assert!(out.contains(&compact("register_namespace(\"app\"")), "{out}");
        assert!(out.contains(&compact("registry.alias(\"apps\", \"app:list\");")), "{out}");
        assert!(out.contains(&compact("registry.alias(\"ls\", \"app:list\");")), "{out}");
        assert!(!out.contains("#[alias"), "{out}");
    }

    #[test]
    fn test_rejects_trait_impls() {
        let err = expand_err(
            quote!(),
            quote! {
                impl Clone for Apps {
                    fn clone(&self) -> Self { todo!() }
                }
            },
        );
        assert!(err.contains("inherent impl"), "{err}");
    }

    #[test]
    fn test_rejects_generic_impls() {
        let err = expand_err(
            quote!(),
            quote! {
                impl<T> Apps<T> {
                    pub fn list(&self) -> HandlerResult { todo!() }
                }
            },
        );
        assert!(err.contains("generic"), "{err}");
    }

    #[test]
    fn test_rejects_impl_without_actions() {
        let err = expand_err(
            quote!(),
            quote! {
                impl Apps {
                    fn helper(&self) {}
                }
            },
        );
        assert!(err.contains("no public actions"), "{err}");
    }

    #[test]
    fn test_rejects_alias_on_non_action() {
        let err = expand_err(
            quote!(),
            quote! {
                impl Apps {
                    pub fn list(&self) -> HandlerResult { todo!() }
                    #[alias("x")]
                    fn helper(&self) {}
                }
            },
        );
        assert!(err.contains("#[alias]"), "{err}");
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let item = quote! {
            impl Apps {
                pub fn list(&self) -> HandlerResult { todo!() }
            }
        };
        assert!(expand_err(quote!(name = "x"), item.clone()).contains("unknown attribute"));
        assert!(expand_err(quote!(namespace = "a:b"), item.clone()).contains("namespace"));
        assert!(expand_err(quote!(namespace = 3), item).contains("string literal"));
    }
}
