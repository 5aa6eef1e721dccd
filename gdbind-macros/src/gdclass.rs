// #[gdclass] expansion: the GodotClass impl plus an inventory registration.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{parse2, Expr, ExprLit, Fields, ItemStruct, Lit, Meta, Token};

// ---------------------------------------------------------------------------
// Attribute parsing
// ---------------------------------------------------------------------------

/// Parsed #[gdclass(...)] attributes.
#[derive(Debug, Default, PartialEq)]
struct GdClassArgs {
    refcounted: bool,
    name: Option<String>,
}

fn parse_gdclass_args(attr: TokenStream) -> syn::Result<GdClassArgs> {
    let mut args = GdClassArgs::default();
    if attr.is_empty() {
        return Ok(args);
    }
    let metas = syn::parse::Parser::parse2(Punctuated::<Meta, Token![,]>::parse_terminated, attr)?;

    for meta in &metas {
        match meta {
            Meta::Path(p) if p.is_ident("refcounted") => {
                if args.refcounted {
                    return Err(syn::Error::new_spanned(p, "duplicate `refcounted`"));
                }
                args.refcounted = true;
            }
            Meta::NameValue(nv) if nv.path.is_ident("name") => {
                if args.name.is_some() {
                    return Err(syn::Error::new_spanned(&nv.path, "duplicate `name`"));
                }
                let Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) = &nv.value else {
                    return Err(syn::Error::new_spanned(
                        &nv.value,
                        "`name` must be a string literal, e.g. name = \"PlayerStats\"",
                    ));
                };
                let value = s.value();
                if value.is_empty() {
                    return Err(syn::Error::new_spanned(s, "`name` must not be empty"));
                }
                args.name = Some(value);
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "unknown #[gdclass] argument; expected `refcounted` or `name = \"...\"`",
                ));
            }
        }
    }
    Ok(args)
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

pub fn expand_gdclass(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let args = parse_gdclass_args(attr)?;
    let input: ItemStruct = parse2(item)?;

    if !matches!(input.fields, Fields::Named(_)) {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[gdclass] requires a struct with named fields.\n\n\
             Example:\n\
             \x20   #[gdclass]\n\
             \x20   #[derive(Default)]\n\
             \x20   pub struct Player {\n\
             \x20       health: i64,\n\
             \x20   }",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[gdclass] structs cannot be generic: the engine registers one class per type",
        ));
    }

    let struct_name = &input.ident;
    let class_name = args.name.unwrap_or_else(|| struct_name.to_string());
    let class_name_lit = syn::LitStr::new(&class_name, Span::call_site());
    let refcounted = args.refcounted;

    Ok(quote! {
        #input

        impl ::gdbind::runtime::GodotClass for #struct_name {
            const CLASS_NAME: &'static str = #class_name_lit;
            const REFCOUNTED: bool = #refcounted;
        }

        ::gdbind::__inventory::submit! {
            ::gdbind::runtime::class_registry::ClassRegistration {
                class_name: #class_name_lit,
                refcounted: #refcounted,
                create: ::gdbind::runtime::class_registry::create_shadow::<#struct_name>,
            }
        }
    })
}
