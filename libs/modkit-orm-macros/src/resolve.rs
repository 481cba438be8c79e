use proc_macro_error2::abort;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Fields, GenericParam, Ident, LitStr, parse_quote,
    spanned::Spanned,
};

struct ResolveConfig {
    fielder: bool,
}

fn parse_resolve_attrs(attrs: &[Attribute], allow: &[&str]) -> Vec<String> {
    let mut keys = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("resolve")) {
        let result = attr.parse_nested_meta(|meta| {
            let span = meta.path.span();
            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();
            if !allow.contains(&key.as_str()) {
                abort!(
                    span,
                    "unknown resolve attribute '{}': expected one of {}",
                    key,
                    allow.join(", ")
                );
            }
            if keys.contains(&key) {
                abort!(span, "duplicate attribute '{}'", key);
            }
            keys.push(key);
            Ok(())
        });
        if let Err(err) = result {
            abort!(err.span(), "invalid resolve attribute: {}", err);
        }
    }
    keys
}

#[allow(clippy::needless_pass_by_value)] // DeriveInput is consumed by proc-macro pattern
pub fn expand_derive_resolve(mut input: DeriveInput) -> TokenStream {
    let config = ResolveConfig {
        fielder: parse_resolve_attrs(&input.attrs, &["fielder"])
            .iter()
            .any(|k| k == "fielder"),
    };

    let Data::Struct(data) = &input.data else {
        abort!(
            input.span(),
            "#[derive(Resolve)] can only be applied to structs"
        );
    };

    // (path segment, field accessor)
    let walked: Vec<(LitStr, TokenStream)> = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter(|f| parse_resolve_attrs(&f.attrs, &["skip"]).is_empty())
            .filter_map(|f| f.ident.as_ref())
            .map(|ident: &Ident| {
                (
                    LitStr::new(&ident.to_string(), ident.span()),
                    quote!(#ident),
                )
            })
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .filter(|(_, f)| parse_resolve_attrs(&f.attrs, &["skip"]).is_empty())
            .map(|(idx, f)| {
                let index = syn::Index::from(idx);
                (LitStr::new(&idx.to_string(), f.span()), quote!(#index))
            })
            .collect(),
        Fields::Unit => Vec::new(),
    };

    for param in &mut input.generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds
                .push(parse_quote!(::modkit_orm::dynamic::Resolve));
        }
    }
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let scope = if config.fielder {
        quote! {
            let scope = ::core::option::Option::Some(
                self as &dyn ::modkit_orm::dynamic::DynamicFielder,
            )
            .or(scope);
        }
    } else {
        TokenStream::new()
    };

    let names: Vec<&LitStr> = walked.iter().map(|(n, _)| n).collect();
    let accessors: Vec<&TokenStream> = walked.iter().map(|(_, a)| a).collect();

    quote! {
        impl #impl_generics ::modkit_orm::dynamic::Resolve for #ident #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn collect_dynamic(
                &self,
                scope: ::core::option::Option<&dyn ::modkit_orm::dynamic::DynamicFielder>,
                path: &mut ::modkit_orm::dynamic::FieldPath,
                out: &mut ::std::vec::Vec<::modkit_orm::dynamic::DynamicEnvelope>,
            ) {
                #scope
                #(
                    path.push(::modkit_orm::dynamic::PathSegment::Field(#names));
                    ::modkit_orm::dynamic::Resolve::collect_dynamic(&self.#accessors, scope, path, out);
                    path.pop();
                )*
            }

            #[allow(unused_variables)]
            fn slot_at(
                &mut self,
                path: &[::modkit_orm::dynamic::PathSegment],
            ) -> ::core::option::Option<&mut ::modkit_orm::dynamic::Dynamic> {
                match path.split_first() {
                    ::core::option::Option::Some((
                        ::modkit_orm::dynamic::PathSegment::Field(name),
                        rest,
                    )) => match *name {
                        #(#names => ::modkit_orm::dynamic::Resolve::slot_at(&mut self.#accessors, rest),)*
                        _ => ::core::option::Option::None,
                    },
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}
