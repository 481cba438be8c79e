use proc_macro_error2::abort;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type, spanned::Spanned};

use crate::attrs::{FieldConfig, is_indirect, parse_field_attrs, parse_model_attrs};

/// One mapped (non-skipped) field of the model.
struct Column<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    config: FieldConfig,
}

#[allow(clippy::needless_pass_by_value)] // DeriveInput is consumed by proc-macro pattern
pub fn expand_derive_model(input: DeriveInput) -> TokenStream {
    let Data::Struct(data) = &input.data else {
        abort!(
            input.span(),
            "#[derive(Model)] can only be applied to structs"
        );
    };
    let Fields::Named(named) = &data.fields else {
        abort!(
            input.span(),
            "#[derive(Model)] requires a struct with named fields"
        );
    };
    if !input.generics.params.is_empty() {
        abort!(
            input.generics.span(),
            "#[derive(Model)] does not support generic structs"
        );
    }

    let config = parse_model_attrs(&input);
    let ident = &input.ident;
    let table = config.table_name(&input);
    let sharded = config.sharded.is_some();
    let fielder = config.fielder.is_some();

    let mut columns = Vec::new();
    let mut suffix_field: Option<&Ident> = None;
    for field in &named.named {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_config = parse_field_attrs(field);
        if field_config.table_suffix {
            if suffix_field.is_some() {
                abort!(field.span(), "only one field may carry 'table_suffix'");
            }
            suffix_field = Some(field_ident);
        }
        if field_config.skip {
            continue;
        }
        columns.push(Column {
            ident: field_ident,
            ty: &field.ty,
            config: field_config,
        });
    }

    let field_defs = columns.iter().map(field_def);
    let value_arms = columns.iter().enumerate().map(|(idx, c)| value_arm(idx, c));
    let load_arms = columns.iter().enumerate().map(|(idx, c)| load_arm(idx, c));

    let fielder_impl = if fielder {
        quote! {
            fn dynamic_fielder(&self) -> ::core::option::Option<&dyn ::modkit_orm::dynamic::DynamicFielder> {
                ::core::option::Option::Some(self)
            }
        }
    } else {
        TokenStream::new()
    };

    let suffix_impl = suffix_field.map_or_else(TokenStream::new, |field| {
        quote! {
            fn table_suffix(&self) -> ::core::option::Option<::std::string::String> {
                ::core::option::Option::Some(::std::string::ToString::to_string(&self.#field))
            }
        }
    });

    let resolve_impl = resolve_impl(
        ident,
        &columns
            .iter()
            .filter(|c| c.config.dynamic)
            .map(|c| c.ident)
            .collect::<Vec<_>>(),
    );

    quote! {
        impl ::modkit_orm::Model for #ident {
            fn model_def() -> ::modkit_orm::meta::ModelDef {
                ::modkit_orm::meta::ModelDef {
                    table: #table,
                    sharded: #sharded,
                    fielder: #fielder,
                    fields: ::std::vec![#(#field_defs),*],
                }
            }

            fn column_value(
                &self,
                field: usize,
            ) -> ::core::result::Result<::modkit_orm::sea_query::Value, ::modkit_orm::CodecError> {
                match field {
                    #(#value_arms)*
                    _ => ::modkit_orm::meta::unknown_field::<Self>(field),
                }
            }

            fn load_column(
                &mut self,
                field: usize,
                row: &::modkit_orm::QueryResult,
                column: &str,
            ) -> ::core::result::Result<(), ::modkit_orm::OrmError> {
                match field {
                    #(#load_arms)*
                    _ => ::modkit_orm::meta::unknown_field::<Self>(field),
                }
                ::core::result::Result::Ok(())
            }

            #fielder_impl

            #suffix_impl
        }

        #resolve_impl
    }
}

fn field_def(column: &Column<'_>) -> TokenStream {
    let name = column.ident.to_string();
    let column_name = column.config.column_name(&name);
    let ty = column.ty;
    let pk = column.config.pk;
    let auto = column.config.auto;
    let json = column.config.is_json();
    let omit_empty = column.config.omit_empty;
    let dynamic = column.config.dynamic;
    let table_suffix = column.config.table_suffix;
    let indirect = is_indirect(ty);

    quote! {
        ::modkit_orm::meta::FieldDef {
            name: #name,
            column: #column_name,
            flags: ::modkit_orm::meta::FieldFlags {
                pk: #pk,
                auto: #auto,
                json: #json,
                omit_empty: #omit_empty,
                dynamic: #dynamic,
                table_suffix: #table_suffix,
            },
            placeholder: ::modkit_orm::dynamic::is_placeholder::<#ty>(),
            indirect: #indirect,
        }
    }
}

fn value_arm(idx: usize, column: &Column<'_>) -> TokenStream {
    let ident = column.ident;
    if column.config.is_json() {
        let omit_empty = column.config.omit_empty;
        quote! {
            #idx => ::modkit_orm::codec::to_storage_value(&self.#ident, #omit_empty),
        }
    } else {
        quote! {
            #idx => ::core::result::Result::Ok(::modkit_orm::sea_query::Value::from(
                ::core::clone::Clone::clone(&self.#ident),
            )),
        }
    }
}

fn load_arm(idx: usize, column: &Column<'_>) -> TokenStream {
    let ident = column.ident;
    if column.config.is_json() {
        quote! {
            #idx => {
                let raw: ::core::option::Option<::std::string::String> = row.try_get("", column)?;
                ::modkit_orm::codec::from_storage(
                    raw.as_deref().unwrap_or_default(),
                    &mut self.#ident,
                )?;
            }
        }
    } else {
        quote! {
            #idx => {
                self.#ident = row.try_get("", column)?;
            }
        }
    }
}

/// Model-level walk: only dynamic columns hold slots, JSON columns are
/// resolved by the codec when they are loaded.
fn resolve_impl(ident: &Ident, dynamic: &[&Ident]) -> TokenStream {
    if dynamic.is_empty() {
        return quote! {
            impl ::modkit_orm::dynamic::Resolve for #ident {
                fn collect_dynamic(
                    &self,
                    _scope: ::core::option::Option<&dyn ::modkit_orm::dynamic::DynamicFielder>,
                    _path: &mut ::modkit_orm::dynamic::FieldPath,
                    _out: &mut ::std::vec::Vec<::modkit_orm::dynamic::DynamicEnvelope>,
                ) {
                }

                fn slot_at(
                    &mut self,
                    _path: &[::modkit_orm::dynamic::PathSegment],
                ) -> ::core::option::Option<&mut ::modkit_orm::dynamic::Dynamic> {
                    ::core::option::Option::None
                }
            }
        };
    }

    let names: Vec<LitStr> = dynamic
        .iter()
        .map(|field| LitStr::new(&field.to_string(), field.span()))
        .collect();

    quote! {
        impl ::modkit_orm::dynamic::Resolve for #ident {
            fn collect_dynamic(
                &self,
                scope: ::core::option::Option<&dyn ::modkit_orm::dynamic::DynamicFielder>,
                path: &mut ::modkit_orm::dynamic::FieldPath,
                out: &mut ::std::vec::Vec<::modkit_orm::dynamic::DynamicEnvelope>,
            ) {
                let scope = ::modkit_orm::Model::dynamic_fielder(self).or(scope);
                #(
                    path.push(::modkit_orm::dynamic::PathSegment::Field(#names));
                    ::modkit_orm::dynamic::Resolve::collect_dynamic(&self.#dynamic, scope, path, out);
                    path.pop();
                )*
            }

            fn slot_at(
                &mut self,
                path: &[::modkit_orm::dynamic::PathSegment],
            ) -> ::core::option::Option<&mut ::modkit_orm::dynamic::Dynamic> {
                match path.split_first() {
                    ::core::option::Option::Some((
                        ::modkit_orm::dynamic::PathSegment::Field(name),
                        rest,
                    )) => match *name {
                        #(#names => ::modkit_orm::dynamic::Resolve::slot_at(&mut self.#dynamic, rest),)*
                        _ => ::core::option::Option::None,
                    },
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}
