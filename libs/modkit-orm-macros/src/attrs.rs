use heck::ToSnakeCase;
use proc_macro_error2::abort;
use proc_macro2::Span;
use syn::{Attribute, DeriveInput, Field, Type, spanned::Spanned};

/// Configuration parsed from struct-level `#[orm(...)]` attributes.
#[derive(Default)]
pub struct ModelConfig {
    pub table: Option<(String, Span)>,
    pub sharded: Option<Span>,
    pub fielder: Option<Span>,
}

/// Configuration parsed from field-level `#[orm(...)]` attributes.
#[derive(Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FieldConfig {
    pub column: Option<(String, Span)>,
    pub pk: bool,
    pub auto: bool,
    pub json: bool,
    pub omit_empty: bool,
    pub dynamic: bool,
    pub table_suffix: bool,
    pub skip: bool,
}

impl ModelConfig {
    pub fn table_name(&self, input: &DeriveInput) -> String {
        self.table
            .as_ref()
            .map_or_else(|| input.ident.to_string().to_snake_case(), |(t, _)| t.clone())
    }
}

impl FieldConfig {
    pub fn column_name(&self, field_name: &str) -> String {
        self.column
            .as_ref()
            .map_or_else(|| field_name.to_owned(), |(c, _)| c.clone())
    }

    pub fn is_json(&self) -> bool {
        self.json || self.dynamic
    }
}

fn set_flag(slot: &mut Option<Span>, span: Span, name: &str) {
    if slot.is_some() {
        abort!(span, "duplicate attribute '{}'", name);
    }
    *slot = Some(span);
}

fn set_bool(slot: &mut bool, span: Span, name: &str) {
    if *slot {
        abort!(span, "duplicate attribute '{}'", name);
    }
    *slot = true;
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>, span: Span) -> String {
    match meta.value() {
        Ok(v) => match v.parse::<syn::LitStr>() {
            Ok(lit) => {
                let value = lit.value();
                if value.is_empty() {
                    abort!(span, "value must not be empty");
                }
                value
            }
            Err(_) => abort!(span, "Expected string literal"),
        },
        Err(_) => abort!(span, "Expected '=' followed by a string value"),
    }
}

/// Parse all struct-level `#[orm(...)]` attributes with duplicate detection.
pub fn parse_model_attrs(input: &DeriveInput) -> ModelConfig {
    let mut config = ModelConfig::default();

    for attr in orm_attrs(&input.attrs) {
        let result = attr.parse_nested_meta(|meta| {
            let span = meta.path.span();

            if meta.path.is_ident("sharded") {
                set_flag(&mut config.sharded, span, "sharded");
                return Ok(());
            }

            if meta.path.is_ident("fielder") {
                set_flag(&mut config.fielder, span, "fielder");
                return Ok(());
            }

            if meta.path.is_ident("table") {
                if config.table.is_some() {
                    abort!(span, "duplicate attribute 'table'");
                }
                config.table = Some((string_value(&meta, span), span));
                return Ok(());
            }

            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();
            abort!(
                span,
                "unknown orm attribute '{}': expected one of table, sharded, fielder",
                key
            );
        });

        if let Err(err) = result {
            abort!(err.span(), "invalid orm attribute: {}", err);
        }
    }

    config
}

/// Parse all field-level `#[orm(...)]` attributes with duplicate detection.
pub fn parse_field_attrs(field: &Field) -> FieldConfig {
    let mut config = FieldConfig::default();

    for attr in orm_attrs(&field.attrs) {
        let result = attr.parse_nested_meta(|meta| {
            let span = meta.path.span();

            if meta.path.is_ident("column") {
                if config.column.is_some() {
                    abort!(span, "duplicate attribute 'column'");
                }
                config.column = Some((string_value(&meta, span), span));
                return Ok(());
            }

            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();

            match key.as_str() {
                "pk" => set_bool(&mut config.pk, span, "pk"),
                "auto" => set_bool(&mut config.auto, span, "auto"),
                "json" => set_bool(&mut config.json, span, "json"),
                "omit_empty" => set_bool(&mut config.omit_empty, span, "omit_empty"),
                "dynamic" => set_bool(&mut config.dynamic, span, "dynamic"),
                "table_suffix" => set_bool(&mut config.table_suffix, span, "table_suffix"),
                "skip" => set_bool(&mut config.skip, span, "skip"),
                _ => abort!(
                    span,
                    "unknown orm attribute '{}': expected one of pk, auto, column, json, \
                     omit_empty, dynamic, table_suffix, skip",
                    key
                ),
            }
            Ok(())
        });

        if let Err(err) = result {
            abort!(err.span(), "invalid orm attribute: {}", err);
        }
    }

    if config.skip && (config.pk || config.auto || config.is_json() || config.column.is_some()) {
        abort!(
            field.span(),
            "a skipped field cannot carry column attributes"
        );
    }
    if config.omit_empty && !config.is_json() {
        abort!(field.span(), "'omit_empty' requires 'json' or 'dynamic'");
    }

    config
}

fn orm_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("orm"))
}

/// Whether the outermost type is an owning indirection (`Box<_>`).
pub fn is_indirect(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Box"),
        Type::Group(group) => is_indirect(&group.elem),
        Type::Paren(paren) => is_indirect(&paren.elem),
        _ => false,
    }
}
