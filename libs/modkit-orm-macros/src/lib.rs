// Proc-macro crate for modkit-orm model derives
//
//! # modkit-orm-macros
//!
//! Procedural macros for the `modkit-orm` model mapping layer.
//!
//! ## `#[derive(Model)]`
//!
//! Generates the field table and the column accessors that the model registry
//! and the CRUD executor work with. Rust has no struct reflection, so every
//! mapped type carries a generated `Model` implementation instead.
//!
//! ### Example
//!
//! ```ignore
//! use modkit_orm::{Dynamic, DynamicContent, DynamicFielder, Model};
//!
//! #[derive(Debug, Default, Model)]
//! #[orm(table = "dynamic_test", fielder)]
//! pub struct Event {
//!     #[orm(pk, auto)]
//!     pub id: i64,
//!     #[orm(column = "type")]
//!     pub kind: String,
//!     #[orm(dynamic)]
//!     pub content: Dynamic,
//! }
//!
//! impl DynamicFielder for Event {
//!     fn new_dynamic_field(&self, _field: &str) -> Option<Box<dyn DynamicContent>> {
//!         match self.kind.as_str() {
//!             "A" => Some(Box::new(AContent::default())),
//!             _ => None,
//!         }
//!     }
//! }
//! ```
//!
//! ## `#[derive(Resolve)]`
//!
//! Makes a serde record walkable by the dynamic field resolver, so `Dynamic`
//! slots nested inside it are found and resolved after decoding.

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod model;
mod resolve;

/// Derive macro for implementing `modkit_orm::Model`.
///
/// # Struct attributes
///
/// - `table = "name"`: base table name (default: snake_case of the type name)
/// - `sharded`: the table is partitioned, every operation needs a suffix
/// - `fielder`: the type implements `DynamicFielder` for its dynamic columns
///
/// # Field attributes
///
/// - `pk`: primary key column
/// - `auto`: server-generated value, left out of inserts
/// - `column = "name"`: explicit column name (default: the field name)
/// - `json`: stored as a JSON text column
/// - `omit_empty`: store the empty string instead of an empty JSON value
/// - `dynamic`: a `Dynamic` slot resolved through `DynamicFielder` (implies `json`)
/// - `table_suffix`: the field value is the shard suffix of the row
/// - `skip`: not mapped to any column
#[proc_macro_derive(Model, attributes(orm))]
#[proc_macro_error]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand_derive_model(input).into()
}

/// Derive macro for implementing `modkit_orm::dynamic::Resolve`.
///
/// # Attributes
///
/// - `#[resolve(fielder)]` on the struct: the type implements `DynamicFielder`
///   and answers for every `Dynamic` slot below it
/// - `#[resolve(skip)]` on a field: the walk does not descend into the field
#[proc_macro_derive(Resolve, attributes(resolve))]
#[proc_macro_error]
pub fn derive_resolve(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    resolve::expand_derive_resolve(input).into()
}
