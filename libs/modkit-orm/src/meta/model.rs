use std::any::type_name;
use std::collections::HashSet;

use sea_orm::QueryResult;
use sea_orm::sea_query::Value;

use super::{FieldDef, FieldDescriptor};
use crate::dynamic::{DynamicFielder, Resolve};
use crate::error::{CodecError, OrmError, Result};

/// A record type mapped to one table.
///
/// Implemented by `#[derive(Model)]`; the generated code is the field table
/// that reflection would provide in other languages.
pub trait Model: Resolve + Default + Send + Sync + 'static {
    /// Static description of the table and its fields.
    fn model_def() -> ModelDef;

    /// Bindable value of the field at `field` (its `FieldDescriptor::index`).
    ///
    /// # Errors
    /// Returns `CodecError::Encode` if a JSON column fails to serialize.
    fn column_value(&self, field: usize) -> Result<Value, CodecError>;

    /// Fill the field at `field` from `column` of `row`.
    ///
    /// Dynamic columns are left raw here; the whole record is resolved once
    /// every column is loaded.
    ///
    /// # Errors
    /// Returns `OrmError::Db` if the column is missing or has the wrong type,
    /// `OrmError::Codec` if a JSON column does not decode.
    fn load_column(&mut self, field: usize, row: &QueryResult, column: &str) -> Result<()>;

    /// The capability that supplies concrete types for dynamic columns.
    fn dynamic_fielder(&self) -> Option<&dyn DynamicFielder> {
        None
    }

    /// Shard suffix carried by the record itself.
    fn table_suffix(&self) -> Option<String> {
        None
    }
}

/// Table description emitted by `#[derive(Model)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDef {
    pub table: &'static str,
    pub sharded: bool,
    /// The type implements `DynamicFielder`.
    pub fielder: bool,
    pub fields: Vec<FieldDef>,
}

/// Registered metadata of one model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    full_name: &'static str,
    table: &'static str,
    sharded: bool,
    fields: Vec<FieldDescriptor>,
    pk: Option<usize>,
}

impl ModelDescriptor {
    /// Derive and validate the descriptor of `T`.
    ///
    /// # Panics
    /// Panics on a broken model definition: a dynamic field that is not the
    /// `Dynamic` placeholder, a dynamic field on a type without fielder
    /// capability, a JSON field declared as `Box<_>`, more than one primary
    /// key, or two fields sharing a column.
    #[must_use]
    pub fn build<T: Model>() -> Self {
        Self::from_def(type_name::<T>(), T::model_def())
    }

    pub(crate) fn from_def(full_name: &'static str, def: ModelDef) -> Self {
        let mut fields = Vec::with_capacity(def.fields.len());
        let mut columns = HashSet::new();
        let mut pk = None;

        for (index, field) in def.fields.into_iter().enumerate() {
            let field_name = format!("{full_name}.{}", field.name);

            if field.flags.dynamic {
                assert!(
                    field.placeholder,
                    "field `{field_name}` is dynamic but its type is not `Dynamic`"
                );
                assert!(
                    def.fielder,
                    "field `{field_name}` is dynamic but `{full_name}` does not implement \
                     DynamicFielder (add #[orm(fielder)])"
                );
            } else if field.flags.json {
                assert!(
                    !field.indirect,
                    "json field `{field_name}` must be declared by value, not as `Box<_>`"
                );
            }

            if field.flags.pk {
                assert!(
                    pk.is_none(),
                    "model `{full_name}` declares more than one primary key"
                );
                pk = Some(index);
            }

            assert!(
                columns.insert(field.column),
                "column `{}` of `{full_name}` is mapped by more than one field",
                field.column
            );

            fields.push(FieldDescriptor {
                index,
                name: field.name,
                full_name: field_name,
                column: field.column,
                flags: field.flags,
            });
        }

        Self {
            full_name,
            table: def.table,
            sharded: def.sharded,
            fields,
            pk,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Base table name, before any shard suffix.
    #[must_use]
    pub fn table(&self) -> &'static str {
        self.table
    }

    #[must_use]
    pub fn is_sharded(&self) -> bool {
        self.sharded
    }

    /// Mapped fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn pk(&self) -> Option<&FieldDescriptor> {
        self.pk.map(|idx| &self.fields[idx])
    }

    #[must_use]
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.column).collect()
    }

    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.answers_to(name))
    }

    /// Look up a field by field or column name.
    ///
    /// # Panics
    /// Panics if the model has no such field.
    #[must_use]
    pub fn field(&self, name: &str) -> &FieldDescriptor {
        match self.find_field(name) {
            Some(field) => field,
            None => panic!("model `{}` has no field `{name}`", self.full_name),
        }
    }

    /// # Panics
    /// Panics if any name is unknown.
    #[must_use]
    pub fn fields_for<S: AsRef<str>>(&self, names: &[S]) -> Vec<&FieldDescriptor> {
        names.iter().map(|name| self.field(name.as_ref())).collect()
    }

    /// Physical table name for `suffix`.
    ///
    /// # Errors
    /// Returns `OrmError::MissingTableSuffix` for a sharded model without a
    /// (non-empty) suffix.
    pub fn table_name(&self, suffix: Option<&str>) -> Result<String> {
        match suffix.filter(|s| !s.is_empty()) {
            Some(suffix) => Ok(format!("{}_{suffix}", self.table)),
            None if self.sharded => Err(OrmError::MissingTableSuffix {
                table: self.table.to_owned(),
            }),
            None => Ok(self.table.to_owned()),
        }
    }

    /// Physical table of a record, using its own shard suffix.
    ///
    /// # Errors
    /// Returns `OrmError::MissingTableSuffix` as [`Self::table_name`].
    pub fn table_of<T: Model>(&self, record: &T) -> Result<String> {
        self.table_name(record.table_suffix().as_deref())
    }
}
