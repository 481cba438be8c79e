//! Statement building and execution for registered models.
//!
//! Every operation is a method of [`ModelDescriptor`]: the descriptor knows
//! the table and the column list, the record supplies the values through its
//! generated [`Model`] accessors.

mod delete;
mod exec;
mod insert;
mod read;
mod update;

use std::any::type_name;

use sea_orm::QueryResult;
use sea_orm::sea_query::{Alias, Condition, Expr, Value};

use crate::dynamic::resolve;
use crate::error::{OrmError, Result};
use crate::meta::{FieldDescriptor, Model, ModelDescriptor};

pub use exec::{Executor, HINT_ROUTER_MASTER};
pub use read::ReadOptions;

/// Whether a key value identifies a row: non-null and not the zero value.
#[must_use]
pub fn is_key_set(value: &Value) -> bool {
    match value {
        Value::TinyInt(Some(v)) => *v != 0,
        Value::SmallInt(Some(v)) => *v != 0,
        Value::Int(Some(v)) => *v != 0,
        Value::BigInt(Some(v)) => *v != 0,
        Value::TinyUnsigned(Some(v)) => *v != 0,
        Value::SmallUnsigned(Some(v)) => *v != 0,
        Value::Unsigned(Some(v)) => *v != 0,
        Value::BigUnsigned(Some(v)) => *v != 0,
        Value::String(Some(s)) => !s.is_empty(),
        Value::Uuid(Some(u)) => !u.is_nil(),
        other => *other != other.as_null(),
    }
}

impl ModelDescriptor {
    /// # Panics
    /// Panics if `T` is not the type this descriptor was built from.
    fn check_type<T: Model>(&self) {
        assert!(
            type_name::<T>() == self.full_name(),
            "wrong object type `{}`, need `{}`",
            type_name::<T>(),
            self.full_name()
        );
    }

    /// Equality condition on `where_fields`, or on the primary key when none
    /// are given.
    fn key_condition<T: Model>(&self, record: &T, where_fields: &[&str]) -> Result<Condition> {
        if where_fields.is_empty() {
            let pk = self.pk().ok_or(OrmError::MissingPrimaryKey)?;
            let value = record.column_value(pk.index)?;
            if !is_key_set(&value) {
                return Err(OrmError::MissingPrimaryKey);
            }
            return Ok(Condition::all().add(Expr::col(Alias::new(pk.column)).eq(value)));
        }

        let mut cond = Condition::all();
        for field in self.fields_for(where_fields) {
            let value = record.column_value(field.index)?;
            cond = cond.add(Expr::col(Alias::new(field.column)).eq(value));
        }
        Ok(cond)
    }

    /// Load the `fields` columns of `row` into `record`, then resolve its
    /// dynamic slots.
    fn load_into<T: Model>(
        record: &mut T,
        row: &QueryResult,
        fields: &[&FieldDescriptor],
    ) -> Result<()> {
        for field in fields {
            record.load_column(field.index, row, field.column)?;
        }
        resolve(record)?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn key_presence() {
        assert!(is_key_set(&Value::from(7_i64)));
        assert!(is_key_set(&Value::from("a")));
        assert!(is_key_set(&Value::from(uuid::Uuid::from_u128(1))));

        assert!(!is_key_set(&Value::from(0_i64)));
        assert!(!is_key_set(&Value::from(0_u32)));
        assert!(!is_key_set(&Value::from("")));
        assert!(!is_key_set(&Value::from(uuid::Uuid::nil())));
        assert!(!is_key_set(&Value::BigInt(None)));
        assert!(!is_key_set(&Value::String(None)));
    }
}
