use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Alias, Expr, Query, SimpleExpr};

use super::{Executor, is_key_set};
use crate::error::{OrmError, Result};
use crate::meta::{FieldDescriptor, Model, ModelDescriptor};
use crate::query::{Condition, Params, QuerySetter};

impl ModelDescriptor {
    /// Write `set_fields` of `record` (all non-key fields when empty) to the
    /// row identified by its primary key. Returns the affected-row count.
    ///
    /// # Errors
    /// Returns `OrmError::MissingPrimaryKey` if the primary key is unset (no
    /// statement is executed), `OrmError::MissingTableSuffix` for a sharded
    /// record without suffix, and storage or codec errors otherwise.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's model, a set field is unknown,
    /// or there is no column to update.
    pub async fn update<T: Model, C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        record: &T,
        set_fields: &[&str],
    ) -> Result<u64> {
        self.check_type::<T>();
        let pk = self.pk().ok_or(OrmError::MissingPrimaryKey)?;
        let pk_value = record.column_value(pk.index)?;
        if !is_key_set(&pk_value) {
            return Err(OrmError::MissingPrimaryKey);
        }

        let fields: Vec<&FieldDescriptor> = if set_fields.is_empty() {
            self.fields().iter().filter(|f| !f.flags.pk).collect()
        } else {
            self.fields_for(set_fields)
        };
        assert!(!fields.is_empty(), "no columns to update");

        let table = self.table_of(record)?;
        let mut stmt = Query::update();
        stmt.table(Alias::new(table));
        for field in fields {
            stmt.value(
                Alias::new(field.column),
                SimpleExpr::Value(record.column_value(field.index)?),
            );
        }
        stmt.and_where(Expr::col(Alias::new(pk.column)).eq(pk_value));

        let result = exec.execute("update", exec.build(&stmt, false)).await?;
        Ok(result.rows_affected())
    }

    /// Apply `params` to every row matching `cond`. Returns the affected-row
    /// count.
    ///
    /// # Errors
    /// Returns `OrmError::MissingTableSuffix` for a sharded model without a
    /// suffix in `qs`, and storage errors otherwise.
    ///
    /// # Panics
    /// Panics if `params` is empty or names an unknown field.
    pub async fn update_batch<C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        qs: &QuerySetter,
        cond: &Condition,
        params: &Params,
    ) -> Result<u64> {
        assert!(!params.is_empty(), "no columns to update");
        let table = self.table_name(qs.suffix())?;

        let mut stmt = Query::update();
        stmt.table(Alias::new(table));
        for (name, value) in params.iter() {
            let column = self.field(name).column;
            stmt.value(Alias::new(column), value.assignment(column));
        }
        if !cond.is_empty() {
            stmt.cond_where(cond.to_condition(self));
        }

        let result = exec
            .execute("update_batch", exec.build(&stmt, qs.force_master))
            .await?;
        Ok(result.rows_affected())
    }
}
