use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Alias, Query};

use super::Executor;
use crate::error::Result;
use crate::meta::{Model, ModelDescriptor};
use crate::query::{Condition, QuerySetter};

impl ModelDescriptor {
    /// Delete the row of `record`, matched on `where_fields` or, when empty,
    /// on the primary key. Returns the affected-row count.
    ///
    /// # Errors
    /// Returns `OrmError::MissingPrimaryKey` for a keyless delete of a record
    /// whose primary key is unset (no statement is executed),
    /// `OrmError::MissingTableSuffix` for a sharded record without suffix, and
    /// storage errors otherwise.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's model or a where field is unknown.
    pub async fn delete<T: Model, C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        record: &T,
        where_fields: &[&str],
    ) -> Result<u64> {
        self.check_type::<T>();
        let cond = self.key_condition(record, where_fields)?;
        let table = self.table_of(record)?;

        let mut stmt = Query::delete();
        stmt.from_table(Alias::new(table)).cond_where(cond);

        let result = exec.execute("delete", exec.build(&stmt, false)).await?;
        Ok(result.rows_affected())
    }

    /// Delete every row matching `cond`; an empty condition deletes all rows
    /// of the table. Returns the affected-row count.
    ///
    /// # Errors
    /// Returns `OrmError::MissingTableSuffix` for a sharded model without a
    /// suffix in `qs`, and storage errors otherwise.
    ///
    /// # Panics
    /// Panics if `cond` names an unknown field.
    pub async fn delete_batch<C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        qs: &QuerySetter,
        cond: &Condition,
    ) -> Result<u64> {
        let table = self.table_name(qs.suffix())?;
        let mut stmt = Query::delete();
        stmt.from_table(Alias::new(table));
        if !cond.is_empty() {
            stmt.cond_where(cond.to_condition(self));
        }

        let result = exec
            .execute("delete_batch", exec.build(&stmt, qs.force_master))
            .await?;
        Ok(result.rows_affected())
    }
}
