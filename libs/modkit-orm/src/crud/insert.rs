use sea_orm::sea_query::{Alias, InsertStatement, Query, SimpleExpr};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, QueryResult};

use super::Executor;
use crate::error::{OrmError, Result};
use crate::meta::{FieldDescriptor, Model, ModelDescriptor};

impl ModelDescriptor {
    /// Fields written by inserts: everything except `auto` columns.
    fn insert_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields().iter().filter(|f| !f.flags.auto).collect()
    }

    fn insert_into(table: String, fields: &[&FieldDescriptor]) -> InsertStatement {
        let mut stmt = Query::insert();
        stmt.into_table(Alias::new(table))
            .columns(fields.iter().map(|f| Alias::new(f.column)));
        stmt
    }

    fn row_values<T: Model>(record: &T, fields: &[&FieldDescriptor]) -> Result<Vec<SimpleExpr>> {
        fields
            .iter()
            .map(|f| Ok(SimpleExpr::Value(record.column_value(f.index)?)))
            .collect()
    }

    fn chunk_statement<T: Model>(
        table: &str,
        fields: &[&FieldDescriptor],
        chunk: &[T],
    ) -> Result<InsertStatement> {
        let mut stmt = Self::insert_into(table.to_owned(), fields);
        for record in chunk {
            stmt.values(Self::row_values(record, fields)?)
                .map_err(|err| OrmError::Build(err.to_string()))?;
        }
        Ok(stmt)
    }

    /// Insert one record and return its generated id.
    ///
    /// `auto` columns are never written, even when the record carries a
    /// non-default value for them; the database generates them.
    ///
    /// On PostgreSQL the id of an `auto` primary key is read back with
    /// `RETURNING` (0 without one); other backends report the driver's last
    /// insert id.
    ///
    /// # Errors
    /// Returns `OrmError::MissingTableSuffix` for a sharded model whose record
    /// carries no suffix, `OrmError::Codec` if a JSON column fails to encode,
    /// and storage errors from the executor.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's model.
    pub async fn insert<T: Model, C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        record: &T,
    ) -> Result<u64> {
        self.check_type::<T>();
        let table = self.table_of(record)?;
        let fields = self.insert_fields();

        let mut stmt = Self::insert_into(table, &fields);
        if fields.is_empty() {
            stmt.or_default_values();
        } else {
            stmt.values(Self::row_values(record, &fields)?)
                .map_err(|err| OrmError::Build(err.to_string()))?;
        }

        let backend = exec.backend();
        let returning = self
            .pk()
            .filter(|pk| pk.flags.auto && backend == DbBackend::Postgres);
        if let Some(pk) = returning {
            stmt.returning_col(Alias::new(pk.column));
            let row = exec
                .query_one("insert", exec.build(&stmt, false))
                .await?
                .ok_or(OrmError::NotFound)?;
            return generated_id(&row, pk.column);
        }

        let result = exec.execute("insert", exec.build(&stmt, false)).await?;
        if backend == DbBackend::Postgres {
            return Ok(0);
        }
        Ok(result.last_insert_id())
    }

    /// Insert `records` with one multi-row statement per `bulk` records and
    /// return the summed affected-row count. A `bulk` of 0 is treated as 1.
    ///
    /// `auto` columns are left out as in [`ModelDescriptor::insert`].
    ///
    /// Chunks are not atomic as a whole: when one fails, earlier chunks stay
    /// written and the error reports how many rows they inserted.
    ///
    /// # Errors
    /// Returns `OrmError::MissingTableSuffix` for a sharded model without
    /// `suffix`, and `OrmError::PartialInsert` wrapping the first chunk error.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's model.
    pub async fn insert_multi<T: Model, C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        records: &[T],
        bulk: usize,
        suffix: Option<&str>,
    ) -> Result<u64> {
        self.check_type::<T>();
        let table = self.table_name(suffix)?;
        let fields = self.insert_fields();

        let mut inserted = 0;
        for (chunk_idx, chunk) in records.chunks(bulk.max(1)).enumerate() {
            let outcome = match Self::chunk_statement(&table, &fields, chunk) {
                Ok(stmt) => exec.execute("insert_multi", exec.build(&stmt, false)).await,
                Err(err) => Err(err),
            };

            match outcome {
                Ok(result) => inserted += result.rows_affected(),
                Err(source) => {
                    tracing::debug!(
                        table = %table,
                        chunk = chunk_idx + 1,
                        inserted,
                        error = %source,
                        "multi-row insert stopped"
                    );
                    return Err(OrmError::PartialInsert {
                        inserted,
                        source: Box::new(source),
                    });
                }
            }
        }
        Ok(inserted)
    }
}

/// Generated key from a `RETURNING` row. `SERIAL` keys come back as `INT4`,
/// `BIGSERIAL` ones as `INT8`.
fn generated_id(row: &QueryResult, column: &str) -> Result<u64> {
    let id = match row.try_get::<i64>("", column) {
        Ok(id) => id,
        Err(_) => i64::from(row.try_get::<i32>("", column)?),
    };
    u64::try_from(id).map_err(|_| OrmError::Db(DbErr::Type(format!("negative generated id {id}"))))
}
