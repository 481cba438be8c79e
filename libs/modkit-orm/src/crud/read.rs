use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Alias, Expr, LockType, Order, Query, SelectStatement};

use super::Executor;
use crate::error::{OrmError, Result};
use crate::meta::{FieldDescriptor, Model, ModelDescriptor};
use crate::query::{Condition, QuerySetter, order_token};

/// Options of a single-row [`ModelDescriptor::read`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions<'a> {
    /// Match on these fields instead of the primary key.
    pub where_fields: &'a [&'a str],
    pub for_update: bool,
    pub force_master: bool,
}

impl<'a> ReadOptions<'a> {
    #[must_use]
    pub fn by(where_fields: &'a [&'a str]) -> Self {
        Self {
            where_fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    #[must_use]
    pub fn force_master(mut self) -> Self {
        self.force_master = true;
        self
    }
}

impl ModelDescriptor {
    fn select_from(table: String, fields: &[&FieldDescriptor]) -> SelectStatement {
        let mut select = Query::select();
        select
            .columns(fields.iter().map(|f| Alias::new(f.column)))
            .from(Alias::new(table));
        select
    }

    /// Fields loaded by a condition-driven read: `qs.select`, or all of them.
    ///
    /// # Panics
    /// Panics on an unknown selected field name.
    fn projection(&self, qs: &QuerySetter) -> Vec<&FieldDescriptor> {
        if qs.select.is_empty() {
            self.fields().iter().collect()
        } else {
            self.fields_for(qs.select.as_slice())
        }
    }

    /// Select statement for a condition-driven read of `fields`.
    ///
    /// # Panics
    /// Panics on unknown field names in `cond` or in the order/group lists.
    fn select_for(
        &self,
        qs: &QuerySetter,
        cond: &Condition,
        fields: &[&FieldDescriptor],
    ) -> Result<SelectStatement> {
        let table = self.table_name(qs.suffix())?;
        let mut select = Self::select_from(table, fields);

        if qs.distinct {
            select.distinct();
        }
        if !cond.is_empty() {
            select.cond_where(cond.to_condition(self));
        }
        for token in &qs.orders {
            let (name, desc) = order_token(token);
            let order = if desc { Order::Desc } else { Order::Asc };
            select.order_by(Alias::new(self.field(name).column), order);
        }
        for name in &qs.groups {
            select.group_by_col(Alias::new(self.field(name).column));
        }
        if let Some(limit) = qs.limit {
            select.limit(limit);
        }
        if let Some(offset) = qs.offset {
            select.offset(offset);
        }
        if qs.for_update {
            select.lock(LockType::Update);
        }
        Ok(select)
    }

    /// Load `record` by its primary key, or by `options.where_fields`.
    ///
    /// Skipped (`#[orm(skip)]`) fields keep their values.
    ///
    /// # Errors
    /// Returns `OrmError::MissingPrimaryKey` when keyed by an unset primary
    /// key, `OrmError::NotFound` when no row matches, and storage or codec
    /// errors otherwise.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's model or a where field is unknown.
    pub async fn read<T: Model, C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        record: &mut T,
        options: &ReadOptions<'_>,
    ) -> Result<()> {
        self.check_type::<T>();
        let cond = self.key_condition(record, options.where_fields)?;
        let table = self.table_of(record)?;

        let fields: Vec<_> = self.fields().iter().collect();
        let mut select = Self::select_from(table, &fields);
        select.cond_where(cond);
        if options.for_update {
            select.lock(LockType::Update);
        }

        let row = exec
            .query_one("read", exec.build(&select, options.force_master))
            .await?
            .ok_or(OrmError::NotFound)?;
        Self::load_into(record, &row, &fields)
    }

    /// Load the first row matching `cond` into `dest`.
    ///
    /// Only the fields named in `qs.select` are loaded when it is non-empty;
    /// the others keep their defaults.
    ///
    /// A miss is not an empty result: it is reported as
    /// `OrmError::NotFound`.
    ///
    /// # Errors
    /// Returns `OrmError::NotFound` (leaving `dest` untouched) when no row
    /// matches, `OrmError::MissingTableSuffix` for a sharded model without a
    /// suffix in `qs`, and storage or codec errors otherwise.
    ///
    /// # Panics
    /// Panics if `T` is not this descriptor's model or a field name is unknown.
    pub async fn read_one<T: Model, C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        qs: &QuerySetter,
        cond: &Condition,
        dest: &mut T,
    ) -> Result<()> {
        self.check_type::<T>();
        let fields = self.projection(qs);
        let select = self.select_for(qs, cond, &fields)?;
        let row = exec
            .query_one("read_one", exec.build(&select, qs.force_master))
            .await?
            .ok_or(OrmError::NotFound)?;

        let mut record = T::default();
        Self::load_into(&mut record, &row, &fields)?;
        *dest = record;
        Ok(())
    }

    /// Load every row matching `cond` into the empty `dest`.
    ///
    /// `dest` is assigned only once all rows decoded. `qs.select` narrows
    /// the loaded fields as in [`ModelDescriptor::read_one`].
    ///
    /// # Errors
    /// Returns `OrmError::MissingTableSuffix` for a sharded model without a
    /// suffix in `qs`, and storage or codec errors otherwise.
    ///
    /// # Panics
    /// Panics if `dest` is not empty, if `T` is not this descriptor's model,
    /// or if a field name is unknown.
    pub async fn read_batch<T: Model, C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        qs: &QuerySetter,
        cond: &Condition,
        dest: &mut Vec<T>,
    ) -> Result<()> {
        self.check_type::<T>();
        assert!(
            dest.is_empty(),
            "read_batch needs an empty destination, got {} rows of `{}`",
            dest.len(),
            self.full_name()
        );

        let fields = self.projection(qs);
        let select = self.select_for(qs, cond, &fields)?;
        let rows = exec
            .query_all("read_batch", exec.build(&select, qs.force_master))
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = T::default();
            Self::load_into(&mut record, row, &fields)?;
            records.push(record);
        }
        *dest = records;
        Ok(())
    }

    /// Number of rows matching `cond`.
    ///
    /// # Errors
    /// Returns `OrmError::MissingTableSuffix` for a sharded model without a
    /// suffix in `qs`, and storage errors otherwise.
    ///
    /// # Panics
    /// Panics if a field name in `cond` is unknown.
    pub async fn count<C: ConnectionTrait>(
        &self,
        exec: &Executor<'_, C>,
        qs: &QuerySetter,
        cond: &Condition,
    ) -> Result<u64> {
        let table = self.table_name(qs.suffix())?;
        let mut select = Query::select();
        select
            .expr_as(Expr::cust("COUNT(1)"), Alias::new("count"))
            .from(Alias::new(table));
        if !cond.is_empty() {
            select.cond_where(cond.to_condition(self));
        }

        let row = exec
            .query_one("count", exec.build(&select, qs.force_master))
            .await?
            .ok_or(OrmError::NotFound)?;
        let count: i64 = row.try_get("", "count")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
