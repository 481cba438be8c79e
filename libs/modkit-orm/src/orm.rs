//! Typed entry point over the descriptor-level operations.
//!
//! [`Orm`] binds an [`Executor`] to the configured bulk size and looks model
//! descriptors up in the process-wide registry, so callers work with their
//! record types directly:
//!
//! ```rust,ignore
//! let orm = Orm::new(&db);
//! let id = orm.insert(&user).await?;
//! let active: Vec<User> = orm
//!     .query::<User>()
//!     .filter("status__in", ["active", "pending"])
//!     .order_by(["-created_at"])
//!     .limit(20)
//!     .all()
//!     .await?;
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::ConnectionTrait;
use sea_orm::sea_query::Value;
use tokio_util::sync::CancellationToken;

use crate::config::{DEFAULT_BULK, OrmConfig};
use crate::crud::{Executor, ReadOptions};
use crate::error::Result;
use crate::meta::{Model, ModelDescriptor, descriptor_of};
use crate::query::{Condition, Params, QuerySetter};

/// Caller's connection plus the per-call defaults.
pub struct Orm<'c, C: ConnectionTrait> {
    exec: Executor<'c, C>,
    default_bulk: usize,
}

impl<'c, C: ConnectionTrait> Orm<'c, C> {
    #[must_use]
    pub fn new(db: &'c C) -> Self {
        Self {
            exec: Executor::new(db),
            default_bulk: DEFAULT_BULK,
        }
    }

    /// Build from a loaded [`OrmConfig`]; the config is not applied globally.
    #[must_use]
    pub fn with_config(db: &'c C, config: &OrmConfig) -> Self {
        Self {
            exec: Executor::new(db),
            default_bulk: config.default_bulk.max(1),
        }
    }

    /// Race every statement against `cancel`.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.exec = Executor::with_cancel(self.exec.db(), cancel);
        self
    }

    #[must_use]
    pub fn executor(&self) -> &Executor<'c, C> {
        &self.exec
    }

    #[must_use]
    pub fn default_bulk(&self) -> usize {
        self.default_bulk
    }

    /// # Errors
    /// See [`ModelDescriptor::insert`].
    pub async fn insert<T: Model>(&self, record: &T) -> Result<u64> {
        descriptor_of::<T>().insert(&self.exec, record).await
    }

    /// Multi-row insert with the configured bulk size.
    ///
    /// # Errors
    /// See [`ModelDescriptor::insert_multi`].
    pub async fn insert_multi<T: Model>(&self, records: &[T], suffix: Option<&str>) -> Result<u64> {
        self.insert_multi_with_bulk(records, self.default_bulk, suffix)
            .await
    }

    /// # Errors
    /// See [`ModelDescriptor::insert_multi`].
    pub async fn insert_multi_with_bulk<T: Model>(
        &self,
        records: &[T],
        bulk: usize,
        suffix: Option<&str>,
    ) -> Result<u64> {
        descriptor_of::<T>()
            .insert_multi(&self.exec, records, bulk, suffix)
            .await
    }

    /// Load `record` by primary key.
    ///
    /// # Errors
    /// See [`ModelDescriptor::read`].
    pub async fn read<T: Model>(&self, record: &mut T) -> Result<()> {
        self.read_with(record, &ReadOptions::default()).await
    }

    /// # Errors
    /// See [`ModelDescriptor::read`].
    pub async fn read_with<T: Model>(&self, record: &mut T, options: &ReadOptions<'_>) -> Result<()> {
        descriptor_of::<T>().read(&self.exec, record, options).await
    }

    /// # Errors
    /// See [`ModelDescriptor::update`].
    pub async fn update<T: Model>(&self, record: &T, set_fields: &[&str]) -> Result<u64> {
        descriptor_of::<T>()
            .update(&self.exec, record, set_fields)
            .await
    }

    /// # Errors
    /// See [`ModelDescriptor::delete`].
    pub async fn delete<T: Model>(&self, record: &T, where_fields: &[&str]) -> Result<u64> {
        descriptor_of::<T>()
            .delete(&self.exec, record, where_fields)
            .await
    }

    /// Start a condition-driven query over `T`'s table.
    pub fn query<T: Model>(&self) -> QuerySet<'c, C, T> {
        QuerySet {
            exec: self.exec.clone(),
            desc: descriptor_of::<T>(),
            cond: Condition::new(),
            setter: QuerySetter::new(),
            _model: PhantomData,
        }
    }
}

/// Accumulated condition and query shape for one model type.
///
/// Field names are validated when the statement is built: an unknown name
/// panics at the terminal call.
#[must_use]
pub struct QuerySet<'c, C: ConnectionTrait, T> {
    exec: Executor<'c, C>,
    desc: Arc<ModelDescriptor>,
    cond: Condition,
    setter: QuerySetter,
    _model: PhantomData<fn() -> T>,
}

impl<C: ConnectionTrait, T: Model> QuerySet<'_, C, T> {
    /// AND `expr` (`field` or `field__op`) with `value`.
    pub fn filter(mut self, expr: &str, value: impl Into<Value>) -> Self {
        self.cond = self.cond.and(expr, value);
        self
    }

    /// AND NOT `expr` with `value`.
    pub fn exclude(mut self, expr: &str, value: impl Into<Value>) -> Self {
        self.cond = self.cond.and_not(expr, value);
        self
    }

    pub fn filter_in<V: Into<Value>>(mut self, expr: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.cond = self.cond.and_in(expr, values);
        self
    }

    /// Replace the accumulated condition.
    pub fn set_cond(mut self, cond: Condition) -> Self {
        self.cond = cond;
        self
    }

    /// Load only these fields in `one` and `all`; the rest keep their
    /// defaults.
    pub fn select<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.setter = self.setter.select(fields);
        self
    }

    /// Order by field names; a leading `-` sorts descending.
    pub fn order_by<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.setter = self.setter.order_by(fields);
        self
    }

    pub fn group_by<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.setter = self.setter.group_by(fields);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.setter = self.setter.limit(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.setter = self.setter.offset(offset);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.setter = self.setter.distinct();
        self
    }

    pub fn for_update(mut self) -> Self {
        self.setter = self.setter.for_update();
        self
    }

    pub fn force_master(mut self) -> Self {
        self.setter = self.setter.force_master();
        self
    }

    /// Target the `{table}_{suffix}` shard.
    pub fn table_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.setter = self.setter.table_suffix(suffix);
        self
    }

    /// First matching record.
    ///
    /// # Errors
    /// Returns `OrmError::NotFound` when nothing matches; see
    /// [`ModelDescriptor::read_one`].
    pub async fn one(&self) -> Result<T> {
        let mut record = T::default();
        self.desc
            .read_one(&self.exec, &self.setter, &self.cond, &mut record)
            .await?;
        Ok(record)
    }

    /// # Errors
    /// See [`ModelDescriptor::read_batch`].
    pub async fn all(&self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        self.desc
            .read_batch(&self.exec, &self.setter, &self.cond, &mut records)
            .await?;
        Ok(records)
    }

    /// # Errors
    /// See [`ModelDescriptor::count`].
    pub async fn count(&self) -> Result<u64> {
        self.desc.count(&self.exec, &self.setter, &self.cond).await
    }

    /// # Errors
    /// See [`ModelDescriptor::update_batch`].
    pub async fn update(&self, params: &Params) -> Result<u64> {
        self.desc
            .update_batch(&self.exec, &self.setter, &self.cond, params)
            .await
    }

    /// # Errors
    /// See [`ModelDescriptor::delete_batch`].
    pub async fn delete(&self) -> Result<u64> {
        self.desc
            .delete_batch(&self.exec, &self.setter, &self.cond)
            .await
    }
}
