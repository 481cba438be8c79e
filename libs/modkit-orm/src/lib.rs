#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `ModKit` ORM crate.
//!
//! Maps plain Rust structs onto SQL tables and builds CRUD statements for
//! them on top of `SeaORM`'s connection layer. Field metadata is generated by
//! `#[derive(Model)]` and cached per type in a process-wide registry.
//!
//! # Features
//! - `pg`, `mysql`, `sqlite`: enable the matching `SeaORM` drivers
//!
//! # Highlights
//! - JSON columns with omit-empty encoding (`#[orm(json, omit_empty)]`)
//! - Polymorphic JSON values ([`Dynamic`]) whose type is picked by a sibling
//!   discriminator field through a [`DynamicFielder`]
//! - Sharded tables addressed by a per-record or per-query suffix
//! - Chunked multi-row inserts reporting partial progress
//! - Field-expression conditions (`age__gte`, `name__contains`) and
//!   column-arithmetic batch updates
//!
//! # Example
//! ```rust,ignore
//! use modkit_orm::{Condition, Model, Orm, Params, Resolve};
//!
//! #[derive(Debug, Default, Clone, Model)]
//! #[orm(table = "user")]
//! struct User {
//!     #[orm(pk, auto)]
//!     id: i64,
//!     name: String,
//!     score: i64,
//! }
//!
//! async fn demo(db: &sea_orm::DatabaseConnection) -> modkit_orm::Result<()> {
//!     let orm = Orm::new(db);
//!     let id = orm.insert(&User { name: "ann".into(), ..Default::default() }).await?;
//!
//!     let mut user = User { id: i64::try_from(id).unwrap_or_default(), ..Default::default() };
//!     orm.read(&mut user).await?;
//!
//!     orm.query::<User>()
//!         .filter("name__startswith", "a")
//!         .update(&Params::new().col("score", modkit_orm::ColOp::Add, 10))
//!         .await?;
//!     Ok(())
//! }
//! ```

// Generated code refers to `::modkit_orm` also from inside this crate.
extern crate self as modkit_orm;

pub mod codec;
pub mod config;
pub mod crud;
pub mod dynamic;
pub mod error;
pub mod meta;
pub mod orm;
pub mod query;

pub use modkit_orm_macros::{Model, Resolve};

pub use config::OrmConfig;
pub use crud::{Executor, HINT_ROUTER_MASTER, ReadOptions};
pub use dynamic::{Dynamic, DynamicContent, DynamicFielder, Resolve};
pub use error::{CodecError, OrmError, Result};
pub use meta::{Model, ModelDescriptor, descriptor_of, registry, reset_model_cache};
pub use orm::{Orm, QuerySet};
pub use query::{ColOp, ColValue, Condition, Params, QuerySetter};

pub use sea_orm::QueryResult;
pub use sea_orm::sea_query;
