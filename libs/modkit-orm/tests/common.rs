#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use modkit_orm::{Dynamic, DynamicContent, DynamicFielder, Model, Resolve};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};

/// Open a single-connection in-memory `SQLite` database and create the
/// fixture tables.
pub async fn sqlite() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to database");

    db.execute_unprepared(
        "CREATE TABLE user (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            tags TEXT NOT NULL
        );
        CREATE TABLE dynamic_test (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            content TEXT NOT NULL
        );
        CREATE TABLE document (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            envelope TEXT NOT NULL
        );
        CREATE TABLE nest (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            content TEXT NOT NULL
        );
        CREATE TABLE log_20240101 (
            id INTEGER PRIMARY KEY,
            msg TEXT NOT NULL
        );
        CREATE TABLE log_20240102 (
            id INTEGER PRIMARY KEY,
            msg TEXT NOT NULL
        );",
    )
    .await
    .expect("Failed to create tables");
    db
}

#[derive(Debug, Default, Clone, PartialEq, Model)]
#[orm(table = "user")]
pub struct User {
    #[orm(pk, auto)]
    pub id: i64,
    pub name: String,
    pub age: i64,
    #[orm(json, omit_empty)]
    pub tags: Vec<String>,
}

impl User {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            name: name.to_owned(),
            age,
            ..Self::default()
        }
    }
}

pub fn users(count: i64) -> Vec<User> {
    (0..count).map(|i| User::new(&format!("user-{i}"), 20 + i)).collect()
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Resolve)]
pub struct AContent {
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Resolve)]
pub struct BContent {
    pub labels: Vec<String>,
    pub active: bool,
}

fn content_for(kind: &str) -> Option<Box<dyn DynamicContent>> {
    match kind {
        "A" => Some(Box::new(AContent::default())),
        "B" => Some(Box::new(BContent::default())),
        _ => None,
    }
}

/// Row whose `content` column type is chosen by `kind`.
#[derive(Debug, Default, Clone, Model)]
#[orm(table = "dynamic_test", fielder)]
pub struct Event {
    #[orm(pk, auto)]
    pub id: i64,
    #[orm(column = "type")]
    pub kind: String,
    #[orm(dynamic, omit_empty)]
    pub content: Dynamic,
}

impl DynamicFielder for Event {
    fn new_dynamic_field(&self, field: &str) -> Option<Box<dyn DynamicContent>> {
        match field {
            "content" => content_for(&self.kind),
            _ => None,
        }
    }
}

/// Plain JSON value carrying its own discriminator.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Resolve)]
#[resolve(fielder)]
pub struct Envelope {
    pub kind: String,
    #[serde(default)]
    pub body: Dynamic,
}

impl DynamicFielder for Envelope {
    fn new_dynamic_field(&self, field: &str) -> Option<Box<dyn DynamicContent>> {
        match field {
            "body" => content_for(&self.kind),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Model)]
#[orm(table = "document")]
pub struct Document {
    #[orm(pk, auto)]
    pub id: i64,
    pub title: String,
    #[orm(json)]
    pub envelope: Envelope,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Resolve)]
pub struct Leaf {
    pub value: i64,
}

/// Dynamic payload that carries a dynamic field of its own.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Resolve)]
#[resolve(fielder)]
pub struct Inner {
    pub kind: String,
    #[serde(default)]
    pub payload: Dynamic,
}

impl DynamicFielder for Inner {
    fn new_dynamic_field(&self, field: &str) -> Option<Box<dyn DynamicContent>> {
        match (field, self.kind.as_str()) {
            ("payload", "leaf") => Some(Box::new(Leaf::default())),
            _ => None,
        }
    }
}

/// Row whose `content` resolves to [`Inner`], which resolves its own payload.
#[derive(Debug, Default, Clone, Model)]
#[orm(table = "nest", fielder)]
pub struct Nest {
    #[orm(pk, auto)]
    pub id: i64,
    pub kind: String,
    #[orm(dynamic)]
    pub content: Dynamic,
}

impl DynamicFielder for Nest {
    fn new_dynamic_field(&self, field: &str) -> Option<Box<dyn DynamicContent>> {
        match (field, self.kind.as_str()) {
            ("content", "inner") => Some(Box::new(Inner::default())),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Model)]
#[orm(table = "log", sharded)]
pub struct Log {
    #[orm(pk)]
    pub id: i64,
    #[orm(skip, table_suffix)]
    pub day: String,
    pub msg: String,
}
