use sea_orm::DbErr;

/// Longest excerpt of a broken JSON document kept in a decode error.
const FRAGMENT_EXCERPT: usize = 64;

/// Errors raised while converting a value to or from its JSON column text.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("json encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored text is not a valid document for the destination type.
    #[error("json decode failed for `{fragment}`: {source}")]
    Decode {
        fragment: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    pub(crate) fn decode(text: &str, source: serde_json::Error) -> Self {
        let fragment = match text.char_indices().nth(FRAGMENT_EXCERPT) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_owned(),
        };
        Self::Decode { fragment, source }
    }
}

/// Errors returned by CRUD operations.
///
/// Malformed calls (unknown field names, no columns to update, a non-empty
/// batch destination) and broken model definitions are not represented here;
/// they panic at the call site because only a code change can fix them.
#[derive(thiserror::Error, Debug)]
pub enum OrmError {
    /// The statement matched no row.
    #[error("no row found")]
    NotFound,

    /// A row-keyed operation was called on a record whose primary key is unset.
    #[error("primary key is not set")]
    MissingPrimaryKey,

    #[error("table `{table}` is sharded and requires a table suffix")]
    MissingTableSuffix { table: String },

    #[error("operation cancelled")]
    Cancelled,

    /// A chunk of a multi-row insert failed; earlier chunks stay applied.
    #[error("batch insert stopped after {inserted} rows: {source}")]
    PartialInsert {
        inserted: u64,
        #[source]
        source: Box<OrmError>,
    },

    #[error("statement build failed: {0}")]
    Build(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("database error: {0}")]
    Db(#[source] DbErr),

    #[error("invalid orm configuration: {0}")]
    Config(#[source] Box<figment::Error>),
}

impl From<DbErr> for OrmError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(_) => Self::NotFound,
            other => Self::Db(other),
        }
    }
}

impl From<figment::Error> for OrmError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl OrmError {
    /// Rows written before the failure, for [`OrmError::PartialInsert`].
    #[must_use]
    pub fn inserted(&self) -> Option<u64> {
        match self {
            Self::PartialInsert { inserted, .. } => Some(*inserted),
            _ => None,
        }
    }
}

pub type Result<T, E = OrmError> = std::result::Result<T, E>;
