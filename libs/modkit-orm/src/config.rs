//! Runtime configuration of the ORM layer.
//!
//! Loading is lenient: a missing `orm` section yields [`OrmConfig::default`],
//! a present but malformed one is an error.

use std::sync::atomic::{AtomicBool, Ordering};

use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration key looked up in the application figment.
pub const CONFIG_KEY: &str = "orm";

/// Rows per multi-row insert statement when not configured.
pub const DEFAULT_BULK: usize = 100;

static DEBUG_SQL: AtomicBool = AtomicBool::new(false);

/// Toggle logging of every built statement and its bound values.
pub fn set_debug_sql(enabled: bool) {
    DEBUG_SQL.store(enabled, Ordering::Relaxed);
}

#[must_use]
pub fn debug_sql() -> bool {
    DEBUG_SQL.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrmConfig {
    /// Emit rendered statements under the `modkit_orm::sqlbuilder` target.
    pub debug_sql: bool,
    /// Rows per statement for multi-row inserts issued through `Orm`.
    pub default_bulk: usize,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            debug_sql: false,
            default_bulk: DEFAULT_BULK,
        }
    }
}

impl OrmConfig {
    /// Read the `orm` section of `figment`.
    ///
    /// # Errors
    /// Returns `OrmError::Config` if the section exists but cannot be deserialized.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let Ok(value) = figment.find_value(CONFIG_KEY) else {
            return Ok(Self::default());
        };
        Ok(value.deserialize::<Self>()?)
    }

    /// Install the process-wide parts of this configuration.
    pub fn apply(&self) {
        set_debug_sql(self.debug_sql);
        tracing::debug!(
            debug_sql = self.debug_sql,
            default_bulk = self.default_bulk,
            "orm configuration applied"
        );
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use figment::providers::Serialized;
    use serde_json::json;

    #[test]
    fn missing_section_falls_back_to_defaults() {
        let figment = Figment::new().merge(Serialized::defaults(json!({ "server": {} })));
        let config = OrmConfig::from_figment(&figment).unwrap();
        assert_eq!(config, OrmConfig::default());
        assert_eq!(config.default_bulk, 100);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let figment =
            Figment::new().merge(Serialized::defaults(json!({ "orm": { "debug_sql": true } })));
        let config = OrmConfig::from_figment(&figment).unwrap();
        assert!(config.debug_sql);
        assert_eq!(config.default_bulk, 100);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let figment =
            Figment::new().merge(Serialized::defaults(json!({ "orm": { "bulk_size": 5 } })));
        assert!(matches!(
            OrmConfig::from_figment(&figment),
            Err(crate::OrmError::Config(_))
        ));
    }
}
