use std::future::Future;

use sea_orm::{
    ConnectionTrait, DbBackend, DbErr, ExecResult, QueryResult, Statement, StatementBuilder,
};
use tokio_util::sync::CancellationToken;

use crate::config;
use crate::error::{OrmError, Result};

/// Routing hint prefixed to statements that must reach the primary database.
pub const HINT_ROUTER_MASTER: &str = r#"{"router":"m"} "#;

const SQL_TARGET: &str = "modkit_orm::sqlbuilder";

/// Caller-supplied connection (or transaction) plus the cancellation token
/// every statement is raced against.
pub struct Executor<'c, C: ConnectionTrait> {
    db: &'c C,
    cancel: CancellationToken,
}

impl<C: ConnectionTrait> Clone for Executor<'_, C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db,
            cancel: self.cancel.clone(),
        }
    }
}

impl<'c, C: ConnectionTrait> Executor<'c, C> {
    #[must_use]
    pub fn new(db: &'c C) -> Self {
        Self::with_cancel(db, CancellationToken::new())
    }

    #[must_use]
    pub fn with_cancel(db: &'c C, cancel: CancellationToken) -> Self {
        Self { db, cancel }
    }

    #[must_use]
    pub fn db(&self) -> &'c C {
        self.db
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    /// Render `stmt` for the connection's backend.
    pub(crate) fn build<S: StatementBuilder>(&self, stmt: &S, force_master: bool) -> Statement {
        let mut statement = self.backend().build(stmt);
        if force_master {
            statement.sql = format!("{HINT_ROUTER_MASTER}{}", statement.sql);
        }
        statement
    }

    pub(crate) async fn execute(&self, op: &'static str, stmt: Statement) -> Result<ExecResult> {
        log_statement(op, &stmt);
        self.guarded(self.db.execute(stmt)).await
    }

    pub(crate) async fn query_one(
        &self,
        op: &'static str,
        stmt: Statement,
    ) -> Result<Option<QueryResult>> {
        log_statement(op, &stmt);
        self.guarded(self.db.query_one(stmt)).await
    }

    pub(crate) async fn query_all(&self, op: &'static str, stmt: Statement) -> Result<Vec<QueryResult>> {
        log_statement(op, &stmt);
        self.guarded(self.db.query_all(stmt)).await
    }

    async fn guarded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(OrmError::Cancelled),
            res = fut => res.map_err(OrmError::from),
        }
    }
}

fn log_statement(op: &'static str, stmt: &Statement) {
    if config::debug_sql() {
        tracing::debug!(
            target: SQL_TARGET,
            op,
            query = %stmt.sql,
            args = ?stmt.values,
            "sqlbuilder"
        );
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::unwrap_used)]
mod tests {
    use sea_orm::sea_query::{Alias, Query};
    use sea_orm::{MockDatabase, MockExecResult};
    use tracing_test::traced_test;

    use super::*;

    /// Turns statement logging on until dropped.
    struct DebugSql;

    impl DebugSql {
        fn enable() -> Self {
            config::set_debug_sql(true);
            Self
        }
    }

    impl Drop for DebugSql {
        fn drop(&mut self) {
            config::set_debug_sql(false);
        }
    }

    fn delete_stmt() -> sea_orm::sea_query::DeleteStatement {
        Query::delete().from_table(Alias::new("t")).to_owned()
    }

    #[test]
    fn master_hint_is_prefixed_only_when_forced() {
        let db = MockDatabase::new(DbBackend::MySql).into_connection();
        let exec = Executor::new(&db);

        let plain = exec.build(&delete_stmt(), false);
        assert!(plain.sql.starts_with("DELETE"));

        let forced = exec.build(&delete_stmt(), true);
        assert_eq!(forced.sql, format!("{HINT_ROUTER_MASTER}{}", plain.sql));
    }

    #[tokio::test]
    #[traced_test]
    async fn statements_are_logged_when_enabled() {
        let _debug = DebugSql::enable();
        let db = MockDatabase::new(DbBackend::MySql)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();
        let exec = Executor::new(&db);

        let result = exec
            .execute("delete_batch", exec.build(&delete_stmt(), true))
            .await
            .unwrap();
        assert_eq!(result.rows_affected(), 3);
        assert!(logs_contain("sqlbuilder"));
        assert!(logs_contain(r#"{"router":"m"} DELETE FROM"#));
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_the_statement_runs() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let cancel = CancellationToken::new();
        cancel.cancel();

        {
            let exec = Executor::with_cancel(&db, cancel);
            let err = exec
                .execute("delete", exec.build(&delete_stmt(), false))
                .await
                .unwrap_err();
            assert!(matches!(err, OrmError::Cancelled));
        }
        assert!(db.into_transaction_log().is_empty());
    }
}
