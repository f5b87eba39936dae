//! Tagged database connection wrapper.

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    ExecResult, IsolationLevel, QueryResult, Statement, StreamTrait, TransactionError,
    TransactionTrait,
};

use crate::comment;
use crate::config::TagConfig;
use crate::context;

/// A tagging wrapper around SeaORM's `DatabaseConnection`.
///
/// This wrapper implements `ConnectionTrait`, `StreamTrait`, and
/// `TransactionTrait`, making it a drop-in replacement for
/// `DatabaseConnection`. Every statement executed through it is annotated
/// with the ambient query tag (see [`QueryContext`](crate::QueryContext))
/// before it reaches the driver; results, errors, and all other behavior pass
/// through verbatim.
///
/// # Example
///
/// ```rust,ignore
/// use sea_orm::Database;
/// use sea_orm_query_tag::TaggedConnection;
///
/// let db = Database::connect("postgres://localhost/mydb").await?;
/// let db = TaggedConnection::from(db);
///
/// // Queries issued under a context scope now carry its tag.
/// let users = Users::find().all(&db).await?;
/// ```
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct TaggedConnection {
    inner: DatabaseConnection,
    config: Arc<TagConfig>,
}

impl TaggedConnection {
    /// Create a new tagged connection with the given configuration.
    pub fn new(connection: DatabaseConnection, config: TagConfig) -> Self {
        Self {
            inner: connection,
            config: Arc::new(config),
        }
    }

    /// Create a new tagged connection with default configuration.
    pub fn wrap(connection: DatabaseConnection) -> Self {
        Self::new(connection, TagConfig::default())
    }

    /// Get a reference to the underlying `DatabaseConnection`.
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }

    /// Get the annotation configuration.
    pub fn config(&self) -> &TagConfig {
        &self.config
    }

    /// Consume the wrapper and return the inner `DatabaseConnection`.
    pub fn into_inner(self) -> DatabaseConnection {
        self.inner
    }

    /// Engine identifier for comment placement: the configured override, or
    /// the connection's backend.
    fn engine(&self) -> &str {
        match &self.config.engine {
            Some(engine) => engine.as_str(),
            None => match self.inner.get_database_backend() {
                DbBackend::Postgres => "postgres",
                DbBackend::MySql => "mysql",
                DbBackend::Sqlite => "sqlite3",
            },
        }
    }

    /// Annotated SQL for `sql`, or `None` when nothing is to be rewritten.
    fn annotated_sql(&self, sql: &str) -> Option<String> {
        if !self.config.enabled {
            return None;
        }
        let tag = context::resolve_tag()?;
        match comment::annotate(sql, Some(&tag), self.engine()) {
            Cow::Owned(annotated) => {
                tracing::debug!(engine = self.engine(), tag = %tag, "annotated statement");
                Some(annotated)
            }
            Cow::Borrowed(_) => None,
        }
    }

    fn annotate_statement(&self, stmt: &mut Statement) {
        if let Some(sql) = self.annotated_sql(&stmt.sql) {
            stmt.sql = sql;
        }
    }
}

impl From<DatabaseConnection> for TaggedConnection {
    fn from(connection: DatabaseConnection) -> Self {
        Self::wrap(connection)
    }
}

impl AsRef<DatabaseConnection> for TaggedConnection {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.inner
    }
}

#[async_trait]
impl ConnectionTrait for TaggedConnection {
    fn get_database_backend(&self) -> DbBackend {
        self.inner.get_database_backend()
    }

    async fn execute(&self, mut stmt: Statement) -> Result<ExecResult, DbErr> {
        self.annotate_statement(&mut stmt);
        self.inner.execute(stmt).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        match self.annotated_sql(sql) {
            Some(annotated) => self.inner.execute_unprepared(&annotated).await,
            None => self.inner.execute_unprepared(sql).await,
        }
    }

    async fn query_one(&self, mut stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.annotate_statement(&mut stmt);
        self.inner.query_one(stmt).await
    }

    async fn query_all(&self, mut stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.annotate_statement(&mut stmt);
        self.inner.query_all(stmt).await
    }

    fn support_returning(&self) -> bool {
        self.inner.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.inner.is_mock_connection()
    }
}

impl StreamTrait for TaggedConnection {
    type Stream<'a> = <DatabaseConnection as StreamTrait>::Stream<'a>;

    fn stream<'a>(
        &'a self,
        mut stmt: Statement,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Stream<'a>, DbErr>> + 'a + Send>> {
        self.annotate_statement(&mut stmt);
        self.inner.stream(stmt)
    }
}

// Transactions carry no statement text to rewrite; statements executed on the
// resulting `DatabaseTransaction` go to the driver directly.
#[async_trait]
impl TransactionTrait for TaggedConnection {
    async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.inner.begin().await
    }

    async fn begin_with_config(
        &self,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<DatabaseTransaction, DbErr> {
        self.inner.begin_with_config(isolation_level, access_mode).await
    }

    async fn transaction<F, T, E>(&self, callback: F) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        self.inner.transaction(callback).await
    }

    async fn transaction_with_config<F, T, E>(
        &self,
        callback: F,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        self.inner
            .transaction_with_config(callback, isolation_level, access_mode)
            .await
    }
}

/// Extension trait for easy wrapping of database connections.
pub trait QueryTagExt {
    /// Wrap this connection with query tagging.
    fn with_query_tags(self) -> TaggedConnection;

    /// Wrap this connection with custom annotation configuration.
    fn with_query_tag_config(self, config: TagConfig) -> TaggedConnection;
}

impl QueryTagExt for DatabaseConnection {
    fn with_query_tags(self) -> TaggedConnection {
        TaggedConnection::wrap(self)
    }

    fn with_query_tag_config(self, config: TagConfig) -> TaggedConnection {
        TaggedConnection::new(self, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::QueryContext;
    use sea_orm::{MockDatabase, MockExecResult};

    fn mock_connection(backend: DbBackend) -> DatabaseConnection {
        MockDatabase::new(backend)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection()
    }

    fn logged_sql(db: TaggedConnection) -> String {
        format!("{:?}", db.into_inner().into_transaction_log())
    }

    #[tokio::test]
    async fn test_execute_appends_tag() {
        let db = TaggedConnection::wrap(mock_connection(DbBackend::Postgres));

        let _scope = QueryContext::new().with_tag("checkout").enter();
        db.execute(Statement::from_string(
            DbBackend::Postgres,
            "DELETE FROM carts",
        ))
        .await
        .unwrap();

        assert!(logged_sql(db).contains("DELETE FROM carts /* checkout */"));
    }

    #[tokio::test]
    async fn test_mysql_gets_leading_comment() {
        let db = TaggedConnection::wrap(mock_connection(DbBackend::MySql));

        let _scope = QueryContext::new().with_tag("/login").enter();
        db.execute(Statement::from_string(DbBackend::MySql, "SELECT 1"))
            .await
            .unwrap();

        assert!(logged_sql(db).contains("/* /login */ SELECT 1 "));
    }

    #[tokio::test]
    async fn test_no_context_leaves_statement_unchanged() {
        let db = TaggedConnection::wrap(mock_connection(DbBackend::Postgres));

        db.execute(Statement::from_string(
            DbBackend::Postgres,
            "DELETE FROM carts",
        ))
        .await
        .unwrap();

        let logged = logged_sql(db);
        assert!(logged.contains("DELETE FROM carts"));
        assert!(!logged.contains("/*"));
    }

    #[tokio::test]
    async fn test_disabled_config_leaves_statement_unchanged() {
        let db = TaggedConnection::new(
            mock_connection(DbBackend::Postgres),
            TagConfig::disabled(),
        );

        let _scope = QueryContext::new().with_tag("checkout").enter();
        db.execute(Statement::from_string(
            DbBackend::Postgres,
            "DELETE FROM carts",
        ))
        .await
        .unwrap();

        assert!(!logged_sql(db).contains("/*"));
    }

    #[tokio::test]
    async fn test_engine_override_controls_placement() {
        let db = TaggedConnection::new(
            mock_connection(DbBackend::Postgres),
            TagConfig::default().with_engine("unknown_db"),
        );

        let _scope = QueryContext::new().with_tag("checkout").enter();
        db.execute(Statement::from_string(
            DbBackend::Postgres,
            "DELETE FROM carts",
        ))
        .await
        .unwrap();

        // Unrecognized engines are never annotated.
        assert!(!logged_sql(db).contains("/*"));
    }

    #[tokio::test]
    async fn test_sanitized_tag_in_statement() {
        let db = TaggedConnection::wrap(mock_connection(DbBackend::Sqlite));

        let _scope = QueryContext::new().with_tag("a*b%c").enter();
        db.execute(Statement::from_string(DbBackend::Sqlite, "SELECT 1"))
            .await
            .unwrap();

        assert!(logged_sql(db).contains("SELECT 1 /* a_b%%c */"));
    }
}
