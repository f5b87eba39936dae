//! # sea-orm-query-tag
//!
//! Annotates every SQL statement executed through SeaORM with the originating
//! HTTP request path or an explicit diagnostic tag, embedded as a SQL comment.
//!
//! Query monitoring tools like `SELECT * FROM pg_stat_activity` or
//! `SHOW PROCESSLIST` show you the SQL a backend is running but not where it
//! came from. This crate makes the connection visible:
//!
//! ```sql
//! SELECT "users"."id", "users"."email" FROM "users" /* /login */
//! ```
//!
//! If no tag or request path is in scope, nothing is appended.
//!
//! ## Features
//!
//! - **Transparent Interception**: `TaggedConnection` is a drop-in replacement
//!   for `DatabaseConnection`; results and errors pass through verbatim
//! - **Scoped Context**: tags propagate through an ambient per-thread scope
//!   entered with an RAII guard, innermost scope wins
//! - **Request Fallback**: any type exposing a request path can supply the
//!   annotation when no explicit tag is set
//! - **Injection Safe**: tags are sanitized so they can never terminate the
//!   comment early or be mistaken for a bind placeholder
//! - **Dialect Aware**: comment placement follows the database backend;
//!   unrecognized engines are left unannotated
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sea_orm::Database;
//! use sea_orm_query_tag::prelude::*;
//!
//! let db = Database::connect("postgres://localhost/mydb").await?;
//! let db = db.with_query_tags();
//!
//! // Tag the queries issued while the guard is alive.
//! let _scope = QueryContext::new().with_tag("nightly-reconcile").enter();
//! let orders = Orders::find().all(&db).await?;
//! ```
//!
//! ## Tagging from a request handler
//!
//! ```rust,ignore
//! use sea_orm_query_tag::{FutureExt, QueryContext, RequestPath};
//!
//! // Implement RequestPath for your framework's request type once:
//! impl RequestPath for MyRequest {
//!     fn path(&self) -> &str {
//!         self.uri().path()
//!     }
//! }
//!
//! // Then thread it through the handler's future:
//! let context = QueryContext::new().with_request(&req);
//! handle(req).in_query_context(context).await;
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use sea_orm_query_tag::{QueryTagExt, TagConfig};
//!
//! // Honors SEA_ORM_QUERY_TAG_ENABLED so the shim can be switched off per
//! // environment without touching code.
//! let db = db.with_query_tag_config(TagConfig::from_env());
//! ```

mod comment;
mod config;
mod connection;
mod context;

pub use comment::annotate;
pub use config::{TagConfig, ENABLED_ENV_VAR};
pub use connection::{QueryTagExt, TaggedConnection};
pub use context::{resolve_tag, ContextGuard, FutureExt, QueryContext, RequestPath, TaggedFuture};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        FutureExt, QueryContext, QueryTagExt, RequestPath, TagConfig, TaggedConnection,
    };
}
