//! Example showing sea-orm-query-tag integration with Axum.
//!
//! This demonstrates how each request's path ends up as a comment on the SQL
//! its handler executes.
//!
//! Run with: cargo run --example axum

fn main() {
    println!(
        r#"
This example demonstrates the integration pattern with Axum.

Your setup would look like:

```rust
use axum::{{Router, routing::get, extract::State, middleware}};
use sea_orm::Database;
use sea_orm_query_tag::prelude::*;
use std::sync::Arc;

// Application state with tagged database
struct AppState {{
    db: TaggedConnection,
}}

// Teach the crate where your request path lives (once, for a small
// wrapper type around the parts you keep):
struct RoutePath(String);

impl RequestPath for RoutePath {{
    fn path(&self) -> &str {{
        &self.0
    }}
}}

// Middleware - every query a handler runs is labelled with the route
async fn tag_queries(req: axum::extract::Request, next: middleware::Next)
    -> axum::response::Response
{{
    let route = RoutePath(req.uri().path().to_owned());
    next.run(req)
        .in_query_context(QueryContext::new().with_request(&route))
        .await
}}

// Handler - an explicit tag beats the request path when you need one
async fn get_users(State(state): State<Arc<AppState>>) -> String {{
    let users = Users::find()
        .all(&state.db)
        .await
        .unwrap();

    format!("Found {{}} users", users.len())
}}

#[tokio::main]
async fn main() {{
    tracing_subscriber::fmt::init();

    let db = Database::connect("postgres://localhost/mydb")
        .await
        .unwrap()
        .with_query_tag_config(TagConfig::from_env());

    let state = Arc::new(AppState {{ db }});

    let app = Router::new()
        .route("/users", get(get_users))
        .layer(middleware::from_fn(tag_queries))
        .with_state(state);

    // Start server...
}}
```

With the middleware in place, `SELECT * FROM pg_stat_activity` shows:

    SELECT "users"."id", "users"."email" FROM "users" /* /users */

so a long-running statement can be traced straight back to the route
that issued it.
"#
    );
}
