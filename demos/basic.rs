//! Basic example showing how to use sea-orm-query-tag.
//!
//! Run with: cargo run --example basic

use sea_orm::Database;
use sea_orm_query_tag::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sea_orm_query_tag=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect to database
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/test".into());

    tracing::info!("Connecting to database...");

    let db = Database::connect(&database_url).await?;

    // Option 1: Simple wrapping with defaults
    let db = TaggedConnection::from(db);

    // Option 2: Using the extension trait (more fluent)
    // let db = db.with_query_tags();

    // Option 3: Honoring the SEA_ORM_QUERY_TAG_ENABLED kill switch
    // let db = db.with_query_tag_config(TagConfig::from_env());

    // Queries executed inside a context scope carry its tag:
    //
    // let _scope = QueryContext::new().with_tag("nightly-reconcile").enter();
    // let orders = Orders::find().all(&db).await?;
    //
    // arrives at the backend as
    //
    //     SELECT "orders".* FROM "orders" /* nightly-reconcile */

    tracing::info!("Database connection established with query tagging enabled");

    // You can also access the inner connection if needed
    let _inner = db.inner();

    Ok(())
}
