//! Example consumer: a separate Rust project that uses crud-sdk as a dependency.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`

mod book;

use book::{Book, BookMapper};
use crud_sdk::{
    common_routes, connect, crud_routes, ensure_database_exists, ensure_table, layered, telemetry,
    CrudService, CrudState, PgRepository, ServerConfig,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    telemetry::init("crud_sdk=info,example_consumer=info,tower_http=info");

    ensure_database_exists(&config.database_url).await?;
    let pool = connect(&config).await?;
    ensure_table::<Book>(&pool).await?;

    let service = CrudService::new(PgRepository::<Book>::new(pool.clone())).with_paging(config.paging.clone());
    let app = axum::Router::new()
        .nest("/api/v1/books", crud_routes(CrudState::new(service, BookMapper)))
        .merge(common_routes(Some(pool)));
    let app = layered(app, &config);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
