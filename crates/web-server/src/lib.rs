use axum::{extract::DefaultBodyLimit, routing::get, Router};
use database::ItemStore;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
}

/// Builds the application router.
///
/// The item store is injected here rather than looked up, so tests can hand in
/// an in-memory store and the entry point hands in the provisioned MySQL one.
pub fn app(store: Arc<dyn ItemStore>, public_dir: &Path) -> Router {
    let app_state = Arc::new(AppState { store });

    Router::new()
        .route(
            "/api/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/api/items/{id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .with_state(app_state)
        .route_service("/", ServeFile::new(public_dir.join("index.html")))
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

/// Binds `addr` and serves `app` until `shutdown` resolves.
pub async fn run_server(
    addr: SocketAddr,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server is running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped.");
    Ok(())
}
