use acadtrack::auth::{self, AppState, SharedState};
use acadtrack::{api, config::Config, db::Db};
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();

    // ── Open the store ─────────────────────────────────────────
    let db = Db::open(&config.db_path).expect("Failed to open database file");
    info!(path = %config.db_path, "database ready");

    // ── Shared state ───────────────────────────────────────────
    let state: SharedState = Arc::new(AppState { db });

    // ── Router ─────────────────────────────────────────────────
    let app = Router::new()
        // Tasks (REST, JSON)
        .route("/acadtasks", get(api::list_tasks).post(api::create_task))
        .route("/acadtasks/user/:userId", get(api::list_user_tasks))
        .route(
            "/acadtasks/:id",
            put(api::update_task).delete(api::delete_task),
        )
        .route("/acadtasks/:id/toggle", patch(api::toggle_task))
        // Auth (JSON, called once per session)
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/update-profile", post(auth::update_profile))
        // Static files
        .fallback_service(ServeDir::new("dist").append_index_html_on_directories(true))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // ── Start ──────────────────────────────────────────────────
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("server running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}
