//! servisku-server: HTTP API for the repair-shop backend
//!
//! Exposes repair tickets, inventory, staff, dashboards, and financial
//! reports over JSON, gated by bearer-token role checks.

pub mod auth;
pub mod error;
pub mod migrations;
pub mod models;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod test_util;

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use servisku_core::AuthKeys;

pub use error::{Error, Result};
pub use state::AppState;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("SERVISKU_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("SERVISKU_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://servisku.db".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key".to_string()),
        }
    }
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors);

    let public = Router::new()
        .route("/health", get(routes::health_check))
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
        .route("/api/servis/search", get(routes::search_servis));

    let admin = Router::new()
        .route("/pegawai/available-users", get(routes::available_users))
        .route(
            "/pegawai",
            get(routes::list_pegawai).post(routes::create_pegawai),
        )
        .route(
            "/pegawai/{id}",
            put(routes::update_pegawai).delete(routes::delete_pegawai),
        )
        .route("/dashboard", get(routes::dashboard_stats))
        .route("/dashboard-stats", get(routes::dashboard_overview))
        .route("/simple-stats", get(routes::simple_stats))
        .route(
            "/laporan",
            get(routes::list_laporan).post(routes::generate_laporan),
        )
        .route(
            "/laporan/{id}",
            get(routes::get_laporan).delete(routes::delete_laporan),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let pegawai = Router::new()
        .route(
            "/barang",
            get(routes::list_barang).post(routes::create_barang),
        )
        .route(
            "/barang/{id}",
            put(routes::update_barang).delete(routes::delete_barang),
        )
        .route(
            "/servis",
            get(routes::list_servis).post(routes::create_servis),
        )
        .route(
            "/servis/{id}",
            get(routes::get_servis)
                .put(routes::update_servis)
                .delete(routes::delete_servis),
        )
        .route("/detail-servis", post(routes::add_detail_servis))
        .route(
            "/detail-servis/{id}",
            put(routes::update_detail_servis).delete(routes::delete_detail_servis),
        )
        .route("/dashboard", get(routes::dashboard_stats))
        .route("/dashboard-stats", get(routes::dashboard_overview))
        .route("/simple-stats", get(routes::simple_stats))
        .route(
            "/laporan",
            get(routes::list_laporan).post(routes::generate_laporan),
        )
        .route(
            "/laporan/{id}",
            get(routes::get_laporan).delete(routes::delete_laporan),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_pegawai,
        ));

    Router::new()
        .merge(public)
        .nest("/api/admin", admin)
        .nest("/api/pegawai", pegawai)
        .layer(middleware)
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig) -> Result<()> {
    let options: SqliteConnectOptions = config
        .database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrations::run(&pool).await?;

    let state = AppState::new(pool, AuthKeys::new(config.jwt_secret.as_bytes()));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::Internal(format!("invalid bind address: {}", e)))?;

    tracing::info!("Starting servisku-server on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_util::{
        admin_request, json_body, pegawai_request, public_request, request, test_app,
    };

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _state) = test_app().await;

        let response = request(&app, public_request("GET", "/health", None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"].as_str().unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (app, _state) = test_app().await;

        let body = r#"{"nama": "Budi", "username": "budi", "password": "rahasia"}"#;
        let response = request(&app, public_request("POST", "/api/signup", Some(body))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = request(&app, public_request("POST", "/api/signup", Some(body))).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_signup_requires_fields() {
        let (app, _state) = test_app().await;

        let response = request(
            &app,
            public_request("POST", "/api/signup", Some(r#"{"username": "budi"}"#)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_flow() {
        let (app, _state) = test_app().await;

        let body = r#"{"nama": "Budi", "username": "budi", "password": "rahasia"}"#;
        request(&app, public_request("POST", "/api/signup", Some(body))).await;

        // Wrong password
        let response = request(
            &app,
            public_request(
                "POST",
                "/api/login",
                Some(r#"{"username": "budi", "password": "salah"}"#),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Unknown user
        let response = request(
            &app,
            public_request(
                "POST",
                "/api/login",
                Some(r#"{"username": "nobody", "password": "rahasia"}"#),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Success returns a usable token
        let response = request(
            &app,
            public_request(
                "POST",
                "/api/login",
                Some(r#"{"username": "budi", "password": "rahasia"}"#),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let token = body["token"].as_str().unwrap();
        assert_eq!(body["user"]["role"].as_str().unwrap(), "pegawai");

        let req = axum::http::Request::builder()
            .method("GET")
            .uri("/api/pegawai/servis")
            .header("Authorization", format!("Bearer {}", token))
            .body(axum::body::Body::empty())
            .unwrap();
        let response = request(&app, req).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_gates() {
        let (app, _state) = test_app().await;

        // No token
        let response = request(&app, public_request("GET", "/api/pegawai/barang", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Garbage token
        let req = axum::http::Request::builder()
            .method("GET")
            .uri("/api/pegawai/barang")
            .header("Authorization", "Bearer not-a-token")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = request(&app, req).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Pegawai token on an admin route
        let response = request(&app, pegawai_request("GET", "/api/admin/pegawai", None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Admin token on a pegawai route: exact role match, no hierarchy
        let response = request(&app, admin_request("GET", "/api/pegawai/barang", None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Matching roles pass
        let response = request(&app, admin_request("GET", "/api/admin/pegawai", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = request(&app, pegawai_request("GET", "/api/pegawai/barang", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
