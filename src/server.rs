//! # Server Module
//!
//! HTTP server setup and route configuration.

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::jwt::JwtService;
use crate::auth::middleware::AuthMiddleware;
use crate::auth::service::AuthService;
use crate::config::{Config, ServerConfig};
use crate::database::{DatabaseConnection, MealStore, UserStore, migrations};
use crate::errors::route_not_found;
use crate::routes::{auth, health, meal, user};

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: Arc<JwtService>,
    pub auth_service: AuthService,
    pub users: Arc<dyn UserStore>,
    pub meals: Arc<dyn MealStore>,
}

impl AppState {
    pub fn new(jwt_service: Arc<JwtService>, users: Arc<dyn UserStore>, meals: Arc<dyn MealStore>) -> Self {
        Self {
            auth_service: AuthService::new(users.clone(), jwt_service.clone()),
            jwt_service,
            users,
            meals,
        }
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

/// Build the full router.
///
/// Layers on a route run outermost-last-added, so on the owned routes the
/// token check runs before the ownership check.
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    let authenticated = middleware::from_fn_with_state(
        state.jwt_service.clone(),
        AuthMiddleware::validate_token,
    );
    let user_owner = middleware::from_fn(AuthMiddleware::require_user_owner);
    let meal_owner = middleware::from_fn_with_state(state.clone(), AuthMiddleware::require_meal_owner);

    Router::new()
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
        .route("/api/login", post(auth::login))
        .route(
            "/api/user",
            get(user::list_users)
                .route_layer(authenticated.clone())
                .post(user::create_user),
        )
        .route(
            "/api/user/profile",
            get(user::get_profile).route_layer(authenticated.clone()),
        )
        .route(
            "/api/user/{userId}",
            put(user::update_user)
                .delete(user::delete_user)
                .route_layer(user_owner)
                .get(user::get_user)
                .route_layer(authenticated.clone()),
        )
        .route(
            "/api/meal",
            get(meal::list_meals)
                .post(meal::create_meal)
                .route_layer(authenticated.clone()),
        )
        .route(
            "/api/meal/{mealId}",
            put(meal::update_meal)
                .delete(meal::delete_meal)
                .route_layer(meal_owner)
                .get(meal::get_meal)
                .route_layer(authenticated),
        )
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(server)),
        )
        .with_state(state)
}

/// Connects to the database, runs migrations and serves until shutdown.
pub async fn start(config: Config) -> Result<()> {
    let jwt_service = Arc::new(JwtService::new(&config.auth));
    tracing::info!("🔑 Tokens valid for {} days", jwt_service.ttl().num_days());

    let db = Arc::new(DatabaseConnection::new(config.database.clone()).await?);
    migrations::run_migrations(db.pool()).await?;

    let state = AppState::new(jwt_service, db.clone(), db);
    let app = app(state, &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr} - port may already be in use"))?;

    tracing::info!("🚀 Share-meal server listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
