use axum::{middleware, routing::get, Router};
use domain::services::{GroupContentService, GroupStore, MembershipLifecycle};
use persistence::PgGroupStore;
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{self, health};
use crate::services::LoggingInvitationNotifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub lifecycle: MembershipLifecycle,
    pub content: GroupContentService,
}

impl AppState {
    /// Wires the domain services to the Postgres store.
    pub fn new(config: Arc<Config>, pool: PgPool) -> Result<Self, JwtError> {
        let jwt = JwtConfig::new(
            &config.jwt.public_key,
            config.jwt.private_key.as_deref(),
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;

        let store: Arc<dyn GroupStore> = Arc::new(PgGroupStore::new(pool.clone()));
        let notifier = Arc::new(LoggingInvitationNotifier::new(config.notifications.clone()));

        Ok(Self {
            lifecycle: MembershipLifecycle::new(
                store.clone(),
                notifier,
                config.groups.invitation_expiry_days,
            ),
            content: GroupContentService::new(store),
            jwt: Arc::new(jwt),
            pool,
            config,
        })
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let config = Arc::new(config);
    let state = AppState::new(config.clone(), pool)?;

    let cors = if config.security.cors_origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Every v1 route authenticates through the UserAuth extractor
    let api_routes = routes::api_v1_routes();

    Ok(Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
