use axum::{
    Router,
    routing::{get, post},
};
use regex::RegexSet;
use std::sync::{Arc, LazyLock};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService, seed_admin};

pub mod auth;
mod error;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub store: Store,
    pub config: Config,
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    seed_admin(&store, &config).await?;

    let auth = Arc::new(SeaOrmAuthService::new(store.clone(), &config)?);

    Ok(Arc::new(AppState {
        auth,
        store,
        config,
    }))
}

/// Hosted sandbox IDEs serve frontends from per-workspace subdomains, so
/// exact-origin matching cannot cover them.
static SANDBOX_ORIGINS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^https://[a-z0-9.-]+\.webcontainer-api\.io$",
        r"^https://[a-z0-9.-]+\.stackblitz\.io$",
        r"^https://[a-z0-9.-]+\.csb\.app$",
        r"^https://[a-z0-9.-]+\.gitpod\.io$",
    ])
    .unwrap_or_else(|_| RegexSet::empty())
});

fn cors_layer(config: &Config) -> CorsLayer {
    if config.server.is_production() {
        let allowed = config.server.cors_allowed_origins.clone();
        let origin_predicate = AllowOrigin::predicate(move |origin, _| {
            let Ok(origin) = origin.to_str() else {
                return false;
            };
            allowed.iter().any(|o| o == origin) || SANDBOX_ORIGINS.is_match(origin)
        });

        CorsLayer::new()
            .allow_origin(origin_predicate)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    let api_router = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/health", get(system::health))
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .fallback(system::route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
