/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskflow_api::{app::AppState, config::Config};
/// use taskflow_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = taskflow_api::app::build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:4000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::jwt_auth_layer, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, request::Parts, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use taskflow_shared::auth::password::HashParams;
use taskflow_shared::service::{AuthSettings, ProjectService, SessionManager, TaskService};
use taskflow_shared::store::Store;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor; everything inside
/// is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub sessions: SessionManager,
    pub projects: ProjectService,
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self::with_hash_params(store, config, HashParams::default())
    }

    /// State with explicit Argon2 costs (tests use [`HashParams::fast`])
    pub fn with_hash_params(store: Arc<dyn Store>, config: Config, hash_params: HashParams) -> Self {
        let settings = AuthSettings {
            jwt_secret: config.auth.jwt_secret.clone(),
            access_ttl: config.auth.access_ttl(),
            refresh_ttl: config.auth.refresh_ttl(),
            hash_params,
        };

        Self {
            sessions: SessionManager::new(store.clone(), settings),
            projects: ProjectService::new(store.clone()),
            tasks: TaskService::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /healthz
/// └── /api
///     ├── /auth
///     │   ├── POST /signup, /login, /refresh     (public)
///     │   └── GET /me, POST /logout              (bearer)
///     ├── /projects                              (bearer)
///     │   ├── GET, POST /
///     │   ├── GET, PATCH, DELETE /:id
///     │   └── POST /:id/add-member
///     └── /tasks                                 (bearer)
///         ├── GET /?projectId=, POST /
///         └── PATCH, DELETE /:id
/// ```
///
/// Layers, outermost first: security headers, CORS, compression, tracing,
/// body limit.
pub fn build_router(state: AppState) -> Router {
    let auth_layer = || axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let public_auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let session_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/logout", post(routes::auth::logout))
        .route_layer(auth_layer());

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/:id/add-member", post(routes::projects::add_member))
        .route_layer(auth_layer());

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            patch(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route_layer(auth_layer());

    let api_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(session_routes))
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes);

    let production = state.config.api.production;
    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .route("/healthz", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// CORS with credentials for the configured origins
///
/// `*` admits any origin (echoed back, as credentials forbid a literal `*`),
/// and an entry like `*.vercel.app` admits any host ending in `.vercel.app`.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Arc<Vec<String>> = Arc::new(origins.to_vec());

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|origin| origin_allowed(&origins, origin))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Matches a request `Origin` against the allow-list
pub fn origin_allowed(allowed: &[String], origin: &str) -> bool {
    allowed.iter().any(|entry| {
        if entry == "*" || entry == origin {
            return true;
        }
        match entry.strip_prefix("*.") {
            Some(suffix) => origin_host(origin)
                .map(|host| host.ends_with(&format!(".{}", suffix)))
                .unwrap_or(false),
            None => false,
        }
    })
}

fn origin_host(origin: &str) -> Option<&str> {
    let (_, rest) = origin.split_once("://")?;
    Some(rest.split(':').next().unwrap_or(rest))
}
