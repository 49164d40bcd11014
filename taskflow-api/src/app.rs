/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskflow_api::{app::{build_router, AppState}, config::Config};
/// use taskflow_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// let app = build_router(AppState::new(store, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use taskflow_shared::{
    auth::principal::PrincipalResolver,
    services::{ProjectService, TaskService, TokenSettings, UserService},
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request by Axum's `State` extractor; everything inside is
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub resolver: PrincipalResolver,
    pub users: UserService,
    pub projects: ProjectService,
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let tokens = TokenSettings::new(config.jwt.secret.clone(), config.jwt.expiration_minutes);

        Self {
            resolver: PrincipalResolver::new(config.jwt.secret.clone()),
            users: UserService::new(store.clone(), tokens),
            projects: ProjectService::new(store.clone()),
            tasks: TaskService::new(store.clone(), config.rbac.status_updates),
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                          (public)
/// └── /api
///     ├── /auth
///     │   ├── POST /register               (public)
///     │   ├── POST /login                  (public)
///     │   ├── GET  /me
///     │   └── GET  /validate-token
///     ├── /users
///     │   ├── POST   /          GET /
///     │   ├── GET    /:id       PATCH /:id     DELETE /:id
///     │   ├── POST   /:id/activate
///     │   └── POST   /:id/change-password
///     ├── /projects
///     │   ├── POST   /          GET /
///     │   ├── GET    /:id       PATCH /:id     DELETE /:id
///     │   ├── POST   /:id/members
///     │   └── DELETE /:id/members/:member_id
///     └── /tasks
///         ├── POST   /
///         ├── GET    /project/:project_id
///         ├── GET    /my-tasks
///         ├── GET    /user/:user_id
///         ├── GET    /:id       PATCH /:id     DELETE /:id
///         └── PATCH  /:id/status
/// ```
///
/// Everything except `/health`, register and login passes through
/// [`auth_layer`].
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route(
            "/",
            post(routes::users::create_user).get(routes::users::list_users),
        )
        .route(
            "/:id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/:id/activate", post(routes::users::activate_user))
        .route("/:id/change-password", post(routes::users::change_password));

    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/:id/members", post(routes::projects::add_member))
        .route(
            "/:id/members/:member_id",
            delete(routes::projects::remove_member),
        );

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/project/:project_id", get(routes::tasks::list_project_tasks))
        .route("/my-tasks", get(routes::tasks::list_my_tasks))
        .route("/user/:user_id", get(routes::tasks::list_user_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/status", patch(routes::tasks::update_task_status));

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/validate-token", get(routes::auth::validate_token))
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let api_routes = public_routes.merge(protected_routes);

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware
///
/// Resolves the `Authorization` header to a
/// [`Principal`](taskflow_shared::auth::principal::Principal) and stores it
/// in request extensions for the handler.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Owned so the request is not borrowed across the store lookup
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    let principal = state
        .resolver
        .resolve(state.store.as_ref(), header.as_deref())
        .await?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
