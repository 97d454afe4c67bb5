mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::events::EventBus;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth;
use crate::features::badges::{
    routes as badges_routes, BadgeCatalog, BadgeListener, BadgeRuleEngine,
};
use crate::features::comments::{routes as comments_routes, CommentService, PgCommentStore};
use crate::features::notifications::{
    routes as notifications_routes, NotificationDispatcher, NotificationListener,
    NotificationService, PgNotificationStore,
};
use crate::features::reports::{
    routes as reports_routes, EngagementService, LifecycleService, PgReportStore, ReportState,
};
use crate::features::users::{routes as users_routes, PgUserStore, ProfileService};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // Initialize auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.issuer,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized");

    // Stores
    let report_store = Arc::new(PgReportStore::new(pool.clone()));
    let user_store = Arc::new(PgUserStore::new(pool.clone()));
    let comment_store = Arc::new(PgCommentStore::new(pool.clone()));
    let notification_store = Arc::new(PgNotificationStore::new(pool.clone()));

    // Post-commit listeners: badges are evaluated before notifications go out
    let catalog = Arc::new(BadgeCatalog::standard());
    let dispatcher = Arc::new(NotificationDispatcher::new(notification_store.clone()));
    let badge_engine = Arc::new(BadgeRuleEngine::new(
        user_store.clone(),
        Arc::clone(&catalog),
        Arc::clone(&dispatcher),
    ));
    let events = EventBus::new()
        .with_listener(Arc::new(BadgeListener::new(badge_engine)))
        .with_listener(Arc::new(NotificationListener::new(Arc::clone(&dispatcher))));
    tracing::info!(
        "Event bus initialized with {} badges in catalog",
        catalog.iter().count()
    );

    let report_state = ReportState {
        lifecycle: Arc::new(LifecycleService::new(
            report_store.clone(),
            user_store.clone(),
            events.clone(),
        )),
        engagement: Arc::new(EngagementService::new(
            report_store.clone(),
            user_store.clone(),
            events.clone(),
        )),
    };
    let comment_service = Arc::new(CommentService::new(
        comment_store,
        report_store.clone(),
        user_store.clone(),
        events,
    ));
    let profile_service = Arc::new(ProfileService::new(
        user_store,
        report_store,
        Arc::clone(&catalog),
    ));
    let notification_service = Arc::new(NotificationService::new(notification_store));
    tracing::info!("Report, comment, profile and notification services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(reports_routes::protected_routes(report_state.clone()))
        .merge(comments_routes::protected_routes(Arc::clone(
            &comment_service,
        )))
        .merge(notifications_routes::protected_routes(notification_service))
        .merge(users_routes::protected_routes(profile_service))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Anonymous callers allowed; a valid token adds the viewer's identity
    let optional_auth_routes = Router::new()
        .merge(reports_routes::public_routes(report_state))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator,
            middleware::optional_auth_middleware,
        ));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(comments_routes::public_routes(comment_service))
        .merge(badges_routes::routes(catalog));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(optional_auth_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
