use axum::{middleware::from_fn_with_state, Router};
use item_media_core::app;
use item_media_core::core::config::{Config, StorageBackend};
use item_media_core::core::openapi::{ApiDoc, SwaggerInfoModifier};
use item_media_core::core::{database, middleware};
use item_media_core::features::auth::JwtValidator;
use item_media_core::features::items::ItemService;
use item_media_core::modules::media::{provider_from_config, MediaService, LOCAL_MEDIA_ROUTE};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
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

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth
    let jwt_validator = Arc::new(JwtValidator::new(
        &config.auth.secret_key,
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized");

    // Initialize media provider and services
    let provider = provider_from_config(&config.media)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize media provider: {}", e))?;
    let media_service = Arc::new(MediaService::new(
        provider,
        config.media.max_upload_mb,
        config.media.folder.clone(),
    ));
    tracing::info!(
        "Media service initialized (provider: {}, max upload: {}MB)",
        media_service.provider_name(),
        media_service.max_upload_mb()
    );

    let item_service = Arc::new(ItemService::new(pool.clone(), Arc::clone(&media_service)));
    tracing::info!("Item service initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn_with_state(
                Arc::new(credentials),
                middleware::basic_auth_middleware,
            ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let mut app = Router::new()
        .merge(swagger)
        .merge(app::api_router(item_service, jwt_validator));

    // Local uploads are served as static files
    if let StorageBackend::Local { upload_dir } = &config.media.backend {
        tokio::fs::create_dir_all(upload_dir).await?;
        app = app.nest_service(LOCAL_MEDIA_ROUTE, ServeDir::new(upload_dir));
        tracing::info!(
            "Serving local uploads from {} at {}",
            upload_dir.display(),
            LOCAL_MEDIA_ROUTE
        );
    }

    // First layer is outermost: request id is assigned before tracing sees it
    let app = app.layer(
        ServiceBuilder::new()
            // Generate X-Request-Id using UUID v7 (or use client-provided one)
            .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(middleware::MakeSpanWithRequestId)
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            // Propagate X-Request-Id to response headers
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(middleware::cors_layer(
                config.app.cors_allowed_origins.clone(),
            )),
    );

    // Start server
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
    socket.set_nodelay(true)?;

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
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
