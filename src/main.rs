mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth;
use crate::features::equipment::services::{
    AttachmentService, PgEquipmentStore, PreviewRegistry, SafetyCheckService, SafetyPanelService,
    SchemaReadinessService, TrainingVideoService,
};
use crate::features::equipment::EquipmentServices;
use crate::features::people::{PeopleService, PgDirectoryStore};
use crate::modules::storage::{BucketRules, MinIOClient, ObjectStorage};
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

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Base tables only; the safety-check columns are provisioned by the setup action
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized");

    // One storage client per container
    let attachment_storage: Arc<dyn ObjectStorage> = Arc::new(
        MinIOClient::new(
            &config.storage,
            &config.storage.attachments_bucket,
            BucketRules::default(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to initialize attachment storage: {}", e))?,
    );
    attachment_storage
        .ensure_bucket()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to ensure attachment bucket exists: {}", e))?;
    tracing::info!(
        "Attachment storage initialized for bucket: {}",
        attachment_storage.bucket_name()
    );

    // The video bucket is provisioned by the safety-check setup action
    let video_storage: Arc<dyn ObjectStorage> = Arc::new(
        MinIOClient::new(
            &config.storage,
            &config.storage.training_video_bucket,
            BucketRules::video_only(config.storage.training_video_max_size),
        )
        .map_err(|e| anyhow::anyhow!("Failed to initialize video storage: {}", e))?,
    );
    tracing::info!(
        "Training video storage initialized for bucket: {}",
        video_storage.bucket_name()
    );

    // Initialize People Service
    let directory_store = Arc::new(PgDirectoryStore::new(pool.clone()));
    let people_service = Arc::new(PeopleService::new(directory_store));
    tracing::info!("People service initialized");

    // Initialize Equipment Services
    let equipment_store = Arc::new(PgEquipmentStore::new(pool.clone()));
    let schema_service = Arc::new(SchemaReadinessService::new(
        equipment_store.clone(),
        Arc::clone(&video_storage),
    ));

    // Probe once at startup; the result is cached for the process
    match schema_service.status().await {
        Ok(status) if status.is_ready() => tracing::info!("Safety check schema ready"),
        Ok(_) => tracing::warn!("Safety check schema needs setup before safety data can be used"),
        Err(e) => tracing::warn!("Safety check schema probe failed: {}", e),
    }

    let previews = Arc::new(PreviewRegistry::new(config.storage.preview_idle_ttl));
    Arc::clone(&previews).spawn_sweeper(
        (config.storage.preview_idle_ttl / 4).max(std::time::Duration::from_secs(1)),
    );
    tracing::info!(
        "Training video preview sweeper spawned (idle ttl {:?})",
        config.storage.preview_idle_ttl
    );

    let safety_service = Arc::new(SafetyCheckService::new(
        equipment_store.clone(),
        Arc::clone(&schema_service),
    ));
    let video_service = Arc::new(TrainingVideoService::new(
        equipment_store.clone(),
        Arc::clone(&video_storage),
        Arc::clone(&schema_service),
        Arc::clone(&previews),
    ));
    let attachment_service = Arc::new(AttachmentService::new(
        equipment_store,
        Arc::clone(&attachment_storage),
    ));
    let panel_service = Arc::new(SafetyPanelService::new(
        Arc::clone(&people_service),
        Arc::clone(&safety_service),
        Arc::clone(&video_service),
    ));
    tracing::info!("Equipment services initialized");

    let equipment_services = EquipmentServices {
        schema: schema_service,
        panel: panel_service,
        videos: video_service,
        attachments: attachment_service,
        training_video_max_size: config.storage.training_video_max_size,
    };

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
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = features::api_routes(people_service, equipment_services).route_layer(
        axum::middleware::from_fn_with_state(jwt_validator.clone(), middleware::auth_middleware),
    );

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
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
