use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use trackly_auth::TokenService;
use trackly_server::adapter::repository::{InMemoryUserRepository, PostgresUserRepository};
use trackly_server::domain::repository::UserRepository;
use trackly_server::infrastructure::config::Config;
use trackly_server::infrastructure::database;
use trackly_server::realtime::{ConnectionRegistry, NotificationDispatcher};
use trackly_server::{build_router, usecase, AppState};

fn init_tracing(level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/config.yaml".to_string());
    let cfg = Config::load(&config_path)?;

    init_tracing(&cfg.log.level, &cfg.log.format);

    info!(port = cfg.server.port, "starting trackly server");

    // シークレット欠落はここで致命エラーになる（実行時エラーにはしない）
    let tokens = Arc::new(TokenService::new(
        &cfg.auth.access_token_secret,
        &cfg.auth.refresh_token_secret,
        cfg.auth.access_token_ttl_secs,
        cfg.auth.refresh_token_ttl_secs,
    )?);

    // --- Credential Store: PostgreSQL or InMemory fallback ---
    let repo: Arc<dyn UserRepository> = if let Some(ref db_cfg) = cfg.database {
        info!("connecting to PostgreSQL credential store");
        let pool = database::create_pool(&db_cfg.url, db_cfg.max_connections).await?;
        info!("PostgreSQL connection pool established");
        Arc::new(PostgresUserRepository::new(pool))
    } else {
        info!("database not configured, using InMemory credential store");
        Arc::new(InMemoryUserRepository::new())
    };

    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = NotificationDispatcher::new(registry.clone());

    let state = AppState {
        register_uc: Arc::new(usecase::RegisterUserUseCase::new(repo.clone())),
        login_uc: Arc::new(usecase::LoginUserUseCase::new(repo.clone(), tokens.clone())),
        refresh_uc: Arc::new(usecase::RefreshAccessTokenUseCase::new(
            repo.clone(),
            tokens.clone(),
        )),
        logout_uc: Arc::new(usecase::LogoutUserUseCase::new(repo)),
        tokens,
        registry,
        dispatcher,
        production: cfg.app.is_production(),
    };

    let origin: HeaderValue = cfg.cors.allowed_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(cfg.server.host.parse()?, cfg.server.port);
    info!("REST server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
