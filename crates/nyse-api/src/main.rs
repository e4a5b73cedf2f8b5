//! NYSE 회사 API 서버.
//!
//! 설정을 로드하고 저장소와 시장 데이터 Provider를 연결한 뒤
//! Axum 기반 REST API 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use nyse_api::metrics::setup_metrics_recorder;
use nyse_api::middleware::metrics_layer;
use nyse_api::openapi::{redoc_router, swagger_ui_router};
use nyse_api::repository::{CompanyRepository, InMemoryCompanyRepository, PgCompanyRepository};
use nyse_api::routes::create_api_router;
use nyse_api::state::AppState;
use nyse_core::config::{AppConfig, CorsConfig, DatabaseConfig};
use nyse_core::logging::{init_logging, LogConfig};
use nyse_data::{MarketDataProvider, PolygonClient};

/// 저장소 생성.
///
/// 데이터베이스 URL이 있으면 PostgreSQL에 연결하고 마이그레이션을 실행합니다.
/// URL이 없으면 인메모리 저장소를 사용합니다 (재시작 시 데이터 소실).
async fn create_repository(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn CompanyRepository>> {
    let Some(database_url) = config.url.as_deref() else {
        warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
        return Ok(Arc::new(InMemoryCompanyRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(database_url)
        .await
        .context("데이터베이스 연결 실패")?;

    let repository = PgCompanyRepository::new(pool);
    repository
        .migrate()
        .await
        .context("데이터베이스 마이그레이션 실패")?;

    info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL, migrations applied"
    );
    Ok(Arc::new(repository))
}

/// 애플리케이션 상태 생성.
async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let provider = PolygonClient::new(&config.provider).context("HTTP 클라이언트 생성 실패")?;
    if provider.is_configured() {
        info!(base_url = %provider.base_url(), "Market data provider configured");
    } else {
        warn!("POLYGON_API_KEY not set, every create/update will be rejected");
    }

    let repository = create_repository(&config.database).await?;

    Ok(AppState::new(
        repository,
        Arc::new(provider),
        config.provider.series_window_days,
    ))
}

/// CORS 레이어 생성.
///
/// 허용 origin이 비어 있으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let restricted = !origins.is_empty();
    let allow_origin = if restricted {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    } else {
        if !config.allowed_origins.is_empty() {
            warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
        } else {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
        }
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // 자격 증명은 origin 목록이 지정된 경우에만 허용
        .allow_credentials(restricted)
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle, config: &AppConfig) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router().with_state(state))
        .merge(swagger_ui_router())
        .merge(redoc_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(cors_layer(&config.cors))
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> Result<(), Box<dyn std::error::Error>> {
    use nyse_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    handle_export_openapi()?;

    let config = AppConfig::load_default()?;
    init_logging(LogConfig::from(&config.logging))?;

    info!("Starting NYSE API server...");
    info!(provider = ?config.provider, "Configuration loaded");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let state = match create_app_state(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {:#}", e);
            return Err(e.into());
        }
    };
    info!(
        version = %state.version,
        storage = state.repository().backend(),
        "Application state initialized"
    );

    let addr: SocketAddr = config.server.bind_address().parse()?;
    let app = create_router(Arc::new(state), metrics_handle, &config);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Redoc available at http://{}/redoc", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기 (Ctrl+C 또는 SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
