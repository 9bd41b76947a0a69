use game_catalog::infra::config::{Backend, Settings};
use game_catalog::transport;
use game_catalog::{CatalogService, CatalogStore, MemoryCatalogStore, PostgresCatalogStore, ServicePolicy};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let settings = Settings::from_env()?;

    // --- Store Initialization ---
    let store: Arc<dyn CatalogStore> = match settings.backend {
        Backend::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
            tracing::info!(max_connections = settings.max_connections, "connecting to postgres and applying migrations");
            Arc::new(PostgresCatalogStore::connect(url, settings.max_connections).await?)
        }
        Backend::Memory => {
            tracing::warn!("using the in-memory catalog store; data is lost on exit");
            Arc::new(MemoryCatalogStore::new())
        }
    };

    // --- Service Initialization ---
    let policy = ServicePolicy {
        missing_platforms: settings.missing_platforms,
    };
    tracing::info!(?policy, "catalog service ready");
    let app_state = transport::http::AppState {
        catalog: Arc::new(CatalogService::new(store, policy)),
        expose_store_errors: settings.expose_store_errors,
    };

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "API server listening (Swagger UI at /swagger-ui)");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
