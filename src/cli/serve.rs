use graphbind::config::ModelConfig;
use graphbind::error::Result;
use graphbind::schema::SchemaBuilder;
use graphbind::store::DataFusionStore;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Run the serve command to start the GraphQL server
pub async fn run(config_path: String, port: u16) -> Result<()> {
    tracing::info!("📖 Loading configuration from {}", config_path);

    let config = graphbind::config::load_config(&config_path)?;

    // Use provided port or default from config
    let server_port = if port != 4000 { port } else { config.server.port };

    tracing::info!(
        "🔧 Building GraphQL schema: {} model(s), {} binding(s)...",
        config.model.len(),
        config.binding.len()
    );

    let store = Arc::new(DataFusionStore::new());
    for model in &config.model {
        let table_path = determine_table_path(model);
        tracing::info!("   Registering {} from {}", model.name, table_path);
        store.register_table_from_path(&model.table, &table_path).await?;
    }

    let mut builder = SchemaBuilder::new(store);
    let schema = builder.build_schema(&config.model, &config.binding).await?;

    tracing::info!("✅ Schema built successfully");
    tracing::info!("🚀 GraphQL server running on http://localhost:{}", server_port);
    tracing::info!("📊 Playground: http://localhost:{}/graphql", server_port);
    tracing::info!("💡 Press Ctrl+C to stop the server");

    start_http_server(schema, server_port).await
}

pub(crate) fn determine_table_path(model: &ModelConfig) -> String {
    // Storage location should always be explicitly set in config
    model.storage_location.clone().unwrap_or_else(|| {
        tracing::warn!(
            "Model '{}' does not have storage_location set. Using table name as path.",
            model.name
        );
        model.table.clone()
    })
}

async fn start_http_server(schema: async_graphql::dynamic::Schema, port: u16) -> Result<()> {
    let app = Router::new()
        .route(
            "/graphql",
            get(graphql_playground).post_service(async_graphql_axum::GraphQL::new(schema)),
        )
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        graphbind::error::GraphbindError::Config(format!(
            "Failed to bind to port {}: {}. Port may be in use.",
            port, e
        ))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| graphbind::error::GraphbindError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

async fn graphql_playground() -> axum::response::Html<String> {
    axum::response::Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}

async fn health_check() -> &'static str {
    "OK"
}
