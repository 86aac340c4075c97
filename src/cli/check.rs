use graphbind::error::Result;
use graphbind::schema::SchemaBuilder;
use graphbind::store::DataFusionStore;
use std::sync::Arc;

/// Run the check command: load the config, build the schema, report
/// definition errors without serving anything.
pub async fn run(config_path: String) -> Result<()> {
    tracing::info!("📖 Loading configuration from {}", config_path);

    let config = graphbind::config::load_config(&config_path)?;

    let store = Arc::new(DataFusionStore::new());
    for model in &config.model {
        let table_path = super::serve::determine_table_path(model);
        store.register_table_from_path(&model.table, &table_path).await?;
    }

    let mut builder = SchemaBuilder::new(store);
    match builder.build_schema(&config.model, &config.binding).await {
        Ok(_schema) => {
            tracing::info!(
                "✅ Schema OK: {} model(s), {} binding(s)",
                config.model.len(),
                config.binding.len()
            );
            Ok(())
        }
        Err(e) if e.is_definition_error() => {
            tracing::error!("❌ Schema definition error: {}", e);
            Err(e)
        }
        Err(e) => {
            tracing::error!("❌ Schema build failed: {}", e);
            Err(e)
        }
    }
}
