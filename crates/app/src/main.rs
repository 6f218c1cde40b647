use engine::{JsonFileStore, Ledger, MemoryStore};
use settings::Storage;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "expenses={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let ledger = build_ledger(&settings.storage).await?;

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.inspect_err(|err| {
        tracing::error!("failed to bind server listener on {addr}: {err}");
    })?;

    server::run_with_listener(ledger, listener).await?;

    Ok(())
}

async fn build_ledger(storage: &Storage) -> Result<Ledger, engine::EngineError> {
    let builder = if storage.memory {
        tracing::info!("Using in-memory storage, entries will not be persisted");
        Ledger::builder().store(MemoryStore::new())
    } else {
        tracing::info!("Using storage file {}", storage.path);
        Ledger::builder().store(JsonFileStore::new(&storage.path))
    };

    builder.build().await
}
