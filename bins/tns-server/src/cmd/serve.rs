use std::sync::Arc;

use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

use crate::config::{DatabaseUrl, ServeArgs, ServerConfig};
use crate::error::ServerError;
use tns_api::TopicStore;
use tns_registry::TopicRegistry;
use tns_storage_file::FileStore;
use tns_storage_memory::MemoryStore;

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    // --- Load config ---
    let config = ServerConfig::load(&args.config)?;
    tracing::info!(
        config = %args.config,
        port = config.port,
        database = %config.database,
        query_timeout_ms = config.query_timeout_ms,
        "loaded config"
    );

    // --- Open store (once per process) ---
    let store = open_store(&config.database).await?;
    let count = store.count().await?;
    tracing::info!(database = %config.database, topics = count, "store ready");

    let registry = Arc::new(TopicRegistry::new(store).with_query_timeout(config.query_timeout()));

    // --- Bind before spawning so a taken port fails startup ---
    let listener = tns_api_server::bind(config.listen_addr()).await?;

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();
    let mut api = tokio::spawn(tns_api_server::serve(listener, registry.clone(), token.clone()));

    tracing::info!("tns-server started, press Ctrl+C to stop");

    tokio::select! {
        res = &mut api => {
            // Server stopped without being asked to.
            res??;
            tracing::warn!("api server exited");
        }
        sig = shutdown_signal() => {
            sig?;
            tracing::info!("shutting down...");
            token.cancel();
            api.await??;
        }
    }

    if let Err(e) = registry.flush().await {
        tracing::error!(error = %e, "flush on shutdown failed");
    }
    tracing::info!("tns-server stopped");
    Ok(())
}

async fn open_store(database: &DatabaseUrl) -> Result<Arc<dyn TopicStore>, ServerError> {
    let store: Arc<dyn TopicStore> = match database {
        DatabaseUrl::Memory => Arc::new(MemoryStore::new()),
        DatabaseUrl::File(path) => Arc::new(FileStore::open(path.clone()).await?),
    };
    Ok(store)
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() -> Result<(), ServerError> {
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = sigterm.recv() => {}
    }
    Ok(())
}
