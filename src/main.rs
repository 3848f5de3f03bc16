use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use swipesense::cli;
use swipesense::config::AppConfig;
use swipesense::recommend::{HttpRecommendationClient, RecommendationClient};
use swipesense::store::{LibSqlStore, MemoryStore, SnapshotStore};
use swipesense::wizard::{WizardManager, WizardRouteState, wizard_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("💳 SwipeSense v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_base);
    eprintln!("   Wizard API: http://0.0.0.0:{}/api/wizard", config.port);

    // ── Store ───────────────────────────────────────────────────────────
    let store: Arc<dyn SnapshotStore> = if config.uses_memory_store() {
        eprintln!("   Store: in-memory");
        Arc::new(MemoryStore::new())
    } else {
        let store = LibSqlStore::new_local(Path::new(&config.db_path))
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path))?;
        eprintln!("   Store: {}", config.db_path);
        Arc::new(store)
    };

    // ── Backend client ──────────────────────────────────────────────────
    let client: Arc<dyn RecommendationClient> = Arc::new(HttpRecommendationClient::new(
        &config.api_base,
        config.request_timeout,
    )?);

    let manager = Arc::new(
        WizardManager::load(store, client, config.request_defaults.clone()).await,
    );

    // Startup health probe runs on its own; the wizard is usable before it lands.
    {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move {
            if manager.probe_health().await {
                tracing::info!("Recommendation backend connected");
            } else {
                tracing::warn!("Recommendation backend not reachable");
            }
        });
    }

    // ── REST server ─────────────────────────────────────────────────────
    let app = wizard_routes(WizardRouteState {
        manager: Arc::clone(&manager),
    });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Wizard server started");
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    if config.repl {
        eprintln!("   Type 'help' for commands. /quit to exit.\n");
        cli::run_repl(&manager, cli::stdin_lines()).await;
        server.abort();
    } else {
        server.await??;
    }

    Ok(())
}
