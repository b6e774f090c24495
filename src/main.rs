use anyhow::Context;
use order_splitter::config::Settings;
use order_splitter::models::AppState;
use order_splitter::routes;
use order_splitter::storage::{SessionStorage, StyleStorage};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_max_level(settings.log_level)
        .init();
    info!("Configuração de estilo em {}", settings.style_config_path.display());
    let sessions = SessionStorage::new(settings.session_ttl);
    tokio::spawn(sessions.clone().run_sweeper());
    let state = AppState::new(
        StyleStorage::new(settings.style_config_path.clone()),
        sessions,
    );
    let router = routes::init(state, &settings);
    let address = settings.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("não foi possível escutar em {address}"))?;
    info!("Servidor ouvindo em {address}");
    axum::serve(listener, router).await?;
    Ok(())
}
