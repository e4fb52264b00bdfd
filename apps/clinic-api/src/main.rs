use anyhow::{Context, Result};
use clinic_api::auth::TokenService;
use clinic_api::config::{AppConfig, LogFormat};
use clinic_api::{built_info, routes, AppState};
use common_db::crypto::load_data_key;
use common_db::init_db_pool;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Sinal de parada recebido, encerrando...");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Configuração inválida")?;
    init_tracing(config.log_format);

    info!(
        "Iniciando {} v{} ({})",
        built_info::PKG_NAME,
        built_info::PKG_VERSION,
        built_info::PROFILE
    );

    let pool = init_db_pool(&config.db).await?;
    let data_key = load_data_key(&pool, &config.db.key_phrase)
        .await
        .context("Falha ao carregar a chave de dados")?;

    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
    let state = AppState::new(pool.clone(), data_key, tokens);
    let app = routes::router(state, &config);

    info!("Escutando em {}", config.bind_addr);
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Falha no servidor HTTP")?;

    pool.close().await;
    info!("Servidor encerrado");
    Ok(())
}
