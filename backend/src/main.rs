use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use localforms_backend::{build_router, config::Config, db::connection::create_pool, state::AppState};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "localforms_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        mode = ?config.mode,
        database_url = %config.effective_database_url(),
        secret_key = %mask_secret(&config.secret_key),
        algorithm = %config.algorithm,
        access_token_expire_minutes = config.access_token_expire_minutes,
        refresh_token_expire_days = config.refresh_token_expire_days,
        "Loaded configuration from environment/.env"
    );

    let pool = create_pool(config.effective_database_url()).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app = build_router(AppState::new(pool, config));

    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
