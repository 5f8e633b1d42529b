use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use sso::{
    app,
    config::{AppConfig, Env},
    state::AppState,
};

fn init_tracing(env: Env) {
    let default_filter = match env {
        Env::Local | Env::Dev => "sso=debug,tower_http=info,sqlx=warn",
        Env::Prod => "sso=info,tower_http=info,sqlx=warn",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match env {
        Env::Local => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
        Env::Dev | Env::Prod => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.env);
    tracing::info!(
        env = ?config.env,
        port = config.port,
        token_ttl_secs = config.token_ttl.as_secs(),
        request_timeout_secs = config.request_timeout.as_secs(),
        "starting sso"
    );

    let pool = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.request_timeout)
                .connect(url)
                .await
                .context("connect to database")?;
            sqlx::migrate!("./migrations")
                .run(&db)
                .await
                .context("run migrations")?;
            Some(db)
        }
        None => None,
    };

    let state = AppState::init(&config, pool).await?;
    let app = app::build_app(state, config.request_timeout);
    app::serve(app, &config).await
}
