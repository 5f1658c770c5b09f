use tracing::info;
use twitch_box::api::{ApiServer, AppState};
use twitch_box::config::AppConfig;
use twitch_box::{logging, services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    logging::init_logging()?;

    let config = AppConfig::from_env()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        history_backend = %config.history_backend,
        previous_policy = %config.navigator.previous_policy,
        "Starting twitch-box"
    );

    let backend = services::build_history_backend(&config).await?;
    let client = services::build_http_client(&config)?;
    let skills = services::build_skills(&config, client, backend)?;

    let state = AppState::new()
        .with_skills(skills)
        .with_skill_app_id(config.skill_app_id.clone());
    let server = ApiServer::with_state(config.api.clone(), state);

    let cancel_token = server.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            cancel_token.cancel();
        }
    });

    server.run().await?;
    Ok(())
}
