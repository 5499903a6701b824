use anyhow::Result;
use api_server::Config;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guard = api_server::logging_stdout();

    let config = Config::from_env()?;
    info!(port = config.addr.port(), "starting learnly server");

    api_server::run_api_server(config).await?;

    Ok(())
}
