pub use common::logging_stdout;
use common::proxy::AnthropicClient;
use tracing::info;
use volo_http::Address;
use volo_http::server::Server;

pub mod config;
pub mod error;
pub mod handlers;
pub mod tools;

pub use config::Config;
pub use handlers::AppState;

use error::{Error, Result};

pub async fn run_api_server(config: Config) -> Result<()> {
    let upstream = AnthropicClient::new(config.upstream_url.clone())?;
    info!(upstream=%upstream.endpoint(), static_dir=%config.static_dir.display(), "relay configured");
    let app = handlers::router(AppState::new(upstream, config.static_dir));

    info!("listening on http://{}", config.addr);
    let addr = Address::from(config.addr);
    Server::new(app)
        .run(addr)
        .await
        .map_err(|e| Error::Server(e.to_string().into()))
}
