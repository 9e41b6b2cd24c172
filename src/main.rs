//! RAX Auth Server - Entry Point
//!
//! Serves signup, signin and session commands over a line protocol,
//! backed by a persistent credential store.

use log::info;

use rax_auth::config::ServerConfig;
use rax_auth::error::ServerError;
use rax_auth::error::handlers::handle_error;
use rax_auth::server::Server;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    if let Err(e) = run().await {
        handle_error(&e);
        return Err(e);
    }

    Ok(())
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;

    info!("Launching auth server...");

    let server = Server::new(config).await?;
    server.start().await;

    Ok(())
}
