//! Annotator Server binary
//!
//! Reads `.env` when present, then `server.*` and `ANNOTATOR_SERVER__*`
//! variables, and serves the annotation API.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;
    server::start_server(config).await?;

    Ok(())
}
