use clap::Parser;

use authgate_server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    authgate_server::init_logging(&config)?;
    authgate_server::run(config).await
}
