use config::AppConfig;
use server::ChatAppServer;

pub mod auth;
pub mod command;
pub mod config;
pub mod event;
pub mod reply;
pub mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = AppConfig::from_env()?;
    let server = ChatAppServer::new(&config).await?;
    server.run().await
}
