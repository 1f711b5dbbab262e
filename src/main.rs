use anyhow::Result;
use netkit::config::Settings;
use netkit::Application;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    let settings = Settings::new()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        proxy = %settings.proxy_address(),
        admin = settings.admin_address().as_deref().unwrap_or("disabled"),
        "Starting netkit"
    );

    let app = Application::new(settings);
    app.run().await?;

    Ok(())
}
