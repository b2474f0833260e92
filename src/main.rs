use anyhow::Result;
use manifest_gateway::config::Settings;
use manifest_gateway::Application;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.logging.format == "json" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    init_tracing(&settings);

    info!(
        environment = %settings.application.environment,
        "Starting manifest gateway"
    );

    let app = Application::build(settings).await?;
    app.run().await?;

    Ok(())
}
