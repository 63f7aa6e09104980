use anyhow::Context;
use chrono::Utc;
use tracing::{error, info, warn, Instrument};

use storefront_sync::app_system::{setup_tracing, StorefrontSystem};
use storefront_sync::config::ApiConfig;
use storefront_sync::domain::Credentials;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    info!(base_url = %config.base_url, "Starting storefront sync");

    let system = StorefrontSystem::new(&config).context("failed to build HTTP client")?;

    let credentials = match (
        std::env::var("STOREFRONT_EMAIL"),
        std::env::var("STOREFRONT_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) => Some(Credentials { email, password }),
        _ => None,
    };

    if let Some(credentials) = credentials {
        let span = tracing::info_span!("login", email = %credentials.email);
        match system.login(credentials).instrument(span).await {
            Ok(user) => info!(user_id = %user.id, name = %user.name, "Logged in"),
            Err(e) => error!(error = %e, "Login failed"),
        }
    } else if system.session.is_authenticated() {
        let span = tracing::info_span!("cart_fetch");
        if let Err(e) = system.cart_client.fetch().instrument(span).await {
            error!(error = %e, "Cart fetch failed");
        }
    } else {
        warn!("No token or credentials configured, cart stays empty");
    }

    let span = tracing::info_span!("flash_sale");
    match system.settings.flash_sale_settings().instrument(span).await {
        Ok(settings) if settings.is_live(Utc::now()) => {
            info!(time_left = %settings.time_left(Utc::now()), "Flash sale is live")
        }
        Ok(_) => info!("No flash sale running"),
        Err(e) => warn!(error = %e, "Could not load flash sale settings"),
    }

    let snapshot = system.cart_client.snapshot().await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    system
        .shutdown()
        .await
        .map_err(anyhow::Error::msg)?;

    info!("Storefront sync finished");
    Ok(())
}
