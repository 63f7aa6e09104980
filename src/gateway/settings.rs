use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::transport::{ApiRequest, Transport};
use super::{decode_field, expect_success};
use crate::domain::{FlashSaleSettings, HomeSettings};
use crate::error::ApiError;
use crate::session::Session;

/// Storefront-wide settings documents.
#[derive(Clone)]
pub struct SettingsGateway {
    transport: Arc<dyn Transport>,
    session: Session,
}

impl SettingsGateway {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self { transport, session }
    }

    /// The settings document is stored as `{ key, value }`; older deployments
    /// answer with the bare object or a `settings`/`data` wrapper.
    #[instrument(skip(self))]
    pub async fn flash_sale_settings(&self) -> Result<FlashSaleSettings, ApiError> {
        debug!("Sending request");
        let request = ApiRequest::get("/api/settings/flash-sale").bearer(self.session.token());
        let body = expect_success(
            self.transport.send(request).await?,
            "Failed to fetch flash sale settings",
        )?;
        let settings: FlashSaleSettings =
            decode_field(&body, &["value", "settings", "data"], true)?;
        info!(active = settings.is_active, end_time = ?settings.end_time, "Flash sale settings loaded");
        Ok(settings)
    }

    #[instrument(skip(self))]
    pub async fn home_settings(&self) -> Result<HomeSettings, ApiError> {
        debug!("Sending request");
        let request = ApiRequest::get("/api/settings/home").bearer(self.session.token());
        let body = expect_success(
            self.transport.send(request).await?,
            "Failed to fetch home settings",
        )?;
        decode_field(&body, &[], true)
    }

    /// Like [`Self::home_settings`], falling back to the built-in hero on any failure.
    pub async fn home_settings_or_default(&self) -> HomeSettings {
        match self.home_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Using default home settings");
                HomeSettings::default()
            }
        }
    }
}
