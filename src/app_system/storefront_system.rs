use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::cart_actor::CartService;
use crate::clients::CartClient;
use crate::config::ApiConfig;
use crate::domain::{Credentials, User};
use crate::error::{ApiError, CartError};
use crate::gateway::{
    AuthGateway, CartGateway, CatalogGateway, HttpTransport, SettingsGateway, Transport,
};
use crate::session::Session;

/// Everything a storefront front-end talks to, wired around one session.
///
/// **Startup:** session and transport first, then the gateways sharing them,
/// then the cart service. **Shutdown:** stop the cart service and wait for it.
pub struct StorefrontSystem {
    pub cart_client: CartClient,
    pub auth: AuthGateway,
    pub catalog: CatalogGateway,
    pub settings: SettingsGateway,
    pub session: Session,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl StorefrontSystem {
    /// Starts the system against the HTTP backend in `config`.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Starts the system on any transport. Must be called within a Tokio runtime.
    #[instrument(name = "storefront_system", skip(config, transport), fields(base_url = %config.base_url))]
    pub fn with_transport(config: &ApiConfig, transport: Arc<dyn Transport>) -> Self {
        info!("Starting storefront system");

        let session = Session::new(config.initial_token.clone());

        let auth = AuthGateway::new(transport.clone(), session.clone());
        let catalog = CatalogGateway::new(transport.clone(), session.clone());
        let settings = SettingsGateway::new(transport.clone(), session.clone());

        let cart_gateway = CartGateway::new(transport, session.clone());
        let (cart_service, cart_client) = CartService::new(config.cart_buffer, cart_gateway);
        let handles = vec![tokio::spawn(cart_service.run())];

        info!("Storefront system started");
        Self {
            cart_client,
            auth,
            catalog,
            settings,
            session,
            handles,
        }
    }

    /// Logs in and loads the user's server cart.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: Credentials) -> Result<User, CartError> {
        let user = self.auth.login(credentials).await?;
        self.cart_client.reset().await?;
        self.cart_client.fetch().await?;
        Ok(user)
    }

    /// Drops the token and empties the local cart. The server cart is kept.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), CartError> {
        self.auth.logout();
        self.cart_client.reset().await
    }

    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down storefront system");

        let _ = self.cart_client.shutdown().await;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Service shutdown error");
            }
        }

        info!("Storefront system shutdown complete");
        Ok(())
    }
}
