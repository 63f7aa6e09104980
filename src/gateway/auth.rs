use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use super::transport::{ApiRequest, ApiResponse, Transport};
use super::{expect_success, path_segment, server_message};
use crate::domain::{AuthNotice, Credentials, Registration, User};
use crate::error::ApiError;
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

/// Login, registration and profile endpoints. Owns writes to the session token.
#[derive(Clone)]
pub struct AuthGateway {
    transport: Arc<dyn Transport>,
    session: Session,
}

impl AuthGateway {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self { transport, session }
    }

    #[instrument(fields(email = %credentials.email), skip(self, credentials))]
    pub async fn login(&self, credentials: Credentials) -> Result<User, ApiError> {
        debug!("Sending request");
        let request = ApiRequest::post("/api/auth/login").json(json!({
            "email": credentials.email,
            "password": credentials.password,
        }));
        let response = self.transport.send(request).await?;
        self.accept_token(response, "Login failed")
    }

    #[instrument(fields(email = %registration.email), skip(self, registration))]
    pub async fn register(&self, registration: Registration) -> Result<User, ApiError> {
        debug!("Sending request");
        let request = ApiRequest::post("/api/auth/register").json(json!({
            "name": registration.name,
            "email": registration.email,
            "password": registration.password,
        }));
        let response = self.transport.send(request).await?;
        self.accept_token(response, "Registration failed")
    }

    /// Validates the held token against `GET /api/auth/me`.
    ///
    /// A token the server rejects is dropped from the session.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let Some(token) = self.session.token() else {
            debug!("No token in session");
            return Err(ApiError::AuthRequired);
        };

        debug!("Sending request");
        let request = ApiRequest::get("/api/auth/me").bearer(Some(token));
        let response = self.transport.send(request).await?;
        let status = response.status;
        let body = expect_success(response, "Invalid token").map_err(|e| {
            warn!(status, "Token rejected, clearing session");
            self.session.clear();
            e
        })?;

        let envelope: AuthEnvelope =
            serde_json::from_value(body.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;
        match envelope.user {
            Some(user) if envelope.success => {
                info!(user_id = %user.id, role = %user.role, "Token validated");
                Ok(user)
            }
            _ => Err(ApiError::request(
                status,
                server_message(&body, "Token validation failed"),
            )),
        }
    }

    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<AuthNotice, ApiError> {
        let request =
            ApiRequest::post("/api/auth/forgot-password").json(json!({ "email": email }));
        self.notice(request, "Failed to send password reset email").await
    }

    /// Sets a new password using the token from a reset email.
    #[instrument(skip(self, token, password))]
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<AuthNotice, ApiError> {
        let request = ApiRequest::post(format!("/api/auth/reset-password/{}", path_segment(token)))
            .json(json!({ "password": password }));
        self.notice(request, "Failed to reset password").await
    }

    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<AuthNotice, ApiError> {
        let request = ApiRequest::get(format!("/api/auth/verify-email/{}", path_segment(token)));
        self.notice(request, "Email verification failed").await
    }

    #[instrument(skip(self))]
    pub async fn resend_verification(&self, email: &str) -> Result<AuthNotice, ApiError> {
        let request =
            ApiRequest::post("/api/auth/resend-verification").json(json!({ "email": email }));
        self.notice(request, "Failed to resend verification email").await
    }

    /// Forgets the token. No request is made.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        if self.session.clear() {
            info!("Logged out");
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sends an unauthenticated account request; any 2xx is an acknowledgement.
    async fn notice(&self, request: ApiRequest, fallback: &str) -> Result<AuthNotice, ApiError> {
        debug!("Sending request");
        let body = expect_success(self.transport.send(request).await?, fallback).map_err(|e| {
            error!(error = %e, "Account request rejected");
            e
        })?;
        if body.is_null() {
            return Ok(AuthNotice::default());
        }
        let notice: AuthNotice =
            serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        info!(message = ?notice.message, "Account request accepted");
        Ok(notice)
    }

    fn accept_token(&self, response: ApiResponse, fallback: &str) -> Result<User, ApiError> {
        let status = response.status;
        let body = expect_success(response, fallback).map_err(|e| {
            error!(error = %e, "Authentication rejected");
            e
        })?;
        let envelope: AuthEnvelope =
            serde_json::from_value(body.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;

        match envelope {
            AuthEnvelope {
                success: true,
                token: Some(token),
                user: Some(user),
            } => {
                self.session.set_token(token);
                info!(user_id = %user.id, "Authenticated");
                Ok(user)
            }
            _ => {
                let message = server_message(&body, fallback);
                error!(error = %message, "Authentication unsuccessful");
                Err(ApiError::request(status, message))
            }
        }
    }
}
