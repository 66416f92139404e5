use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};
use url::Url;

use crate::config::ApiConfig;
use crate::metrics::GatewayMetrics;
use crate::models::{
    ErrorResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginCredentials, LoginResponse,
    OAuthCallbackResponse, PasswordResetConfirmRequest, PasswordResetConfirmResponse, ProfileRecord,
    RegistrationRequest, ResetTicket,
};
use crate::tracing::CorrelationId;
use crate::utils::http::{api_url, bearer_header, path_segment, CORRELATION_ID_HEADER};

pub const NO_RESPONSE_MESSAGE: &str = "No response from server. Please try again.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred. Please try again.";
pub const INVALID_RESPONSE_MESSAGE: &str = "Unexpected response from server. Please try again.";

/// Gateway error, already reduced to the message shown to the user
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request went out but no response came back
    #[error("No response from server. Please try again.")]
    NoResponse,

    /// The request could not be sent at all
    #[error("Network error occurred. Please try again.")]
    Network,

    /// The server answered with a body we could not read
    #[error("Unexpected response from server. Please try again.")]
    InvalidResponse,

    #[error("Gateway configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Metric label for this failure
    pub fn outcome(&self) -> &'static str {
        match self {
            GatewayError::Rejected { .. } => "rejected",
            GatewayError::NoResponse => "no_response",
            GatewayError::Network => "network_error",
            GatewayError::InvalidResponse => "invalid_response",
            GatewayError::Configuration(_) => "configuration_error",
        }
    }

    fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_builder() {
            GatewayError::Network
        } else if error.is_connect() || error.is_timeout() || error.is_request() {
            GatewayError::NoResponse
        } else {
            GatewayError::Network
        }
    }
}

/// Backend capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOperation {
    Login,
    Register,
    RequestPasswordReset,
    ConfirmPasswordReset,
    ExchangeOAuthCode,
    Logout,
}

impl GatewayOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayOperation::Login => "login",
            GatewayOperation::Register => "register",
            GatewayOperation::RequestPasswordReset => "request_password_reset",
            GatewayOperation::ConfirmPasswordReset => "confirm_password_reset",
            GatewayOperation::ExchangeOAuthCode => "exchange_oauth_code",
            GatewayOperation::Logout => "logout",
        }
    }

    /// Message used when the server rejects the call without saying why
    pub fn rejection_fallback(&self) -> &'static str {
        match self {
            GatewayOperation::Login => "Login Failed. Please check credentials",
            GatewayOperation::Register => "Registration Failed...",
            GatewayOperation::RequestPasswordReset => "Failed to send reset email. Please try again.",
            GatewayOperation::ConfirmPasswordReset => "Failed to reset password. Please try again.",
            GatewayOperation::ExchangeOAuthCode => "Google sign-in failed.",
            GatewayOperation::Logout => "Logout failed.",
        }
    }
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only component that talks to the backend.
///
/// One request per call, no retries. Only `logout` is authenticated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, GatewayError>;

    async fn register(&self, request: &RegistrationRequest) -> Result<ProfileRecord, GatewayError>;

    async fn request_password_reset(&self, email: &str) -> Result<ForgotPasswordResponse, GatewayError>;

    async fn confirm_password_reset(
        &self,
        ticket: &ResetTicket,
        request: &PasswordResetConfirmRequest,
    ) -> Result<PasswordResetConfirmResponse, GatewayError>;

    async fn exchange_oauth_code(&self, code: &str) -> Result<OAuthCallbackResponse, GatewayError>;

    async fn logout(&self, access_token: &str) -> Result<(), GatewayError>;
}

/// `AuthGateway` over HTTP with reqwest
pub struct HttpAuthGateway {
    client: Client,
    base_url: Url,
    metrics: Option<GatewayMetrics>,
}

impl HttpAuthGateway {
    pub fn new(config: &ApiConfig, metrics: Option<GatewayMetrics>) -> Result<Self, GatewayError> {
        let base_url = config
            .url()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            metrics,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        api_url(&self.base_url, path).map_err(|e| GatewayError::Configuration(e.to_string()))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: GatewayOperation,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = self.call_raw(operation, request).await?;

        response.json::<T>().await.map_err(|e| {
            warn!(operation = %operation, "Failed to decode response: {}", e);
            GatewayError::InvalidResponse
        })
    }

    async fn call_raw(
        &self,
        operation: GatewayOperation,
        request: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        let correlation_id = CorrelationId::new();
        let span = tracing::info_span!(
            "gateway_request",
            operation = %operation,
            correlation_id = %correlation_id
        );

        let started = Instant::now();
        let result = Self::dispatch(operation, request, &correlation_id)
            .instrument(span)
            .await;

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "success",
                Err(e) => e.outcome(),
            };
            metrics.record_request(operation.as_str(), outcome, started.elapsed().as_secs_f64());
        }

        result
    }

    async fn dispatch(
        operation: GatewayOperation,
        request: RequestBuilder,
        correlation_id: &CorrelationId,
    ) -> Result<Response, GatewayError> {
        debug!("Sending request");

        let response = request
            .header(CORRELATION_ID_HEADER, correlation_id.as_str())
            .send()
            .await
            .map_err(|e| {
                warn!("Request failed before a response arrived: {}", e);
                GatewayError::from_transport(&e)
            })?;

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|error| error.user_message())
            .unwrap_or_else(|| operation.rejection_fallback().to_string());

        warn!(status = status.as_u16(), "Request rejected: {}", message);
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, GatewayError> {
        let url = self.endpoint("/auth/token/")?;
        self.call(GatewayOperation::Login, self.client.post(url).json(credentials))
            .await
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<ProfileRecord, GatewayError> {
        let url = self.endpoint("/auth/create_users/")?;
        self.call(GatewayOperation::Register, self.client.post(url).json(request))
            .await
    }

    async fn request_password_reset(&self, email: &str) -> Result<ForgotPasswordResponse, GatewayError> {
        let url = self.endpoint("/auth/forgot-password/")?;
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.call(GatewayOperation::RequestPasswordReset, self.client.post(url).json(&body))
            .await
    }

    async fn confirm_password_reset(
        &self,
        ticket: &ResetTicket,
        request: &PasswordResetConfirmRequest,
    ) -> Result<PasswordResetConfirmResponse, GatewayError> {
        let url = self.endpoint(&format!(
            "/auth/forgot-password-confirm/{}/",
            path_segment(ticket.as_str())
        ))?;
        self.call(GatewayOperation::ConfirmPasswordReset, self.client.post(url).json(request))
            .await
    }

    async fn exchange_oauth_code(&self, code: &str) -> Result<OAuthCallbackResponse, GatewayError> {
        let url = self.endpoint("/google/callback/")?;
        self.call(
            GatewayOperation::ExchangeOAuthCode,
            self.client.get(url).query(&[("code", code)]),
        )
        .await
    }

    async fn logout(&self, access_token: &str) -> Result<(), GatewayError> {
        let url = self.endpoint("/auth/logout/")?;
        let authorization = bearer_header(access_token)
            .map_err(|e| GatewayError::Configuration(format!("Invalid access token: {}", e)))?;

        let request = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        self.call_raw(GatewayOperation::Logout, request).await.map(|_| ())
    }
}
