use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::UserId;

/// Login request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/token/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub id: Option<UserId>,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user_id: UserId,
    pub email: String,
    pub user_role: String,
}

/// Profile kept next to the tokens under the `user_info` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: UserId,
    pub email: String,
    pub user_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Authenticated state of the current client
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub user: UserInfo,
}

pub const DEFAULT_TOKEN_TYPE: &str = "bearer";

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            user: UserInfo {
                user_id: response.user_id,
                email: response.email,
                user_role: response.user_role,
                picture: None,
                name: None,
            },
        }
    }
}

/// Body of `POST /auth/forgot-password/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Response of `POST /auth/forgot-password/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
    /// Reset ticket for the confirm step
    #[serde(default)]
    pub link: Option<String>,
}

/// Opaque token authorizing one password-reset confirmation
#[derive(Clone, PartialEq, Eq)]
pub struct ResetTicket(String);

impl ResetTicket {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tickets are credentials; keep them out of logs
impl fmt::Debug for ResetTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResetTicket(<{} chars>)", self.0.len())
    }
}

/// Body of `POST /auth/forgot-password-confirm/{token}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub new_password: String,
    pub confirm_password: String,
}

/// Response of `POST /auth/forgot-password-confirm/{token}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetConfirmResponse {
    pub message: String,
    #[serde(default)]
    pub success: bool,
}

/// Tokens issued by the Google callback exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Backend user returned by the Google callback exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthUser {
    pub id: UserId,
    pub email: String,
    pub role: String,
}

/// Google profile returned by the callback exchange
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleProfile {
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `GET /google/callback/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthCallbackResponse {
    pub tokens: OAuthTokens,
    pub user: OAuthUser,
    #[serde(default)]
    pub user_info: GoogleProfile,
}

impl From<OAuthCallbackResponse> for Session {
    fn from(response: OAuthCallbackResponse) -> Self {
        Self {
            access_token: response.tokens.access_token,
            refresh_token: response.tokens.refresh_token,
            token_type: response
                .tokens
                .token_type
                .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            user: UserInfo {
                user_id: response.user.id,
                email: response.user.email,
                user_role: response.user.role,
                picture: response.user_info.picture,
                name: response.user_info.name,
            },
        }
    }
}
