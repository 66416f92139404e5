use tracing::{error, info, instrument, warn};

use super::{FlowContext, FlowError, Route};
use crate::models::Session;

/// Query parameters the identity provider sends back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

impl OAuthCallbackParams {
    /// Read `code` and `error` from a raw query string (with or without `?`)
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" if !value.is_empty() => params.code = Some(value.into_owned()),
                "error" if !value.is_empty() => params.error = Some(value.into_owned()),
                _ => {}
            }
        }

        params
    }
}

/// Landing point of the Google sign-in redirect. Has no form.
pub struct OAuthCallbackFlow {
    ctx: FlowContext,
}

impl OAuthCallbackFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    /// Finish the sign-in; every failure ends on the login screen's error route
    #[instrument(skip(self, params))]
    pub async fn mount(&self, params: &OAuthCallbackParams) -> Result<Route, FlowError> {
        let result = self.complete(params).await;
        let route = match &result {
            Ok(()) => Route::Landing,
            Err(_) => Route::LoginGoogleFailed,
        };
        self.ctx.navigator.navigate(route);
        result.map(|()| route)
    }

    async fn complete(&self, params: &OAuthCallbackParams) -> Result<(), FlowError> {
        if let Some(provider_error) = &params.error {
            warn!(error = %provider_error, "Google sign-in returned an error");
            return Err(FlowError::Auth(format!("Google sign-in error: {}", provider_error)));
        }

        let Some(code) = &params.code else {
            warn!("Google sign-in callback carried neither code nor error");
            return Err(FlowError::Auth("Missing authorization code".to_string()));
        };

        let response = self.ctx.gateway.exchange_oauth_code(code).await.map_err(|e| {
            error!("Token exchange failed: {}", e);
            FlowError::from(e)
        })?;

        let session = Session::from(response);
        self.ctx.store.save(&session)?;
        info!(user_id = session.user.user_id, "Google sign-in succeeded");
        Ok(())
    }
}
