use tracing::{info, warn};

use super::{FlowContext, FlowError, Route};

/// Sign-out action.
///
/// The server call is best effort: local state is cleared and the login
/// screen opened whatever it returns.
pub struct LogoutFlow {
    ctx: FlowContext,
}

impl LogoutFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self) -> Result<(), FlowError> {
        match self.ctx.store.access_token() {
            Ok(Some(token)) => {
                if let Err(e) = self.ctx.gateway.logout(&token).await {
                    warn!("Server logout failed, clearing local session anyway: {}", e);
                }
            }
            Ok(None) => info!("No stored token, skipping server logout"),
            Err(e) => warn!("Could not read stored token: {}", e),
        }

        let cleared = self.ctx.store.clear();
        self.ctx.navigator.navigate(Route::Login);
        cleared?;

        info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::testing::{context, navigator_expecting, user_info};
    use crate::models::Session;
    use crate::services::credential_store::keys;
    use crate::services::{CredentialStore, FileStorage, GatewayError, KeyValueStorage, MockAuthGateway};
    use std::sync::Arc;
    use mockall::predicate::eq;

    fn session() -> Session {
        Session {
            access_token: "T1".to_string(),
            refresh_token: "R1".to_string(),
            token_type: "bearer".to_string(),
            user: user_info(),
        }
    }

    #[tokio::test]
    async fn test_logout_clears_every_session_key_on_success() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_logout()
            .with(eq("T1"))
            .times(1)
            .returning(|_| Ok(()));

        let (ctx, store, storage) = context(gateway, navigator_expecting(Route::Login));
        store.save(&session()).unwrap();

        LogoutFlow::new(ctx).run().await.unwrap();
        for key in keys::SESSION {
            assert_eq!(storage.get(key).unwrap(), None, "{} should be cleared", key);
        }
    }

    #[tokio::test]
    async fn test_logout_clears_every_session_key_on_failure() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_logout()
            .times(1)
            .returning(|_| Err(GatewayError::NoResponse));

        let (ctx, store, storage) = context(gateway, navigator_expecting(Route::Login));
        store.save(&session()).unwrap();

        LogoutFlow::new(ctx).run().await.unwrap();
        for key in keys::SESSION {
            assert_eq!(storage.get(key).unwrap(), None, "{} should be cleared", key);
        }
    }

    #[tokio::test]
    async fn test_logout_without_session_skips_server() {
        let mut gateway = MockAuthGateway::new();
        gateway.expect_logout().never();

        let (ctx, _, _) = context(gateway, navigator_expecting(Route::Login));
        LogoutFlow::new(ctx).run().await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_recovers_from_corrupt_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{truncated").unwrap();

        let mut gateway = MockAuthGateway::new();
        gateway.expect_logout().never();

        let store = CredentialStore::new(Arc::new(FileStorage::new(&path)));
        let ctx = FlowContext::new(Arc::new(gateway), store.clone(), Arc::new(navigator_expecting(Route::Login)));

        LogoutFlow::new(ctx).run().await.unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
