//! Per-screen controllers for the sign-in, registration and password-reset screens

pub mod error;
pub mod form;
pub mod forgot_password;
pub mod guard;
pub mod landing;
pub mod login;
pub mod logout;
pub mod navigation;
pub mod oauth_callback;
pub mod register;
pub mod reset_password;

pub use error::*;
pub use form::*;
pub use forgot_password::*;
pub use guard::*;
pub use landing::*;
pub use login::*;
pub use logout::*;
pub use navigation::*;
pub use oauth_callback::*;
pub use register::*;
pub use reset_password::*;

use std::sync::Arc;

use crate::services::{AuthGateway, CredentialStore};

/// Capabilities every screen controller is built from
#[derive(Clone)]
pub struct FlowContext {
    pub gateway: Arc<dyn AuthGateway>,
    pub store: CredentialStore,
    pub navigator: Arc<dyn Navigator>,
}

impl FlowContext {
    pub fn new(gateway: Arc<dyn AuthGateway>, store: CredentialStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            gateway,
            store,
            navigator,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::models::{LoginResponse, UserInfo};
    use crate::services::{MemoryStorage, MockAuthGateway};

    /// Context over a fresh in-memory store and the given mocks
    pub fn context(
        gateway: MockAuthGateway,
        navigator: MockNavigator,
    ) -> (FlowContext, CredentialStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(storage.clone());
        let ctx = FlowContext::new(Arc::new(gateway), store.clone(), Arc::new(navigator));
        (ctx, store, storage)
    }

    /// Navigator expecting exactly one move to `route`
    pub fn navigator_expecting(route: Route) -> MockNavigator {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(mockall::predicate::eq(route))
            .times(1)
            .return_const(());
        navigator
    }

    /// Navigator that fails the test if it is used
    pub fn navigator_unused() -> MockNavigator {
        let mut navigator = MockNavigator::new();
        navigator.expect_navigate().never();
        navigator
    }

    pub fn login_response(token: &str) -> LoginResponse {
        LoginResponse {
            id: Some(1),
            access_token: token.to_string(),
            refresh_token: format!("R{}", &token[1..]),
            token_type: Some("bearer".to_string()),
            user_id: 1,
            email: "a@b.com".to_string(),
            user_role: "citizen".to_string(),
        }
    }

    pub fn user_info() -> UserInfo {
        UserInfo {
            user_id: 1,
            email: "a@b.com".to_string(),
            user_role: "citizen".to_string(),
            picture: None,
            name: None,
        }
    }
}
