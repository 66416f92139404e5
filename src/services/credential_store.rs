use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::{ResetTicket, Session, UserInfo, DEFAULT_TOKEN_TYPE};
use crate::services::storage::{KeyValueStorage, MemoryStorage, StoreError};

/// Storage keys, one per value
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const TOKEN_TYPE: &str = "token_type";
    pub const USER_INFO: &str = "user_info";
    pub const RESET_TICKET: &str = "passwordResetLink";

    /// Every key that belongs to the signed-in session
    pub const SESSION: [&str; 4] = [TOKEN, REFRESH_TOKEN, TOKEN_TYPE, USER_INFO];
}

/// Session and reset-ticket persistence shared by every screen.
///
/// A token counts as valid purely by being present; nothing here checks
/// expiry.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Replace the stored session in a single write
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        let user_info = serde_json::to_string(&session.user)?;

        self.storage.set_many(&[
            (keys::TOKEN, session.access_token.clone()),
            (keys::REFRESH_TOKEN, session.refresh_token.clone()),
            (keys::TOKEN_TYPE, session.token_type.clone()),
            (keys::USER_INFO, user_info),
        ])?;

        info!(
            user_id = session.user.user_id,
            role = %session.user.user_role,
            "Session stored"
        );
        Ok(())
    }

    /// The stored session, present only when both the token and the profile are
    pub fn load(&self) -> Result<Option<Session>, StoreError> {
        let Some(access_token) = self.access_token()? else {
            return Ok(None);
        };
        let Some(user) = self.user_info()? else {
            return Ok(None);
        };

        Ok(Some(Session {
            access_token,
            refresh_token: self.storage.get(keys::REFRESH_TOKEN)?.unwrap_or_default(),
            token_type: self
                .storage
                .get(keys::TOKEN_TYPE)?
                .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            user,
        }))
    }

    /// Remove every session key; the reset ticket is left alone
    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove_many(&keys::SESSION)?;
        debug!("Session cleared");
        Ok(())
    }

    pub fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.storage.get(keys::TOKEN)?.filter(|token| !token.is_empty()))
    }

    /// Stored profile; an unreadable record counts as missing
    pub fn user_info(&self) -> Result<Option<UserInfo>, StoreError> {
        let Some(raw) = self.storage.get(keys::USER_INFO)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(info) => Ok(Some(info)),
            Err(e) => {
                warn!("Ignoring unreadable user_info record: {}", e);
                Ok(None)
            }
        }
    }

    /// Hold `ticket` for the confirm screen, replacing any earlier one
    pub fn save_reset_ticket(&self, ticket: &ResetTicket) -> Result<(), StoreError> {
        self.storage.set(keys::RESET_TICKET, ticket.as_str().to_string())
    }

    pub fn load_reset_ticket(&self) -> Result<Option<ResetTicket>, StoreError> {
        Ok(self
            .storage
            .get(keys::RESET_TICKET)?
            .filter(|token| !token.is_empty())
            .map(ResetTicket::new))
    }

    pub fn clear_reset_ticket(&self) -> Result<(), StoreError> {
        self.storage.remove(keys::RESET_TICKET)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
