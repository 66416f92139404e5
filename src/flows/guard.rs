use std::sync::Arc;
use tracing::{debug, warn};

use super::{FlowError, Navigator, Route};
use crate::models::Session;
use crate::services::CredentialStore;

/// Entry check for protected screens.
///
/// Presence of the token is all that is checked. A token without its
/// profile is treated as no session and the leftovers are cleared.
#[derive(Clone)]
pub struct RouteGuard {
    store: CredentialStore,
    navigator: Arc<dyn Navigator>,
}

impl RouteGuard {
    pub fn new(store: CredentialStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// The live session, or `SessionMissing` after redirecting to login.
    ///
    /// A store that cannot be read counts as no session.
    pub fn check(&self) -> Result<Session, FlowError> {
        let session = self.store.access_token().and_then(|token| match token {
            Some(_) => self.store.load(),
            None => Ok(None),
        });

        match session {
            Ok(Some(session)) => return Ok(session),
            Ok(None) => debug!("No usable session, redirecting to login"),
            Err(e) => warn!("Could not read stored session, redirecting to login: {}", e),
        }

        if let Err(e) = self.store.clear() {
            warn!("Failed to clear stored session: {}", e);
        }
        self.navigator.navigate(Route::Login);
        Err(FlowError::SessionMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::testing::user_info;
    use crate::flows::{MockNavigator, RecordingNavigator};
    use crate::services::credential_store::keys;
    use crate::services::{FileStorage, KeyValueStorage, MemoryStorage, StoreError};

    #[test]
    fn test_guard_without_session_is_idempotent() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(mockall::predicate::eq(Route::Login))
            .times(3)
            .return_const(());

        let guard = RouteGuard::new(CredentialStore::in_memory(), Arc::new(navigator));
        for _ in 0..3 {
            assert_eq!(guard.check().unwrap_err(), FlowError::SessionMissing);
        }
    }

    #[test]
    fn test_token_without_profile_is_cleared() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "T1".to_string()).unwrap();
        storage.set(keys::REFRESH_TOKEN, "R1".to_string()).unwrap();

        let navigator = Arc::new(RecordingNavigator::new());
        let guard = RouteGuard::new(CredentialStore::new(storage.clone()), navigator.clone());

        assert_eq!(guard.check().unwrap_err(), FlowError::SessionMissing);
        assert!(storage.keys().unwrap().is_empty());
        assert_eq!(navigator.routes(), vec![Route::Login]);
    }

    #[test]
    fn test_live_session_passes_without_navigation() {
        let store = CredentialStore::in_memory();
        store
            .save(&Session {
                access_token: "T1".to_string(),
                refresh_token: "R1".to_string(),
                token_type: "bearer".to_string(),
                user: user_info(),
            })
            .unwrap();

        let navigator = Arc::new(RecordingNavigator::new());
        let guard = RouteGuard::new(store, navigator.clone());

        assert_eq!(guard.check().unwrap().access_token, "T1");
        assert!(navigator.routes().is_empty());
    }

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Poisoned)
        }

        fn set_many(&self, _entries: &[(&str, String)]) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }

        fn remove_many(&self, _keys: &[&str]) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    #[test]
    fn test_unreadable_store_redirects_every_time() {
        let navigator = Arc::new(RecordingNavigator::new());
        let guard = RouteGuard::new(CredentialStore::new(Arc::new(BrokenStorage)), navigator.clone());

        for _ in 0..2 {
            assert_eq!(guard.check().unwrap_err(), FlowError::SessionMissing);
        }
        assert_eq!(navigator.routes(), vec![Route::Login, Route::Login]);
    }

    #[test]
    fn test_corrupt_state_file_redirects_and_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{truncated").unwrap();

        let store = CredentialStore::new(Arc::new(FileStorage::new(&path)));
        let navigator = Arc::new(RecordingNavigator::new());
        let guard = RouteGuard::new(store.clone(), navigator.clone());

        assert_eq!(guard.check().unwrap_err(), FlowError::SessionMissing);
        assert_eq!(navigator.routes(), vec![Route::Login]);

        store
            .save(&Session {
                access_token: "T1".to_string(),
                refresh_token: "R1".to_string(),
                token_type: "bearer".to_string(),
                user: user_info(),
            })
            .unwrap();
        assert_eq!(guard.check().unwrap().access_token, "T1");
    }
}
