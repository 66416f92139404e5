use std::fmt;
use std::sync::Mutex;

/// Screens the client can move to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    /// Login screen carrying the Google sign-in failure indicator
    LoginGoogleFailed,
    Register,
    Landing,
    ForgotPasswordRequest,
    ForgotPasswordConfirm,
}

/// Query value attached to the login route after a failed Google sign-in
pub const GOOGLE_SIGNIN_FAILED: &str = "google_signin_failed";

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/auth/login",
            Route::LoginGoogleFailed => "/auth/login?error=google_signin_failed",
            Route::Register => "/auth/register",
            Route::Landing => "/main/landing",
            Route::ForgotPasswordRequest => "/auth/forgot_password_request",
            Route::ForgotPasswordConfirm => "/auth/forgot_password_confirm",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Host-provided screen switcher
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only remembers where it was sent
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Route> {
        self.routes().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Login.path(), "/auth/login");
        assert_eq!(
            Route::LoginGoogleFailed.to_string(),
            format!("/auth/login?error={}", GOOGLE_SIGNIN_FAILED)
        );
        assert_eq!(Route::Landing.path(), "/main/landing");
        assert_eq!(Route::ForgotPasswordRequest.path(), "/auth/forgot_password_request");
    }

    #[test]
    fn test_recording_navigator() {
        let navigator = RecordingNavigator::new();
        assert_eq!(navigator.last(), None);

        navigator.navigate(Route::Register);
        navigator.navigate(Route::Login);
        assert_eq!(navigator.routes(), vec![Route::Register, Route::Login]);
        assert_eq!(navigator.last(), Some(Route::Login));
    }
}
