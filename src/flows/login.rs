use tracing::{info, instrument};

use super::{Banner, FlowContext, FlowError, FlowState, FormState, Route, Submission, GOOGLE_SIGNIN_FAILED};
use crate::models::{LoginCredentials, Session};
use crate::utils::validation::{validate_email, validate_password, FieldValidation, PasswordPolicy};

pub const GOOGLE_SIGNIN_FAILED_MESSAGE: &str = "Google sign-in failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoginField {
    Email,
    Password,
}

/// Email/password sign-in screen
pub struct LoginFlow {
    ctx: FlowContext,
    email: String,
    password: String,
    form: FormState<LoginField>,
}

impl LoginFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self {
            ctx,
            email: String::new(),
            password: String::new(),
            form: FormState::new(),
        }
    }

    /// Screen opened; `error` is the `error` query parameter, if any
    pub fn mount(&mut self, error: Option<&str>) {
        if error == Some(GOOGLE_SIGNIN_FAILED) {
            self.form.show_banner(Banner::error(GOOGLE_SIGNIN_FAILED_MESSAGE));
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        let email = &self.email;
        self.form
            .edited(LoginField::Email, || validate_email(email).into());
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
        let password = &self.password;
        self.form.edited(LoginField::Password, || {
            validate_password(password, PasswordPolicy::Strict).into()
        });
    }

    pub fn form(&self) -> &FormState<LoginField> {
        &self.form
    }

    pub fn state(&self) -> FlowState {
        self.form.state()
    }

    /// Submit is disabled while either field is empty or a request is running
    pub fn is_submit_enabled(&self) -> bool {
        self.form.is_submit_enabled() && !self.email.is_empty() && !self.password.is_empty()
    }

    fn check_all(&self) -> [(LoginField, FieldValidation); 2] {
        [
            (LoginField::Email, validate_email(&self.email).into()),
            (
                LoginField::Password,
                validate_password(&self.password, PasswordPolicy::Strict).into(),
            ),
        ]
    }

    #[instrument(skip(self), fields(email = %self.email))]
    pub async fn submit(&mut self) -> Result<Submission, FlowError> {
        if !self.form.begin_submit() {
            return Ok(Submission::Ignored);
        }
        let results = self.check_all();
        if !self.form.finish_validation(results) {
            return Ok(Submission::Invalid);
        }

        let credentials = LoginCredentials {
            email: self.email.clone(),
            password: self.password.clone(),
        };

        let response = match self.ctx.gateway.login(&credentials).await {
            Ok(response) => response,
            Err(e) => return Err(self.form.fail(e.into())),
        };

        let session = Session::from(response);
        if let Err(e) = self.ctx.store.save(&session) {
            return Err(self.form.fail(e.into()));
        }

        info!(user_id = session.user.user_id, "Login succeeded");
        self.form.succeed(None);
        self.ctx.navigator.navigate(Route::Landing);
        Ok(Submission::Completed)
    }

    pub fn go_to_register(&self) {
        self.ctx.navigator.navigate(Route::Register);
    }

    pub fn go_to_forgot_password(&self) {
        self.ctx.navigator.navigate(Route::ForgotPasswordRequest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::testing::{context, login_response, navigator_expecting, navigator_unused};
    use crate::flows::MockNavigator;
    use crate::services::credential_store::keys;
    use crate::services::{GatewayError, KeyValueStorage, MockAuthGateway};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_login_scenario_stores_session_and_opens_landing() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_login()
            .with(eq(LoginCredentials {
                email: "a@b.com".to_string(),
                password: "Abcd123!".to_string(),
            }))
            .times(1)
            .returning(|_| Ok(login_response("T1")));

        let (ctx, store, storage) = context(gateway, navigator_expecting(Route::Landing));
        let mut flow = LoginFlow::new(ctx);
        flow.set_email("a@b.com");
        flow.set_password("Abcd123!");
        assert!(flow.is_submit_enabled());

        let outcome = flow.submit().await;
        tokio_test::assert_ok!(&outcome);
        assert_eq!(outcome.unwrap(), Submission::Completed);
        assert_eq!(flow.state(), FlowState::Success);

        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("T1"));
        assert_eq!(storage.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("R1"));
        assert_eq!(store.load().unwrap().unwrap().user.email, "a@b.com");

        // a second press after success does nothing
        assert_eq!(flow.submit().await.unwrap(), Submission::Ignored);
    }

    #[tokio::test]
    async fn test_invalid_fields_block_the_call() {
        let mut gateway = MockAuthGateway::new();
        gateway.expect_login().never();

        let (ctx, store, _) = context(gateway, navigator_unused());
        let mut flow = LoginFlow::new(ctx);
        flow.set_email("not-an-email");
        flow.set_password("abc");

        assert_eq!(flow.submit().await.unwrap(), Submission::Invalid);
        assert_eq!(flow.state(), FlowState::Editing);
        assert_eq!(
            flow.form().error(LoginField::Email),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            flow.form().error(LoginField::Password),
            Some("Password must be at least 8 characters long")
        );
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_errors_go_live_after_first_submit() {
        let (ctx, _, _) = context(MockAuthGateway::new(), navigator_unused());
        let mut flow = LoginFlow::new(ctx);

        flow.set_email("bad");
        assert_eq!(flow.form().error(LoginField::Email), None);

        flow.submit().await.unwrap();
        assert_eq!(
            flow.form().error(LoginField::Email),
            Some("Please enter a valid email address")
        );

        flow.set_email("a@b.com");
        assert_eq!(flow.form().error(LoginField::Email), None);
    }

    #[tokio::test]
    async fn test_rejected_login_shows_server_message() {
        let mut gateway = MockAuthGateway::new();
        gateway.expect_login().times(1).returning(|_| {
            Err(GatewayError::Rejected {
                status: 401,
                message: "Invalid credentials".to_string(),
            })
        });

        let (ctx, store, _) = context(gateway, navigator_unused());
        let mut flow = LoginFlow::new(ctx);
        flow.set_email("a@b.com");
        flow.set_password("Abcd123!");

        let error = flow.submit().await.unwrap_err();
        assert_eq!(error, FlowError::Auth("Invalid credentials".to_string()));
        assert_eq!(flow.state(), FlowState::Failed);
        assert_eq!(
            flow.form().banner().map(|b| b.message.as_str()),
            Some("Invalid credentials")
        );
        assert!(flow.is_submit_enabled());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_submit_disabled_while_fields_empty() {
        let (ctx, _, _) = context(MockAuthGateway::new(), navigator_unused());
        let mut flow = LoginFlow::new(ctx);
        assert!(!flow.is_submit_enabled());

        flow.set_email("a@b.com");
        assert!(!flow.is_submit_enabled());
    }

    #[test]
    fn test_mount_with_google_failure_shows_banner() {
        let (ctx, _, _) = context(MockAuthGateway::new(), navigator_unused());
        let mut flow = LoginFlow::new(ctx);
        flow.mount(Some("google_signin_failed"));

        assert_eq!(
            flow.form().banner().map(|b| b.message.as_str()),
            Some(GOOGLE_SIGNIN_FAILED_MESSAGE)
        );
    }

    #[test]
    fn test_links() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(Route::Register))
            .times(1)
            .return_const(());
        navigator
            .expect_navigate()
            .with(eq(Route::ForgotPasswordRequest))
            .times(1)
            .return_const(());

        let (ctx, _, _) = context(MockAuthGateway::new(), navigator);
        let flow = LoginFlow::new(ctx);
        flow.go_to_register();
        flow.go_to_forgot_password();
    }
}
