use tracing::{info, instrument, warn};

use super::{Banner, FlowContext, FlowError, FlowState, FormState, Route, Submission};
use crate::models::ResetTicket;
use crate::utils::validation::{validate_email, FieldValidation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ForgotPasswordField {
    Email,
}

/// Password-reset request screen.
///
/// A successful request leaves the returned ticket in the credential store
/// for the confirm screen.
pub struct ForgotPasswordFlow {
    ctx: FlowContext,
    email: String,
    form: FormState<ForgotPasswordField>,
}

impl ForgotPasswordFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self {
            ctx,
            email: String::new(),
            form: FormState::new(),
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        let email = &self.email;
        self.form
            .edited(ForgotPasswordField::Email, || validate_email(email).into());
    }

    pub fn form(&self) -> &FormState<ForgotPasswordField> {
        &self.form
    }

    pub fn state(&self) -> FlowState {
        self.form.state()
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.form.is_submit_enabled()
    }

    #[instrument(skip(self), fields(email = %self.email))]
    pub async fn submit(&mut self) -> Result<Submission, FlowError> {
        if !self.form.begin_submit() {
            return Ok(Submission::Ignored);
        }
        let result: FieldValidation = validate_email(&self.email).into();
        if !self.form.finish_validation([(ForgotPasswordField::Email, result)]) {
            return Ok(Submission::Invalid);
        }

        // an older ticket must not outlive a new request
        if let Err(e) = self.ctx.store.clear_reset_ticket() {
            return Err(self.form.fail(e.into()));
        }

        let response = match self.ctx.gateway.request_password_reset(&self.email).await {
            Ok(response) => response,
            Err(e) => return Err(self.form.fail(e.into())),
        };

        match response.link.filter(|link| !link.is_empty()) {
            Some(link) => {
                if let Err(e) = self.ctx.store.save_reset_ticket(&ResetTicket::new(link)) {
                    return Err(self.form.fail(e.into()));
                }
                info!("Password reset requested");
            }
            None => warn!("Password reset response carried no ticket"),
        }

        self.form.succeed(Some(Banner::success(response.message)));
        Ok(Submission::Completed)
    }

    /// Continue to the confirm screen after a successful request
    pub fn go_to_confirm(&self) {
        self.ctx.navigator.navigate(Route::ForgotPasswordConfirm);
    }

    pub fn back_to_login(&self) {
        self.ctx.navigator.navigate(Route::Login);
    }
}
