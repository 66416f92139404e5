use tracing::{info, instrument, warn};

use super::{Banner, FlowContext, FlowError, FlowState, FormState, Route, Submission};
use crate::models::{PasswordResetConfirmRequest, ResetTicket};
use crate::utils::validation::{validate_confirm_password, validate_password, FieldValidation, PasswordPolicy};

pub const RESET_TICKET_MISSING_MESSAGE: &str = "No reset token found. Please request a new password reset.";
pub const PASSWORD_UPDATED_MESSAGE: &str = "Your password has been successfully updated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResetPasswordField {
    NewPassword,
    ConfirmPassword,
}

/// Whether the screen can submit at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    NotLoaded,
    Loaded,
    /// No ticket was held; the form is inert
    TicketMissing,
}

/// New-password screen that spends the held reset ticket
pub struct ResetPasswordFlow {
    ctx: FlowContext,
    ticket: Option<ResetTicket>,
    ticket_status: TicketStatus,
    new_password: String,
    confirm_password: String,
    form: FormState<ResetPasswordField>,
}

impl ResetPasswordFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self {
            ctx,
            ticket: None,
            ticket_status: TicketStatus::NotLoaded,
            new_password: String::new(),
            confirm_password: String::new(),
            form: FormState::new(),
        }
    }

    /// Load the held ticket; without one the screen only offers its links
    pub fn mount(&mut self) -> Result<(), FlowError> {
        match self.ctx.store.load_reset_ticket()? {
            Some(ticket) => {
                self.ticket = Some(ticket);
                self.ticket_status = TicketStatus::Loaded;
                Ok(())
            }
            None => {
                warn!("Reset confirm opened without a ticket");
                self.ticket_status = TicketStatus::TicketMissing;
                self.form.show_banner(Banner::info(RESET_TICKET_MISSING_MESSAGE));
                Err(FlowError::ResetTicketMissing(RESET_TICKET_MISSING_MESSAGE.to_string()))
            }
        }
    }

    pub fn ticket_status(&self) -> TicketStatus {
        self.ticket_status
    }

    pub fn set_new_password(&mut self, password: impl Into<String>) {
        self.new_password = password.into();
        let (new_password, confirm) = (&self.new_password, &self.confirm_password);

        self.form.edited(ResetPasswordField::NewPassword, || {
            validate_password(new_password, PasswordPolicy::Reset).into()
        });
        // the confirmation is compared against the new value
        self.form.edited(ResetPasswordField::ConfirmPassword, || {
            validate_confirm_password(confirm, new_password).into()
        });
    }

    pub fn set_confirm_password(&mut self, password: impl Into<String>) {
        self.confirm_password = password.into();
        let (new_password, confirm) = (&self.new_password, &self.confirm_password);
        self.form.edited(ResetPasswordField::ConfirmPassword, || {
            validate_confirm_password(confirm, new_password).into()
        });
    }

    pub fn form(&self) -> &FormState<ResetPasswordField> {
        &self.form
    }

    pub fn state(&self) -> FlowState {
        self.form.state()
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.ticket_status == TicketStatus::Loaded && self.form.is_submit_enabled()
    }

    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<Submission, FlowError> {
        // the ticket is spent once the form has succeeded
        if !self.form.is_submit_enabled() {
            return Ok(Submission::Ignored);
        }
        let Some(ticket) = self.ticket.clone() else {
            return Err(FlowError::ResetTicketMissing(RESET_TICKET_MISSING_MESSAGE.to_string()));
        };

        if !self.form.begin_submit() {
            return Ok(Submission::Ignored);
        }
        let results: [(ResetPasswordField, FieldValidation); 2] = [
            (
                ResetPasswordField::NewPassword,
                validate_password(&self.new_password, PasswordPolicy::Reset).into(),
            ),
            (
                ResetPasswordField::ConfirmPassword,
                validate_confirm_password(&self.confirm_password, &self.new_password).into(),
            ),
        ];
        if !self.form.finish_validation(results) {
            return Ok(Submission::Invalid);
        }

        let request = PasswordResetConfirmRequest {
            new_password: self.new_password.clone(),
            confirm_password: self.confirm_password.clone(),
        };

        let response = match self.ctx.gateway.confirm_password_reset(&ticket, &request).await {
            Ok(response) => response,
            Err(e) => return Err(self.form.fail(e.into())),
        };

        if let Err(e) = self.ctx.store.clear_reset_ticket() {
            return Err(self.form.fail(e.into()));
        }
        self.ticket = None;

        info!("Password reset confirmed");
        let message = if response.message.is_empty() {
            PASSWORD_UPDATED_MESSAGE.to_string()
        } else {
            response.message
        };
        self.form.succeed(Some(Banner::success(message)));
        Ok(Submission::Completed)
    }

    pub fn back_to_login(&self) {
        self.ctx.navigator.navigate(Route::Login);
    }

    pub fn request_new_reset(&self) {
        self.ctx.navigator.navigate(Route::ForgotPasswordRequest);
    }
}
