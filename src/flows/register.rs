use tracing::{info, instrument};

use super::{Banner, FlowContext, FlowError, FlowState, FormState, Route, Submission};
use crate::models::{RegistrationRequest, Role};
use crate::utils::validation::{
    validate_address, validate_email, validate_name, validate_password, validate_phone_number,
    validate_role, FieldValidation, PasswordPolicy,
};

pub const REGISTRATION_SUCCESS_MESSAGE: &str = "Registration successful! Redirecting to login...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RegisterField {
    FirstName,
    LastName,
    Email,
    Role,
    PhoneNumber,
    Address,
    Password,
}

/// Raw input of the registration screen
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub phone_number: String,
    pub address: String,
    pub password: String,
}

impl RegistrationForm {
    fn check(&self, field: RegisterField) -> FieldValidation {
        match field {
            RegisterField::FirstName => validate_name(&self.first_name, "First Name"),
            RegisterField::LastName => validate_name(&self.last_name, "Last Name"),
            RegisterField::Email => validate_email(&self.email),
            RegisterField::Role => validate_role(&self.role),
            RegisterField::PhoneNumber => validate_phone_number(&self.phone_number),
            RegisterField::Address => validate_address(&self.address),
            RegisterField::Password => validate_password(&self.password, PasswordPolicy::Strict),
        }
        .into()
    }

    /// Request body; `None` while role or phone number do not parse
    fn to_request(&self) -> Option<RegistrationRequest> {
        let role = self.role.parse::<Role>().ok()?;
        let phone_number = self.phone_number.trim().parse::<u64>().ok()?;

        Some(RegistrationRequest {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role,
            phone_number,
            address: self.address.clone(),
            password: self.password.clone(),
        })
    }
}

const ALL_FIELDS: [RegisterField; 7] = [
    RegisterField::FirstName,
    RegisterField::LastName,
    RegisterField::Email,
    RegisterField::Role,
    RegisterField::PhoneNumber,
    RegisterField::Address,
    RegisterField::Password,
];

/// Account creation screen. Success writes nothing to the credential store.
pub struct RegisterFlow {
    ctx: FlowContext,
    input: RegistrationForm,
    form: FormState<RegisterField>,
}

impl RegisterFlow {
    pub fn new(ctx: FlowContext) -> Self {
        Self {
            ctx,
            input: RegistrationForm::default(),
            form: FormState::new(),
        }
    }

    pub fn input(&self) -> &RegistrationForm {
        &self.input
    }

    pub fn form(&self) -> &FormState<RegisterField> {
        &self.form
    }

    pub fn state(&self) -> FlowState {
        self.form.state()
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.form.is_submit_enabled()
    }

    /// Change one field
    pub fn set(&mut self, field: RegisterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            RegisterField::FirstName => self.input.first_name = value,
            RegisterField::LastName => self.input.last_name = value,
            RegisterField::Email => self.input.email = value,
            RegisterField::Role => self.input.role = value,
            RegisterField::PhoneNumber => self.input.phone_number = value,
            RegisterField::Address => self.input.address = value,
            RegisterField::Password => self.input.password = value,
        }

        let input = &self.input;
        self.form.edited(field, || input.check(field));
    }

    /// Replace every field at once, as a pre-filled form would
    pub fn fill(&mut self, input: RegistrationForm) {
        self.input = input;
    }

    #[instrument(skip(self), fields(email = %self.input.email))]
    pub async fn submit(&mut self) -> Result<Submission, FlowError> {
        if !self.form.begin_submit() {
            return Ok(Submission::Ignored);
        }
        let results: Vec<_> = ALL_FIELDS
            .iter()
            .map(|field| (*field, self.input.check(*field)))
            .collect();
        if !self.form.finish_validation(results) {
            return Ok(Submission::Invalid);
        }

        let Some(request) = self.input.to_request() else {
            return Err(self.form.fail(FlowError::Validation {
                field: "role",
                message: "Please select a role".to_string(),
            }));
        };

        match self.ctx.gateway.register(&request).await {
            Ok(profile) => {
                info!(user_id = profile.id, role = %profile.role, "Registration succeeded");
                self.form.succeed(Some(Banner::success(REGISTRATION_SUCCESS_MESSAGE)));
                self.ctx.navigator.navigate(Route::Login);
                Ok(Submission::Completed)
            }
            Err(e) => Err(self.form.fail(e.into())),
        }
    }
}
