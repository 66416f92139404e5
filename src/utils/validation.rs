use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::ValidationError;

use crate::models::Role;

/// Characters counted as "special" by the password and name rules
pub const SPECIAL_CHARACTERS: &str = "@$!%*?&";

pub const NAME_MAX_LENGTH: usize = 10;
pub const ADDRESS_MAX_LENGTH: usize = 20;
pub const PASSWORD_MIN_LENGTH: usize = 8;

fn email_pattern() -> &'static Regex {
    static RE_EMAIL: OnceLock<Regex> = OnceLock::new();
    RE_EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

fn has_lowercase(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_lowercase())
}

fn has_uppercase(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_uppercase())
}

fn has_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}

fn has_special(value: &str) -> bool {
    value.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

fn rule_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// User-facing message of a rule failure
pub fn error_message(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// Outcome of validating a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidation {
    pub valid: bool,
    pub message: String,
}

impl FieldValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }
}

impl From<Result<(), ValidationError>> for FieldValidation {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(error) => Self {
                valid: false,
                message: error_message(&error),
            },
        }
    }
}

/// Password rule sets.
///
/// Login and registration require a special character; the reset-confirm
/// screen does not. The two are kept apart on purpose and must not be merged
/// without a matching backend change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    /// Login and registration
    Strict,
    /// Password-reset confirmation
    Reset,
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(rule_error("required", "Email is required"));
    }

    if !email_pattern().is_match(email) {
        return Err(rule_error("email", "Please enter a valid email address"));
    }

    Ok(())
}

/// Validate a password against `policy`; the first failing rule wins
pub fn validate_password(password: &str, policy: PasswordPolicy) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(rule_error("required", "Password is required"));
    }

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(rule_error("length", "Password must be at least 8 characters long"));
    }

    match policy {
        PasswordPolicy::Strict => {
            if !has_lowercase(password) {
                return Err(rule_error("lowercase", "Password must contain at least one lowercase letter"));
            }
            if !has_uppercase(password) {
                return Err(rule_error("uppercase", "Password must contain at least one uppercase letter"));
            }
            if !has_digit(password) {
                return Err(rule_error("digit", "Password must contain at least one number"));
            }
            if !has_special(password) {
                return Err(rule_error(
                    "special",
                    "Password must contain at least one special character (@$!%*?&)",
                ));
            }
        }
        PasswordPolicy::Reset => {
            if !(has_lowercase(password) && has_uppercase(password) && has_digit(password)) {
                return Err(rule_error(
                    "complexity",
                    "Password must contain at least one uppercase letter, one lowercase letter, and one number",
                ));
            }
        }
    }

    Ok(())
}

/// Validate the confirmation field against its sibling password
pub fn validate_confirm_password(confirm: &str, password: &str) -> Result<(), ValidationError> {
    if confirm.is_empty() {
        return Err(rule_error("required", "Please confirm your password"));
    }

    if confirm != password {
        return Err(rule_error("mismatch", "Passwords do not match"));
    }

    Ok(())
}

/// Validate a first or last name; `label` prefixes the messages
pub fn validate_name(name: &str, label: &str) -> Result<(), ValidationError> {
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(rule_error("length", format!("{} cannot be more than 10 characters", label)));
    }

    if has_digit(name) {
        return Err(rule_error("digit", format!("{} cannot contain number", label)));
    }

    if has_special(name) {
        return Err(rule_error("special", format!("{} cannot contain special characters", label)));
    }

    Ok(())
}

/// Validate a street address
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.chars().count() > ADDRESS_MAX_LENGTH {
        return Err(rule_error("length", "Address cannot be more than 20 characters"));
    }

    if has_digit(address) {
        return Err(rule_error("digit", "Address cannot contain number"));
    }

    if has_special(address) {
        return Err(rule_error("special", "Address cannot contain special characters"));
    }

    Ok(())
}

/// Validate the role selector
pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    if role.trim().is_empty() || role.parse::<Role>().is_err() {
        return Err(rule_error("role", "Please select a role"));
    }

    Ok(())
}

/// Validate a phone number (digits only)
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(rule_error("required", "Phone number is required"));
    }

    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(rule_error("digits", "Phone number must contain only digits"));
    }

    if phone.parse::<u64>().is_err() {
        return Err(rule_error("length", "Phone number is too long"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), ValidationError>) -> String {
        FieldValidation::from(result).message
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(message(validate_email("")), "Email is required");
        assert_eq!(message(validate_email("a@b")), "Please enter a valid email address");
        assert_eq!(message(validate_email("a b@c.com")), "Please enter a valid email address");
        assert_eq!(message(validate_email("a@@b.com")), "Please enter a valid email address");
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last@mail.example.org").is_ok());
    }

    #[test]
    fn test_strict_password_first_failing_rule_wins() {
        let cases = [
            ("", "Password is required"),
            ("Ab1!", "Password must be at least 8 characters long"),
            ("ABCD1234!", "Password must contain at least one lowercase letter"),
            ("abcd1234!", "Password must contain at least one uppercase letter"),
            ("Abcdefgh!", "Password must contain at least one number"),
            ("Abcd1234", "Password must contain at least one special character (@$!%*?&)"),
            // short and missing everything else: length is reported first
            ("abc", "Password must be at least 8 characters long"),
            // missing lowercase and digit: lowercase is reported first
            ("ABCDEFGH!", "Password must contain at least one lowercase letter"),
        ];

        for (password, expected) in cases {
            let result = FieldValidation::from(validate_password(password, PasswordPolicy::Strict));
            assert!(!result.valid, "{:?} should be invalid", password);
            assert_eq!(result.message, expected, "password {:?}", password);
        }

        assert!(validate_password("Abcd123!", PasswordPolicy::Strict).is_ok());
    }

    #[test]
    fn test_reset_policy_differs_only_by_special_character() {
        // Valid under reset, rejected under strict for the special character alone
        for password in ["Abcd1234", "Password1", "zZ9zzzzz"] {
            assert!(validate_password(password, PasswordPolicy::Reset).is_ok());
            let strict = validate_password(password, PasswordPolicy::Strict).unwrap_err();
            assert_eq!(strict.code, "special");
        }

        // Both policies agree on everything else
        for password in ["", "Ab1", "abcdefg1", "ABCDEFG1", "Abcdefgh"] {
            assert!(validate_password(password, PasswordPolicy::Reset).is_err());
            assert!(validate_password(password, PasswordPolicy::Strict).is_err());
        }
        assert!(validate_password("Abcd123!", PasswordPolicy::Reset).is_ok());
        assert!(validate_password("Abcd123!", PasswordPolicy::Strict).is_ok());
    }

    #[test]
    fn test_reset_policy_messages() {
        assert_eq!(message(validate_password("", PasswordPolicy::Reset)), "Password is required");
        assert_eq!(
            message(validate_password("Ab1", PasswordPolicy::Reset)),
            "Password must be at least 8 characters long"
        );
        assert_eq!(
            message(validate_password("abcdefg1", PasswordPolicy::Reset)),
            "Password must contain at least one uppercase letter, one lowercase letter, and one number"
        );
    }

    #[test]
    fn test_confirm_password_valid_iff_equal() {
        let pairs = [
            ("Abcd123!", "Abcd123!"),
            ("Abcd123!", "abcd123!"),
            ("x", "x"),
            ("x", "y"),
            ("Abcd123! ", "Abcd123!"),
            ("ünïcode", "ünïcode"),
        ];

        for (confirm, password) in pairs {
            let valid = validate_confirm_password(confirm, password).is_ok();
            assert_eq!(valid, confirm == password, "{:?} vs {:?}", confirm, password);
        }

        assert_eq!(message(validate_confirm_password("", "Abcd123!")), "Please confirm your password");
        assert_eq!(message(validate_confirm_password("Abcd123?", "Abcd123!")), "Passwords do not match");
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("", "First Name").is_ok());
        assert!(validate_name("Ada", "First Name").is_ok());
        assert_eq!(
            message(validate_name("Bartholomew", "First Name")),
            "First Name cannot be more than 10 characters"
        );
        assert_eq!(message(validate_name("Ada2", "Last Name")), "Last Name cannot contain number");
        assert_eq!(
            message(validate_name("Ada!", "Last Name")),
            "Last Name cannot contain special characters"
        );
    }

    #[test]
    fn test_address_rules() {
        assert!(validate_address("Main Street").is_ok());
        assert_eq!(
            message(validate_address("A very long street address")),
            "Address cannot be more than 20 characters"
        );
        assert_eq!(message(validate_address("12 Main St")), "Address cannot contain number");
        assert_eq!(message(validate_address("Main & Co")), "Address cannot contain special characters");
    }

    #[test]
    fn test_role_and_phone_rules() {
        assert!(validate_role("hospital").is_ok());
        assert_eq!(message(validate_role("")), "Please select a role");
        assert_eq!(message(validate_role("pilot")), "Please select a role");

        assert!(validate_phone_number("08012345678").is_ok());
        assert_eq!(message(validate_phone_number("")), "Phone number is required");
        assert_eq!(message(validate_phone_number("+234 801")), "Phone number must contain only digits");
        assert_eq!(
            message(validate_phone_number("123456789012345678901234")),
            "Phone number is too long"
        );
    }
}
