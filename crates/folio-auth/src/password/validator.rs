//! Password policy for principals created through the setup CLI.

use folio_core::config::AuthConfig;
use folio_core::error::AppError;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Checks `password` for the account `email`.
    ///
    /// Returns the first violation found. The email is fed to the strength
    /// estimator so passwords built from it score low.
    pub fn validate(&self, password: &str, email: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::validation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AppError::validation(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        if !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AppError::validation(
                "Password must contain at least one special character",
            ));
        }

        let local_part = email.split('@').next().unwrap_or(email);
        let estimate = zxcvbn::zxcvbn(password, &[email, local_part]);
        if estimate.score() < zxcvbn::Score::Three {
            return Err(AppError::validation(
                "Password is too weak. Please use a stronger password with more entropy.",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_short_password_rejected() {
        let err = validator().validate("Ab1!", "a@example.com").unwrap_err();
        assert!(err.message.contains("at least 12"));
    }

    #[test]
    fn test_missing_classes_rejected() {
        assert!(validator().validate("alllowercase1!x", "a@example.com").is_err());
        assert!(validator().validate("NoDigitsHere!!xx", "a@example.com").is_err());
        assert!(validator().validate("NoSpecials12345x", "a@example.com").is_err());
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validator()
            .validate("Tr0ubadour&Gr@nite-Lantern", "owner@example.com")
            .is_ok());
    }
}
