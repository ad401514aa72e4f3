//! Username and password format rules

use crate::{config::SecurityConfig, error::AppError};
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9 ]{6,20}$").expect("valid username regex"));

pub const USERNAME_RULE: &str =
    "Username must be 6 to 20 characters long and contain only letters, digits and spaces";

/// Password requirements. `Default` is the baseline policy: at least 8
/// characters with a lowercase letter, an uppercase letter, a digit and a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_lowercase: true,
            require_uppercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl PasswordPolicy {
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            require_lowercase: config.password_require_lowercase,
            require_uppercase: config.password_require_uppercase,
            require_digit: config.password_require_digit,
            require_special: config.password_require_special,
        }
    }

    /// Validate a username candidate
    pub fn validate_username(&self, username: &str) -> Result<(), AppError> {
        if USERNAME_RE.is_match(username) {
            Ok(())
        } else {
            Err(AppError::Validation(USERNAME_RULE.to_string()))
        }
    }

    /// Validate a password candidate. All unmet requirements fail with the
    /// same message describing the full rule.
    pub fn validate_password(&self, password: &str) -> Result<(), AppError> {
        let long_enough = password.chars().count() >= self.min_length;
        let lower = !self.require_lowercase || password.chars().any(|c| c.is_ascii_lowercase());
        let upper = !self.require_uppercase || password.chars().any(|c| c.is_ascii_uppercase());
        let digit = !self.require_digit || password.chars().any(|c| c.is_ascii_digit());
        let special =
            !self.require_special || password.chars().any(|c| !c.is_ascii_alphanumeric());

        if long_enough && lower && upper && digit && special {
            Ok(())
        } else {
            Err(AppError::Validation(self.password_rule()))
        }
    }

    fn password_rule(&self) -> String {
        let mut classes = Vec::new();
        if self.require_lowercase {
            classes.push("a lowercase letter");
        }
        if self.require_uppercase {
            classes.push("an uppercase letter");
        }
        if self.require_digit {
            classes.push("a digit");
        }
        if self.require_special {
            classes.push("a special character");
        }

        if classes.is_empty() {
            format!("Password must be at least {} characters long", self.min_length)
        } else {
            format!(
                "Password must be at least {} characters long and include {}",
                self.min_length,
                classes.join(", ")
            )
        }
    }
}
