// src/users/validators.rs

use super::models::ProfileRequest;
use crate::common::validation::is_plausible_email;
use crate::common::{ValidationResult, Validator};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_USERNAME_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validates signup and full profile update payloads
pub struct ProfileValidator;

impl Validator<ProfileRequest> for ProfileValidator {
    fn validate(&self, data: &ProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("fname", data.fname.as_deref());
        result.require("lname", data.lname.as_deref());
        result.require("email", data.email.as_deref());
        result.require("username", data.username.as_deref());
        result.require("password", data.password.as_deref());

        for (field, value) in [("fname", &data.fname), ("lname", &data.lname)] {
            if value.as_deref().map_or(0, |v| v.trim().len()) > MAX_NAME_LENGTH {
                result.add_error(field, "is too long");
            }
        }

        if let Some(email) = data.email.as_deref().map(str::trim) {
            if !email.is_empty() && !is_plausible_email(email) {
                result.add_error("email", "is not a valid email address");
            }
        }

        if let Some(username) = data.username.as_deref().map(str::trim) {
            if username.len() > MAX_USERNAME_LENGTH {
                result.add_error("username", "is too long");
            }
            if !username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            {
                result.add_error(
                    "username",
                    "may only contain letters, digits, '.', '_' and '-'",
                );
            }
        }

        if let Some(password) = data.password.as_deref() {
            if !password.is_empty() && password.chars().count() < MIN_PASSWORD_LENGTH {
                result.add_error("password", "must be at least 8 characters");
            }
        }

        result
    }
}
