// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod state;
#[cfg(test)]
pub mod test_support;
pub mod validation;

pub use config::AppConfig;
pub use error::ApiError;
pub use helpers::{json_body, safe_email_log, safe_token_log};
pub use id_generator::{generate_state_nonce, generate_user_id};
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
