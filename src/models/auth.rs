use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Account;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationResult {
    Success,
    PasswordDoNotMatch,
    EmailAlreadyExists,
    UsernameAlreadyExists,
    UsernameOrEmailOrPasswordIsEmpty,
    StartingBalanceMustBePositive,
}

impl RegistrationResult {
    pub fn message(self) -> &'static str {
        match self {
            RegistrationResult::Success => "Registration succeeded",
            RegistrationResult::PasswordDoNotMatch => "Password does not match confirm password",
            RegistrationResult::EmailAlreadyExists => "An account for this email already exists",
            RegistrationResult::UsernameAlreadyExists => "An account for this username already exists",
            RegistrationResult::UsernameOrEmailOrPasswordIsEmpty => "Username, email and password are required",
            RegistrationResult::StartingBalanceMustBePositive => "Starting balance must be positive",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub starting_balance: f64,
    pub machine_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub result: RegistrationResult,
    pub message: &'static str,
}

impl From<RegistrationResult> for RegisterResponse {
    fn from(result: RegistrationResult) -> Self {
        Self {
            result,
            message: result.message(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub machine_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account: Account,
}
