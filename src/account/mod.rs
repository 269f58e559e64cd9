//! Account service boundary.
//!
//! The flow core never talks to a backend directly. A successful form submit
//! produces an [`AccountRequest`], and whoever drives the flow hands it to an
//! [`AccountService`] implementation.

pub mod simulated;

pub use simulated::SimulatedAccountService;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::AccountError;

/// Email and password pair for sign-in and sign-up.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Backend-agnostic account operations used by the flow.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Send a reset code to the given address.
    async fn request_password_reset(&self, email: &str) -> Result<(), AccountError>;

    /// Check a one-time code sent by `request_password_reset`.
    async fn verify_otp(&self, code: &str) -> Result<(), AccountError>;

    /// Store a new password after a verified reset.
    async fn reset_password(&self, new_password: &SecretString) -> Result<(), AccountError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<(), AccountError>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<(), AccountError>;
}

/// One account operation, captured when a form passes validation.
#[derive(Debug, Clone)]
pub enum AccountRequest {
    RequestPasswordReset { email: String },
    VerifyOtp { code: String },
    ResetPassword { new_password: SecretString },
    SignIn(Credentials),
    SignUp(Credentials),
}

impl AccountRequest {
    /// Short operation name for logs.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::RequestPasswordReset { .. } => "request_password_reset",
            Self::VerifyOtp { .. } => "verify_otp",
            Self::ResetPassword { .. } => "reset_password",
            Self::SignIn(_) => "sign_in",
            Self::SignUp(_) => "sign_up",
        }
    }

    /// Run this request against a service.
    pub async fn dispatch(&self, service: &dyn AccountService) -> Result<(), AccountError> {
        match self {
            Self::RequestPasswordReset { email } => service.request_password_reset(email).await,
            Self::VerifyOtp { code } => service.verify_otp(code).await,
            Self::ResetPassword { new_password } => service.reset_password(new_password).await,
            Self::SignIn(credentials) => service.sign_in(credentials).await,
            Self::SignUp(credentials) => service.sign_up(credentials).await,
        }
    }
}
