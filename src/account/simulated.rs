//! Simulated account service — waits a fixed delay, then succeeds.
//!
//! Stands in for a real backend until one exists. Every operation reports
//! success after `latency`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;

use super::{AccountService, Credentials};
use crate::error::AccountError;

/// Account service that always succeeds after a delay.
#[derive(Debug, Clone)]
pub struct SimulatedAccountService {
    latency: Duration,
}

impl SimulatedAccountService {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    async fn settle(&self, operation: &str) -> Result<(), AccountError> {
        debug!(operation, latency_ms = self.latency.as_millis() as u64, "Simulating account call");
        tokio::time::sleep(self.latency).await;
        Ok(())
    }
}

impl Default for SimulatedAccountService {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl AccountService for SimulatedAccountService {
    async fn request_password_reset(&self, _email: &str) -> Result<(), AccountError> {
        self.settle("request_password_reset").await
    }

    async fn verify_otp(&self, _code: &str) -> Result<(), AccountError> {
        self.settle("verify_otp").await
    }

    async fn reset_password(&self, _new_password: &SecretString) -> Result<(), AccountError> {
        self.settle("reset_password").await
    }

    async fn sign_in(&self, _credentials: &Credentials) -> Result<(), AccountError> {
        self.settle("sign_in").await
    }

    async fn sign_up(&self, _credentials: &Credentials) -> Result<(), AccountError> {
        self.settle("sign_up").await
    }
}
