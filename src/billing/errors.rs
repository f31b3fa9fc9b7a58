use crate::database::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Invalid year: {0} (expected 2000-2100)")]
    InvalidYear(i32),

    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(i32),

    #[error("Units consumed cannot be negative")]
    NegativeUnits,

    #[error("Sanctioned load cannot be negative")]
    NegativeLoad,

    #[error("Charge amount out of range")]
    AmountOverflow,

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Failed to load slabs: {0}")]
    SlabLoadFailure(String),

    #[error("Configuration store error: {0}")]
    ConfigStore(#[from] DatabaseError),
}

impl BillingError {
    /// Errors the caller can fix by correcting the request.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BillingError::InvalidYear(_)
                | BillingError::InvalidMonth(_)
                | BillingError::NegativeUnits
                | BillingError::NegativeLoad
                | BillingError::AmountOverflow
        )
    }
}

pub fn map_billing_error_to_user_message(error: &BillingError) -> String {
    match error {
        BillingError::InvalidYear(_) => "Please choose a billing year between 2000 and 2100".to_string(),
        BillingError::InvalidMonth(_) => "Please choose a valid billing month".to_string(),
        BillingError::NegativeUnits => "Units consumed cannot be negative".to_string(),
        BillingError::NegativeLoad => "Sanctioned load cannot be negative".to_string(),
        BillingError::AmountOverflow => {
            "Units consumed or sanctioned load is too large to bill".to_string()
        }
        BillingError::ProviderNotFound(code) => {
            format!("Electricity provider {} is not available", code)
        }
        _ => "Could not calculate the bill right now - please try again later".to_string(),
    }
}
