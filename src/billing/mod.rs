//! Tiered electricity bill estimation.
//!
//! [`BillCalculator`] walks a provider's consumption slabs and adds the fixed,
//! FPPCA, duty and meter-rent charges, less any rebates. Configuration comes
//! from a [`ProviderConfigResolver`], so the same algorithm serves every
//! configuration schema.

pub mod calculator;
pub mod errors;
pub mod period;
pub mod resolver;
pub mod snapshot;
pub mod types;

pub use calculator::{compute_bill, BillCalculator, TariffInputs};
pub use errors::{map_billing_error_to_user_message, BillingError};
pub use resolver::ProviderConfigResolver;
pub use snapshot::{ProviderTariff, TariffSnapshot};
pub use types::{
    BillResult, BillingRequest, ChargeConfig, Provider, Slab, TIMELY_PAYMENT_REBATE,
};
