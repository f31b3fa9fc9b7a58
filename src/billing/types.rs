use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Rebate code for the prompt-payment discount.
pub const TIMELY_PAYMENT_REBATE: &str = "timely_payment";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingRequest {
    /// Utility code, eg. "CESC"
    pub provider_code: String,
    pub year: i32,
    /// Signed so that out-of-range months reach validation
    pub month: i32,
    /// Energy consumed in the period
    pub units_kwh: Decimal,
    /// Contracted capacity in kVA
    pub sanctioned_load_kva: Decimal,
    #[serde(default)]
    pub timely_payment_opt_in: bool,
    #[serde(default)]
    pub is_lifeline_registered: bool,
}

impl BillingRequest {
    pub fn new(
        provider_code: &str,
        year: i32,
        month: i32,
        units_kwh: Decimal,
        sanctioned_load_kva: Decimal,
    ) -> Self {
        Self {
            provider_code: provider_code.to_string(),
            year,
            month,
            units_kwh,
            sanctioned_load_kva,
            timely_payment_opt_in: false,
            is_lifeline_registered: false,
        }
    }

    pub fn with_timely_payment(mut self) -> Self {
        self.timely_payment_opt_in = true;
        self
    }

    pub fn with_lifeline_registration(mut self) -> Self {
        self.is_lifeline_registered = true;
        self
    }
}

/// Utility provider with its static charge rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    #[serde(default)]
    pub id: Uuid,
    pub code: String,
    pub is_active: bool,
    /// Rupees per sanctioned kVA per period
    pub fixed_charge_per_kva: Decimal,
    pub meter_rent: Decimal,
    #[serde(default)]
    pub supports_lifeline: bool,
    #[serde(default)]
    pub lifeline_requires_registration: bool,
    #[serde(default)]
    pub lifeline_unit_threshold: Option<i64>,
    #[serde(default)]
    pub supports_timely_rebate: bool,
    /// Duty and rebate read together with the provider row, when the
    /// store keeps them there.
    #[serde(skip)]
    pub charge_config: Option<ChargeConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeConfig {
    pub duty_percentage: Decimal,
    pub timely_rebate_percent: Option<Decimal>,
}

impl Provider {
    // Reported to the caller only, slab rates are not switched on it
    pub fn lifeline_applies(&self, units_kwh: Decimal, is_registered: bool) -> bool {
        if !self.supports_lifeline {
            return false;
        }
        let within_threshold = match self.lifeline_unit_threshold {
            Some(threshold) => units_kwh <= Decimal::from(threshold),
            None => false,
        };
        if self.lifeline_requires_registration {
            is_registered && within_threshold
        } else {
            within_threshold
        }
    }
}

/// One consumption band. `max_unit = None` marks the open top slab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slab {
    pub min_unit: i64,
    pub max_unit: Option<i64>,
    pub rate_paise_per_kwh: i64,
    #[serde(default)]
    pub position: i32,
}

impl Slab {
    pub fn new(min_unit: i64, max_unit: Option<i64>, rate_paise_per_kwh: i64) -> Self {
        Self {
            min_unit,
            max_unit,
            rate_paise_per_kwh,
            position: 0,
        }
    }

    /// Units this band can absorb, `None` when unbounded.
    ///
    /// Units are counted from 1, so a band starting at 0 holds `max_unit` units.
    pub fn capacity(&self) -> Option<Decimal> {
        let first_unit = self.min_unit.max(1);
        self.max_unit
            .map(|max_unit| Decimal::from(max_unit.saturating_sub(first_unit).saturating_add(1).max(0)))
    }

    pub fn rate_rupees(&self) -> Decimal {
        Decimal::from(self.rate_paise_per_kwh) / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FppcaRate {
    pub year: i32,
    pub month: u32,
    pub rate_per_kwh: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyRate {
    pub percent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebateRule {
    pub code: String,
    pub percent: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabCharge {
    pub min_unit: i64,
    pub max_unit: Option<i64>,
    pub units: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillBreakdown {
    pub energy_charge: Decimal,
    pub fixed_charge: Decimal,
    pub fppca_charge: Decimal,
    pub duty_charge: Decimal,
    pub meter_rent: Decimal,
    pub rebates: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedRules {
    pub lifeline_applied: bool,
    pub timely_payment_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillResult {
    pub provider_code: String,
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub units_kwh: Decimal,
    pub breakdown: BillBreakdown,
    pub total_before_rebate: Decimal,
    pub total_rebate: Decimal,
    pub total_payable: Decimal,
    pub applied_rules: AppliedRules,
    pub slab_wise: Vec<SlabCharge>,
    /// Set when no surcharge rate was published for the period
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fppca_missing: bool,
}

impl BillResult {
    /// Caveat to show next to the estimate, if any.
    pub fn caveat(&self) -> Option<&'static str> {
        if self.fppca_missing {
            Some("FPPCA rate is not yet published for this month - this estimate may be understated")
        } else {
            None
        }
    }
}
