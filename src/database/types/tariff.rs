use crate::billing::types::{ChargeConfig, Provider};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Standard schema

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FppcaRateRow {
    pub rate_per_kwh: Decimal,
}

// Enhanced schema

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedProviderRow {
    pub id: Uuid,
    pub code: String,
    pub is_active: bool,
}

/// Per-provider charge settings; every column may be left empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeConfigRow {
    #[serde(default)]
    pub fixed_charge_per_kva: Option<Decimal>,
    #[serde(default)]
    pub duty_percentage: Option<Decimal>,
    #[serde(default)]
    pub meter_rent: Option<Decimal>,
    #[serde(default)]
    pub timely_payment_rebate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyFppcaRow {
    pub rate_per_unit: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeDefaults {
    pub fixed_charge_per_kva: Decimal,
    pub duty_percentage: Decimal,
    pub meter_rent: Decimal,
}

impl Default for ChargeDefaults {
    fn default() -> Self {
        Self {
            fixed_charge_per_kva: Decimal::new(1500, 2),
            duty_percentage: Decimal::TEN,
            meter_rent: Decimal::new(1000, 2),
        }
    }
}

impl ChargeConfigRow {
    pub fn duty_percentage_or(&self, defaults: &ChargeDefaults) -> Decimal {
        self.duty_percentage.unwrap_or(defaults.duty_percentage)
    }

    pub fn charge_config(&self, defaults: &ChargeDefaults) -> ChargeConfig {
        ChargeConfig {
            duty_percentage: self.duty_percentage_or(defaults),
            timely_rebate_percent: self.timely_payment_rebate,
        }
    }

    /// Builds the calculator's provider view. This schema has no lifeline
    /// support; the timely rebate exists only when a percentage is configured.
    pub fn into_provider(self, row: EnhancedProviderRow, defaults: &ChargeDefaults) -> Provider {
        let charge_config = self.charge_config(defaults);
        Provider {
            id: row.id,
            code: row.code,
            is_active: row.is_active,
            fixed_charge_per_kva: self
                .fixed_charge_per_kva
                .unwrap_or(defaults.fixed_charge_per_kva),
            meter_rent: self.meter_rent.unwrap_or(defaults.meter_rent),
            supports_lifeline: false,
            lifeline_requires_registration: false,
            lifeline_unit_threshold: None,
            supports_timely_rebate: self.timely_payment_rebate.is_some(),
            charge_config: Some(charge_config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn provider_row() -> EnhancedProviderRow {
        EnhancedProviderRow {
            id: Uuid::new_v4(),
            code: "CESC".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let defaults = ChargeDefaults::default();
        let config = ChargeConfigRow::default();
        assert_eq!(config.duty_percentage_or(&defaults), dec!(10));

        let provider = config.into_provider(provider_row(), &defaults);
        assert_eq!(provider.fixed_charge_per_kva, dec!(15.00));
        assert_eq!(provider.meter_rent, dec!(10.00));
        assert!(!provider.supports_lifeline);
        assert!(!provider.supports_timely_rebate);
        assert_eq!(
            provider.charge_config,
            Some(ChargeConfig {
                duty_percentage: dec!(10),
                timely_rebate_percent: None,
            })
        );
    }

    #[test]
    fn test_partial_config_row() {
        let config: ChargeConfigRow =
            serde_json::from_str(r#"{ "meter_rent": 25, "timely_payment_rebate": 1.5 }"#).unwrap();
        let provider = config.into_provider(provider_row(), &ChargeDefaults::default());
        assert_eq!(provider.meter_rent, dec!(25));
        assert_eq!(provider.fixed_charge_per_kva, dec!(15.00));
        assert!(provider.supports_timely_rebate);
        assert_eq!(
            provider.charge_config.and_then(|config| config.timely_rebate_percent),
            Some(dec!(1.5))
        );
    }
}
