use super::resolver::ProviderConfigResolver;
use super::types::{DutyRate, FppcaRate, Provider, RebateRule, Slab};
use crate::configuration::ConfigError;
use crate::database::DatabaseError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;

/// Complete tariff of one provider as held in a snapshot file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderTariff {
    #[serde(flatten)]
    pub provider: Provider,
    #[serde(default)]
    pub slabs: Vec<Slab>,
    #[serde(default)]
    pub fppca_rates: Vec<FppcaRate>,
    #[serde(default)]
    pub duty_rates: Vec<DutyRate>,
    #[serde(default)]
    pub rebate_rules: Vec<RebateRule>,
}

impl ProviderTariff {
    pub fn new(provider: Provider, slabs: Vec<Slab>) -> Self {
        Self {
            provider,
            slabs,
            fppca_rates: Vec::new(),
            duty_rates: Vec::new(),
            rebate_rules: Vec::new(),
        }
    }

    pub fn with_fppca_rate(mut self, year: i32, month: u32, rate_per_kwh: Decimal) -> Self {
        self.fppca_rates.push(FppcaRate {
            year,
            month,
            rate_per_kwh,
        });
        self
    }

    pub fn with_duty(mut self, percent: Decimal) -> Self {
        self.duty_rates.push(DutyRate { percent });
        self
    }

    pub fn with_rebate(mut self, code: &str, percent: Decimal, active: bool) -> Self {
        self.rebate_rules.push(RebateRule {
            code: code.to_string(),
            percent,
            active,
        });
        self
    }
}

/// In-memory tariff configuration, loaded from a JSON file for offline estimates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TariffSnapshot {
    pub providers: Vec<ProviderTariff>,
}

impl TariffSnapshot {
    pub fn new(snapshot_file: &str) -> Result<Self, ConfigError> {
        let snapshot_str = fs::read_to_string(snapshot_file).map_err(|_| ConfigError::FileError)?;
        Self::from_json(&snapshot_str)
    }

    pub fn from_json(snapshot_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(snapshot_str)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    pub fn with_provider(mut self, tariff: ProviderTariff) -> Self {
        self.providers.push(tariff);
        self
    }

    fn tariff(&self, provider: &Provider) -> Option<&ProviderTariff> {
        self.providers
            .iter()
            .find(|tariff| tariff.provider.code == provider.code)
    }
}

#[async_trait]
impl ProviderConfigResolver for TariffSnapshot {
    async fn active_provider(&self, code: &str) -> Result<Option<Provider>, DatabaseError> {
        Ok(self
            .providers
            .iter()
            .find(|tariff| tariff.provider.code == code && tariff.provider.is_active)
            .map(|tariff| tariff.provider.clone()))
    }

    async fn slabs(&self, provider: &Provider) -> Result<Vec<Slab>, DatabaseError> {
        let mut slabs = self
            .tariff(provider)
            .map(|tariff| tariff.slabs.clone())
            .unwrap_or_default();
        slabs.sort_by_key(|slab| (slab.position, slab.min_unit));
        Ok(slabs)
    }

    async fn fppca_rate(
        &self,
        provider: &Provider,
        year: i32,
        month: u32,
    ) -> Result<Option<Decimal>, DatabaseError> {
        Ok(self.tariff(provider).and_then(|tariff| {
            tariff
                .fppca_rates
                .iter()
                .find(|rate| rate.year == year && rate.month == month)
                .map(|rate| rate.rate_per_kwh)
        }))
    }

    async fn duty_percentages(&self, provider: &Provider) -> Result<Vec<Decimal>, DatabaseError> {
        Ok(self
            .tariff(provider)
            .map(|tariff| tariff.duty_rates.iter().map(|duty| duty.percent).collect())
            .unwrap_or_default())
    }

    async fn active_rebate_percent(
        &self,
        provider: &Provider,
        code: &str,
    ) -> Result<Option<Decimal>, DatabaseError> {
        Ok(self.tariff(provider).and_then(|tariff| {
            tariff
                .rebate_rules
                .iter()
                .find(|rule| rule.code == code && rule.active)
                .map(|rule| rule.percent)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SNAPSHOT: &str = r#"{
        "providers": [
            {
                "code": "CESC",
                "is_active": true,
                "fixed_charge_per_kva": 15,
                "meter_rent": 10,
                "supports_timely_rebate": true,
                "slabs": [
                    { "min_unit": 51, "max_unit": 100, "rate_paise_per_kwh": 650, "position": 2 },
                    { "min_unit": 0, "max_unit": 50, "rate_paise_per_kwh": 500, "position": 1 },
                    { "min_unit": 101, "max_unit": null, "rate_paise_per_kwh": 800, "position": 3 }
                ],
                "fppca_rates": [ { "year": 2025, "month": 6, "rate_per_kwh": 0.42 } ],
                "duty_rates": [ { "percent": 5 }, { "percent": 2.5 } ],
                "rebate_rules": [
                    { "code": "timely_payment", "percent": 1, "active": false },
                    { "code": "timely_payment", "percent": 2, "active": true }
                ]
            },
            {
                "code": "WBSEDCL",
                "is_active": false,
                "fixed_charge_per_kva": 20,
                "meter_rent": 0
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_snapshot_deserialization_and_lookups() {
        let snapshot = TariffSnapshot::from_json(SNAPSHOT).expect("snapshot should parse");
        let provider = snapshot
            .active_provider("CESC")
            .await
            .unwrap()
            .expect("CESC should be active");
        assert_eq!(provider.fixed_charge_per_kva, dec!(15));

        let slabs = snapshot.slabs(&provider).await.unwrap();
        let mins: Vec<i64> = slabs.iter().map(|slab| slab.min_unit).collect();
        assert_eq!(mins, vec![0, 51, 101]);

        assert_eq!(
            snapshot.fppca_rate(&provider, 2025, 6).await.unwrap(),
            Some(dec!(0.42))
        );
        assert_eq!(snapshot.fppca_rate(&provider, 2025, 7).await.unwrap(), None);

        let duties = snapshot.duty_percentages(&provider).await.unwrap();
        assert_eq!(duties.iter().copied().sum::<Decimal>(), dec!(7.5));

        // inactive rule is skipped
        assert_eq!(
            snapshot
                .active_rebate_percent(&provider, "timely_payment")
                .await
                .unwrap(),
            Some(dec!(2))
        );
    }

    #[tokio::test]
    async fn test_inactive_provider_is_not_resolved() {
        let snapshot = TariffSnapshot::from_json(SNAPSHOT).unwrap();
        assert!(snapshot.active_provider("WBSEDCL").await.unwrap().is_none());
        assert!(snapshot.active_provider("UNKNOWN").await.unwrap().is_none());
    }

    #[test]
    fn test_bundled_snapshot_deserialization() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/tariffs.json");
        let snapshot = TariffSnapshot::new(&path.to_string_lossy())
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));

        assert!(!snapshot.providers.is_empty(), "Providers should not be empty");
        for tariff in &snapshot.providers {
            assert!(
                tariff.slabs.iter().any(|slab| slab.max_unit.is_none()),
                "{} needs an unbounded top slab",
                tariff.provider.code
            );
        }
    }

    #[test]
    fn test_missing_snapshot_file() {
        let result = TariffSnapshot::new("does/not/exist.json");
        assert!(matches!(result, Err(ConfigError::FileError)));
    }
}
