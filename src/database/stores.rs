use super::types::ChargeDefaults;
use super::{DatabaseError, DatabaseService};
use crate::billing::resolver::ProviderConfigResolver;
use crate::billing::types::{ChargeConfig, Provider, Slab};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Tariff configuration in the standard schema (explicit slab positions,
/// per-provider duty and rebate tables).
pub struct StandardTariffStore {
    database: Arc<DatabaseService>,
}

impl StandardTariffStore {
    pub fn new(database: Arc<DatabaseService>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl ProviderConfigResolver for StandardTariffStore {
    async fn active_provider(&self, code: &str) -> Result<Option<Provider>, DatabaseError> {
        self.database.get_active_provider(code).await
    }

    async fn slabs(&self, provider: &Provider) -> Result<Vec<Slab>, DatabaseError> {
        self.database.get_tariff_slabs(provider.id).await
    }

    async fn fppca_rate(
        &self,
        provider: &Provider,
        year: i32,
        month: u32,
    ) -> Result<Option<Decimal>, DatabaseError> {
        self.database.get_fppca_rate(provider.id, year, month).await
    }

    async fn duty_percentages(&self, provider: &Provider) -> Result<Vec<Decimal>, DatabaseError> {
        let rates = self.database.get_duty_rates(provider.id).await?;
        Ok(rates.into_iter().map(|rate| rate.percent).collect())
    }

    async fn active_rebate_percent(
        &self,
        provider: &Provider,
        code: &str,
    ) -> Result<Option<Decimal>, DatabaseError> {
        let rule = self.database.get_active_rebate_rule(provider.id, code).await?;
        Ok(rule.filter(|rule| rule.active).map(|rule| rule.percent))
    }
}

/// Tariff configuration in the enhanced schema: one charge-config row per
/// provider with fallback defaults, slabs ordered by min_unit.
pub struct EnhancedTariffStore {
    database: Arc<DatabaseService>,
    defaults: ChargeDefaults,
}

impl EnhancedTariffStore {
    pub fn new(database: Arc<DatabaseService>) -> Self {
        Self {
            database,
            defaults: ChargeDefaults::default(),
        }
    }

    /// Charges resolved with the provider; fetched only for a provider that
    /// did not come from `active_provider`.
    async fn charge_config(&self, provider: &Provider) -> Result<ChargeConfig, DatabaseError> {
        if let Some(config) = &provider.charge_config {
            return Ok(config.clone());
        }
        let config = self
            .database
            .get_charge_config(provider.id)
            .await?
            .unwrap_or_default();
        Ok(config.charge_config(&self.defaults))
    }
}

#[async_trait]
impl ProviderConfigResolver for EnhancedTariffStore {
    async fn active_provider(&self, code: &str) -> Result<Option<Provider>, DatabaseError> {
        let Some(row) = self.database.get_enhanced_provider(code).await? else {
            return Ok(None);
        };
        let config = self
            .database
            .get_charge_config(row.id)
            .await?
            .unwrap_or_default();
        Ok(Some(config.into_provider(row, &self.defaults)))
    }

    async fn slabs(&self, provider: &Provider) -> Result<Vec<Slab>, DatabaseError> {
        self.database.get_slab_boundaries(provider.id).await
    }

    async fn fppca_rate(
        &self,
        provider: &Provider,
        year: i32,
        month: u32,
    ) -> Result<Option<Decimal>, DatabaseError> {
        self.database
            .get_monthly_fppca_rate(provider.id, year, month)
            .await
    }

    async fn duty_percentages(&self, provider: &Provider) -> Result<Vec<Decimal>, DatabaseError> {
        let config = self.charge_config(provider).await?;
        Ok(vec![config.duty_percentage])
    }

    async fn active_rebate_percent(
        &self,
        provider: &Provider,
        code: &str,
    ) -> Result<Option<Decimal>, DatabaseError> {
        if code != crate::billing::TIMELY_PAYMENT_REBATE {
            return Ok(None);
        }
        let config = self.charge_config(provider).await?;
        Ok(config.timely_rebate_percent)
    }
}
