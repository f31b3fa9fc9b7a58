use super::types::{Provider, Slab};
use crate::database::DatabaseError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Read-only access to the tariff configuration of one schema.
///
/// Implementations are narrow adapters over a store. They do no caching or
/// retrying; a failed read is returned to the calculator as is.
#[async_trait]
pub trait ProviderConfigResolver: Send + Sync {
    /// Active provider for `code`, `None` if unknown or inactive.
    async fn active_provider(&self, code: &str) -> Result<Option<Provider>, DatabaseError>;

    /// Slabs ordered ascending by position and min_unit.
    async fn slabs(&self, provider: &Provider) -> Result<Vec<Slab>, DatabaseError>;

    /// Per-kWh surcharge for the period, `None` when not published.
    async fn fppca_rate(
        &self,
        provider: &Provider,
        year: i32,
        month: u32,
    ) -> Result<Option<Decimal>, DatabaseError>;

    async fn duty_percentages(&self, provider: &Provider) -> Result<Vec<Decimal>, DatabaseError>;

    /// Percent of the active rebate rule `code`, if any.
    async fn active_rebate_percent(
        &self,
        provider: &Provider,
        code: &str,
    ) -> Result<Option<Decimal>, DatabaseError>;
}
