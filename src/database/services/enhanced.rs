use super::super::types::{ChargeConfigRow, EnhancedProviderRow, MonthlyFppcaRow};
use super::{fetch_rows, fetch_single, DatabaseError, DatabaseService};
use crate::billing::types::Slab;
use rust_decimal::Decimal;
use uuid::Uuid;

impl DatabaseService {
    pub async fn get_enhanced_provider(
        &self,
        code: &str,
    ) -> Result<Option<EnhancedProviderRow>, DatabaseError> {
        let query = self
            .client
            .from("providers")
            .select("id,code,is_active")
            .eq("code", code)
            .eq("is_active", "true");

        fetch_single(query).await
    }

    // No row means the provider runs on default charges
    pub async fn get_charge_config(
        &self,
        provider_id: Uuid,
    ) -> Result<Option<ChargeConfigRow>, DatabaseError> {
        let query = self
            .client
            .from("provider_charge_config")
            .select("fixed_charge_per_kva,duty_percentage,meter_rent,timely_payment_rebate")
            .eq("provider_id", provider_id.to_string())
            .limit(1);

        let rows: Vec<ChargeConfigRow> = fetch_rows(query).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn get_slab_boundaries(&self, provider_id: Uuid) -> Result<Vec<Slab>, DatabaseError> {
        let query = self
            .client
            .from("slab_boundaries")
            .select("min_unit,max_unit,rate_paise_per_kwh")
            .eq("provider_id", provider_id.to_string())
            .order("min_unit.asc");

        fetch_rows(query).await
    }

    pub async fn get_monthly_fppca_rate(
        &self,
        provider_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Option<Decimal>, DatabaseError> {
        let query = self
            .client
            .from("fppca_monthly_rates")
            .select("rate_per_unit")
            .eq("provider_id", provider_id.to_string())
            .eq("year", year.to_string())
            .eq("month", month.to_string())
            .limit(1);

        let rows: Vec<MonthlyFppcaRow> = fetch_rows(query).await?;
        Ok(rows.into_iter().next().map(|row| row.rate_per_unit))
    }
}
