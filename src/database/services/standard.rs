use super::super::types::FppcaRateRow;
use super::{fetch_rows, fetch_single, DatabaseError, DatabaseService};
use crate::billing::types::{DutyRate, Provider, RebateRule, Slab};
use rust_decimal::Decimal;
use uuid::Uuid;

impl DatabaseService {
    // Find active provider by utility code
    pub async fn get_active_provider(&self, code: &str) -> Result<Option<Provider>, DatabaseError> {
        let query = self
            .client
            .from("utility_providers")
            .select("*")
            .eq("code", code)
            .eq("is_active", "true");

        fetch_single(query).await
    }

    pub async fn get_tariff_slabs(&self, provider_id: Uuid) -> Result<Vec<Slab>, DatabaseError> {
        let query = self
            .client
            .from("tariff_slabs")
            .select("min_unit,max_unit,rate_paise_per_kwh,position")
            .eq("provider_id", provider_id.to_string())
            .order("position.asc,min_unit.asc");

        fetch_rows(query).await
    }

    // FPPCA is published per month, a missing row is expected
    pub async fn get_fppca_rate(
        &self,
        provider_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Option<Decimal>, DatabaseError> {
        let query = self
            .client
            .from("fppca_rates")
            .select("rate_per_kwh")
            .eq("provider_id", provider_id.to_string())
            .eq("year", year.to_string())
            .eq("month", month.to_string())
            .limit(1);

        let rows: Vec<FppcaRateRow> = fetch_rows(query).await?;
        Ok(rows.into_iter().next().map(|row| row.rate_per_kwh))
    }

    pub async fn get_duty_rates(&self, provider_id: Uuid) -> Result<Vec<DutyRate>, DatabaseError> {
        let query = self
            .client
            .from("duty_rates")
            .select("percent")
            .eq("provider_id", provider_id.to_string());

        fetch_rows(query).await
    }

    pub async fn get_active_rebate_rule(
        &self,
        provider_id: Uuid,
        code: &str,
    ) -> Result<Option<RebateRule>, DatabaseError> {
        let query = self
            .client
            .from("rebate_rules")
            .select("code,percent,active")
            .eq("provider_id", provider_id.to_string())
            .eq("code", code)
            .eq("active", "true")
            .limit(1);

        let rules: Vec<RebateRule> = fetch_rows(query).await?;
        Ok(rules.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    const PROVIDER_ID: &str = "6f1c2a52-7f55-4c0e-9a43-5a1e2b7d9c10";

    #[tokio::test]
    async fn test_get_active_provider() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/utility_providers")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "eq.CESC".into()),
                Matcher::UrlEncoded("is_active".into(), "eq.true".into()),
            ]))
            .match_header("apikey", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{
                    "id": "{}",
                    "code": "CESC",
                    "is_active": true,
                    "fixed_charge_per_kva": 15,
                    "meter_rent": 10,
                    "supports_lifeline": true,
                    "lifeline_requires_registration": true,
                    "lifeline_unit_threshold": 25,
                    "supports_timely_rebate": false
                }}"#,
                PROVIDER_ID
            ))
            .create_async()
            .await;

        let db = DatabaseService::with_credentials(&server.url(), "test-key");
        let provider = db
            .get_active_provider("CESC")
            .await
            .unwrap()
            .expect("provider should be found");

        mock.assert_async().await;
        assert_eq!(provider.id.to_string(), PROVIDER_ID);
        assert_eq!(provider.fixed_charge_per_kva, dec!(15));
        assert_eq!(provider.lifeline_unit_threshold, Some(25));
    }

    #[tokio::test]
    async fn test_unknown_provider_returns_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/utility_providers")
            .match_query(Matcher::Any)
            .with_status(406)
            .with_body(r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#)
            .create_async()
            .await;

        let db = DatabaseService::with_credentials(&server.url(), "test-key");
        assert!(db.get_active_provider("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_tariff_slabs() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/tariff_slabs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("provider_id".into(), format!("eq.{}", PROVIDER_ID)),
                Matcher::UrlEncoded("order".into(), "position.asc,min_unit.asc".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"min_unit": 0, "max_unit": 50, "rate_paise_per_kwh": 500, "position": 1},
                    {"min_unit": 51, "max_unit": null, "rate_paise_per_kwh": 650, "position": 2}
                ]"#,
            )
            .create_async()
            .await;

        let db = DatabaseService::with_credentials(&server.url(), "test-key");
        let slabs = db
            .get_tariff_slabs(Uuid::parse_str(PROVIDER_ID).unwrap())
            .await
            .unwrap();
        assert_eq!(slabs.len(), 2);
        assert_eq!(slabs[0].max_unit, Some(50));
        assert_eq!(slabs[1].max_unit, None);
    }

    #[tokio::test]
    async fn test_missing_fppca_row() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/fppca_rates")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("year".into(), "eq.2025".into()),
                Matcher::UrlEncoded("month".into(), "eq.6".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let db = DatabaseService::with_credentials(&server.url(), "test-key");
        let rate = db
            .get_fppca_rate(Uuid::parse_str(PROVIDER_ID).unwrap(), 2025, 6)
            .await
            .unwrap();
        assert!(rate.is_none());
    }

    #[tokio::test]
    async fn test_query_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/duty_rates")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let db = DatabaseService::with_credentials(&server.url(), "test-key");
        let result = db.get_duty_rates(Uuid::parse_str(PROVIDER_ID).unwrap()).await;
        assert!(matches!(result, Err(DatabaseError::QueryError(_))));
    }
}
