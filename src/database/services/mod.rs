use super::errors::DatabaseError;
use postgrest::{Builder, Postgrest};
use serde::de::DeserializeOwned;
use std::env;
use tracing::error;

mod enhanced;
mod standard;

pub struct DatabaseService {
    pub client: Postgrest,
}

impl DatabaseService {
    pub fn new() -> Result<Self, DatabaseError> {
        let url = env::var("SUPABASE_URL")
            .map_err(|_| DatabaseError::ConnectionError("SUPABASE_URL not found".to_string()))?;
        let service_key = env::var("SUPABASE_KEY")
            .map_err(|_| DatabaseError::ConnectionError("SUPABASE_KEY not found".to_string()))?;

        Ok(Self::with_credentials(&url, &service_key))
    }

    pub fn with_credentials(url: &str, service_key: &str) -> Self {
        let rest_url = format!("{}/rest/v1", url.trim_end_matches('/'));
        let client = Postgrest::new(&rest_url)
            .insert_header("apikey", service_key)
            .insert_header("Authorization", format!("Bearer {}", service_key));

        Self { client }
    }
}

// Runs a list query and decodes every row
async fn fetch_rows<T: DeserializeOwned>(query: Builder) -> Result<Vec<T>, DatabaseError> {
    let response = query
        .execute()
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(err = ?status, "Query failed: {}", error_text);
        return Err(DatabaseError::QueryError(format!(
            "Query failed with status {}: {}",
            status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))
}

// Single-object query, PostgREST answers 406 when no row matches
async fn fetch_single<T: DeserializeOwned>(query: Builder) -> Result<Option<T>, DatabaseError> {
    let response = query
        .single()
        .execute()
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

    if response.status() == 406 {
        // No rows found
        return Ok(None);
    }

    if !response.status().is_success() {
        let status = response.status();
        error!(err = ?status, "Single row query failed");
        return Err(DatabaseError::QueryError(format!(
            "Query failed with status {}",
            status
        )));
    }

    let row: T = response
        .json()
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

    Ok(Some(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_new_requires_supabase_env() {
        env::remove_var("SUPABASE_URL");
        env::remove_var("SUPABASE_KEY");
        assert!(matches!(
            DatabaseService::new(),
            Err(DatabaseError::ConnectionError(_))
        ));

        env::set_var("SUPABASE_URL", "http://localhost:54321");
        env::set_var("SUPABASE_KEY", "service-key");
        assert!(DatabaseService::new().is_ok());

        env::remove_var("SUPABASE_URL");
        env::remove_var("SUPABASE_KEY");
    }
}
