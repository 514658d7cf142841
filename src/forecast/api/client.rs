// src/forecast/api/client.rs
use bevy::log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::auth::AuthContext;
use super::envelope::{decode_permission, decode_rows};
use super::error::ApiError;
use crate::forecast::definitions::{ForecastRow, OrgUnit, PermissionConfig, Selection};
use crate::forecast::engine::{ChangeRecord, GridSnapshot};

pub const PERMISSION_PATH: &str = "/rfc/lock";
pub const HISTORY_PATH: &str = "/hist-rfc";

// Error bodies are echoed into the UI; keep them short.
const MAX_ERROR_BODY: usize = 300;

/// Async client for the forecast endpoints. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ForecastApi {
    client: reqwest::Client,
    base_url: String,
}

impl ForecastApi {
    pub fn new(base_url: &str, timeout: Duration, auth: &AuthContext) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = auth.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::Client(format!("invalid token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&'static str, String)]) -> Result<Value, ApiError> {
        let url = self.endpoint_url(path);
        debug!("API: GET {} {:?}", url, query);
        let response = self.client.get(&url).query(query).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.endpoint_url(path);
        debug!("API: POST {} {:?}", url, query);
        let response = self.client.post(&url).query(query).json(body).send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn fetch_rows(&self, unit: OrgUnit, selection: &Selection) -> Result<Vec<ForecastRow>, ApiError> {
        let value = self.get_json(&unit.rows_path(), &selection.query_pairs()).await?;
        Ok(decode_rows(value))
    }

    pub async fn fetch_permission(
        &self,
        unit: OrgUnit,
        selection: &Selection,
    ) -> Result<PermissionConfig, ApiError> {
        let value = self.get_json(PERMISSION_PATH, &permission_query(unit, selection)).await?;
        Ok(decode_permission(value))
    }

    pub async fn fetch_summary(&self, unit: OrgUnit, selection: &Selection) -> Result<Vec<ForecastRow>, ApiError> {
        let value = self.get_json(&unit.summary_path(), &selection.query_pairs()).await?;
        Ok(decode_rows(value))
    }

    /// Rows, permission and summary fetched concurrently. Only the rows call
    /// must succeed; the other two degrade to "locked" and "empty".
    pub async fn fetch_snapshot(&self, unit: OrgUnit, selection: &Selection) -> Result<GridSnapshot, ApiError> {
        let (rows, permission, summary) = tokio::join!(
            self.fetch_rows(unit, selection),
            self.fetch_permission(unit, selection),
            self.fetch_summary(unit, selection),
        );
        let rows = rows?;
        let permission = permission.unwrap_or_else(|e| {
            warn!("API: permission fetch failed, treating period as locked: {}", e);
            PermissionConfig::default()
        });
        let summary = summary.unwrap_or_else(|e| {
            warn!("API: summary fetch failed: {}", e);
            Vec::new()
        });
        Ok(GridSnapshot {
            rows,
            permission,
            summary,
        })
    }

    pub async fn save_changes(
        &self,
        unit: OrgUnit,
        selection: &Selection,
        records: &[ChangeRecord],
    ) -> Result<(), ApiError> {
        self.post_json(&unit.save_path(), &selection.query_pairs(), records).await?;
        info!("API: saved {} change record(s) for {}.", records.len(), unit);
        Ok(())
    }

    /// Posts the merged rows and saves the change-set concurrently; either
    /// failure fails the whole operation.
    pub async fn post_forecast(
        &self,
        unit: OrgUnit,
        selection: &Selection,
        rows: &[Value],
        records: &[ChangeRecord],
    ) -> Result<(), ApiError> {
        let query = selection.query_pairs();
        let path = unit.rows_path();
        let post = self.post_json(&path, &query, rows);
        if records.is_empty() {
            post.await?;
        } else {
            tokio::try_join!(post, self.save_changes(unit, selection, records))?;
        }
        info!("API: posted {} row(s) for {}.", rows.len(), unit);
        Ok(())
    }

    pub async fn fetch_history(&self, material: &str, selection: &Selection) -> Result<Vec<ForecastRow>, ApiError> {
        let value = self.get_json(HISTORY_PATH, &history_query(material, selection)).await?;
        Ok(decode_rows(value))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

pub fn permission_query(unit: OrgUnit, selection: &Selection) -> Vec<(&'static str, String)> {
    let mut query = selection.query_pairs();
    query.push(("type", unit.slug().to_string()));
    query
}

pub fn history_query(material: &str, selection: &Selection) -> Vec<(&'static str, String)> {
    let mut query = vec![("material", material.trim().to_string())];
    query.extend(selection.query_pairs());
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_without_double_slash() {
        let api = ForecastApi::new("http://host:8000/api/", Duration::from_secs(5), &AuthContext::anonymous()).unwrap();
        assert_eq!(api.base_url(), "http://host:8000/api");
        assert_eq!(api.endpoint_url(&OrgUnit::Branch.rows_path()), "http://host:8000/api/branch-rfc");
        assert_eq!(api.endpoint_url(PERMISSION_PATH), "http://host:8000/api/rfc/lock");
    }

    #[test]
    fn permission_query_names_the_unit() {
        let selection = Selection::new(Some("LHR".into()), 4, 2025);
        let query = permission_query(OrgUnit::Marketing, &selection);
        assert!(query.contains(&("type", "marketing".to_string())));
        assert!(query.contains(&("branch", "LHR".to_string())));
    }

    #[test]
    fn history_query_leads_with_material() {
        let selection = Selection::new(None, 11, 2024);
        let query = history_query(" M-100 ", &selection);
        assert_eq!(query[0], ("material", "M-100".to_string()));
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn bad_token_is_a_client_error() {
        let auth = AuthContext::with_token("line\nbreak");
        let result = ForecastApi::new("http://h", Duration::from_secs(1), &auth);
        assert!(matches!(result, Err(ApiError::Client(_))));
    }
}
