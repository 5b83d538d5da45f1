//! Google Sheets adapter. Each division writes to a tab named after its sheet target
//! inside one spreadsheet, authenticated as a service account.

use super::{PresenceRow, PresenceStore, StoreError};
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

const SHEETS_API: &str = "https://sheets.googleapis.com/";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Vec<String>>>,
}

pub struct GoogleSheetsClient {
    http: reqwest::Client,
    spreadsheet_id: String,
    account: ServiceAccountKey,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsClient {
    pub fn new(account: ServiceAccountKey, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            account,
            token: Mutex::new(None),
        }
    }

    pub fn from_key_file(path: &Path, spreadsheet_id: impl Into<String>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading service account file {}", path.display()))?;
        let account: ServiceAccountKey =
            serde_json::from_str(&raw).context("parsing service account file")?;
        Ok(Self::new(account, spreadsheet_id))
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() + Duration::seconds(60) {
                return Ok(token.value.clone());
            }
        }

        let now = Utc::now();
        let claims = Claims {
            iss: &self.account.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.account.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())
            .map_err(|e| StoreError::Transient(format!("invalid service account key: {}", e)))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| StoreError::Transient(format!("failed to sign token request: {}", e)))?;

        let response = self
            .http
            .post(&self.account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Transient(format!(
                "token exchange failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        });

        Ok(token.access_token)
    }

    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(SHEETS_API).map_err(|e| StoreError::Transient(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Transient("sheets API base cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                &format!("{}{}", range, suffix),
            ]);
        Ok(url)
    }
}

/// A1 range covering `columns` on tab `tab`, with the tab name quoted.
pub fn tab_range(tab: &str, columns: &str) -> String {
    format!("'{}'!{}", tab.replace('\'', "''"), columns)
}

/// Maps a failed Sheets API response onto the store's error taxonomy.
pub fn classify_failure(target: &str, status: StatusCode, body: &str) -> StoreError {
    if status == StatusCode::NOT_FOUND
        || (status == StatusCode::BAD_REQUEST && body.contains("Unable to parse range"))
    {
        StoreError::TargetNotFound(target.to_string())
    } else {
        StoreError::Transient(format!("sheets API returned {}: {}", status, body))
    }
}

fn row_from_values(mut values: Vec<String>) -> PresenceRow {
    values.resize(4, String::new());
    let mut fields = values.into_iter();
    PresenceRow {
        day: fields.next().unwrap_or_default(),
        event: fields.next().unwrap_or_default(),
        time: fields.next().unwrap_or_default(),
        nickname: fields.next().unwrap_or_default(),
    }
}

#[async_trait]
impl PresenceStore for GoogleSheetsClient {
    async fn append_record(&self, target: &str, row: &PresenceRow) -> Result<(), StoreError> {
        let token = self.access_token().await?;
        let mut url = self.values_url(&tab_range(target, "A:D"), ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = ValueRange {
            values: Some(vec![vec![
                row.day.clone(),
                row.event.clone(),
                row.time.clone(),
                row.nickname.clone(),
            ]]),
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            tracing::info!("Appended '{}' for {} to sheet '{}'", row.event, row.nickname, target);
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(target, status, &body))
    }

    async fn fetch_records(&self, target: &str) -> Result<Vec<PresenceRow>, StoreError> {
        let token = self.access_token().await?;
        let url = self.values_url(&tab_range(target, "A2:D"), "")?;

        let response = self.http.get(url).bearer_auth(&token).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(target, status, &body));
        }

        let range: ValueRange = response.json().await?;
        Ok(range
            .values
            .unwrap_or_default()
            .into_iter()
            .map(row_from_values)
            .collect())
    }
}
