//! REST client for a PostgREST-style backend (`/rest/v1/<collection>`).

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::backend::RemoteBackend;
use super::error::RemoteError;
use super::rows::{LogRow, ProfileRow};
use crate::domain::models::Session;

const PROFILES_PATH: &str = "rest/v1/profiles";
const LOGS_PATH: &str = "rest/v1/logs";
const MAX_LOG_BODY_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestBackend {
    /// Create a client for `base_url` authenticating the project with `api_key`
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, RemoteError> {
        if !base_url.starts_with("http") {
            return Err(RemoteError::config(format!("Invalid backend URL: {}", base_url)));
        }
        if api_key.trim().is_empty() {
            return Err(RemoteError::config("Backend API key is empty"));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn headers(&self, session: &Session) -> Result<HeaderMap, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| RemoteError::config("Invalid API key format"))?;
        headers.insert("apikey", api_key);

        let bearer = HeaderValue::from_str(&format!("Bearer {}", session.access_token))
            .map_err(|_| RemoteError::config("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, bearer);

        Ok(headers)
    }

    fn user_filter(user_id: &str) -> [(&'static str, String); 1] {
        [("user_id", format!("eq.{}", user_id))]
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("Backend response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("Backend response error ({}): {}", status, preview);
    }

    async fn check_status(response: reqwest::Response) -> Result<String, RemoteError> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(RemoteError::api(status.as_u16(), format!("Request failed: {}", body)));
        }
        Ok(body)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
        let body = Self::check_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RemoteBackend for RestBackend {
    async fn fetch_profile_row(&self, session: &Session, user_id: &str) -> Result<Option<ProfileRow>, RemoteError> {
        let response = self
            .client
            .get(self.url(PROFILES_PATH))
            .headers(self.headers(session)?)
            .query(&Self::user_filter(user_id))
            .query(&[("select", "*"), ("limit", "1")])
            .send()
            .await?;

        let rows: Vec<ProfileRow> = Self::parse_response(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_log_rows(&self, session: &Session, user_id: &str) -> Result<Vec<LogRow>, RemoteError> {
        let response = self
            .client
            .get(self.url(LOGS_PATH))
            .headers(self.headers(session)?)
            .query(&Self::user_filter(user_id))
            .query(&[("select", "*")])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn upsert_profile_row(&self, session: &Session, row: &ProfileRow) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.url(PROFILES_PATH))
            .headers(self.headers(session)?)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await?;

        Self::check_status(response).await.map(|_| ())
    }

    async fn insert_log_row(&self, session: &Session, row: &LogRow) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.url(LOGS_PATH))
            .headers(self.headers(session)?)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        Self::check_status(response).await.map(|_| ())
    }

    async fn delete_log_rows(&self, session: &Session, user_id: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.url(LOGS_PATH))
            .headers(self.headers(session)?)
            .query(&Self::user_filter(user_id))
            .send()
            .await?;

        Self::check_status(response).await.map(|_| ())
    }

    async fn delete_profile_row(&self, session: &Session, user_id: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.url(PROFILES_PATH))
            .headers(self.headers(session)?)
            .query(&Self::user_filter(user_id))
            .send()
            .await?;

        Self::check_status(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_configuration() {
        assert!(RestBackend::new("not-a-url", "key", Duration::from_secs(5)).is_err());
        assert!(RestBackend::new("https://example.supabase.co", " ", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn builds_collection_urls() {
        let backend = RestBackend::new("https://example.supabase.co/", "anon", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.url(PROFILES_PATH), "https://example.supabase.co/rest/v1/profiles");
        assert_eq!(backend.url(LOGS_PATH), "https://example.supabase.co/rest/v1/logs");
    }

    #[test]
    fn headers_carry_key_and_bearer_token() {
        let backend = RestBackend::new("https://example.supabase.co", "anon", Duration::from_secs(5)).unwrap();
        let headers = backend.headers(&Session::new("user-1", "token-abc")).unwrap();

        assert_eq!(headers.get("apikey").unwrap(), "anon");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer token-abc");
    }
}
