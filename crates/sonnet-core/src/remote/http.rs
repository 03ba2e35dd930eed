//! HTTP remote mirror over a PostgREST-style rows API.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::models::{Blog, BlogId};

use super::{BlogRow, RemoteMirror};

/// Remote mirror client for the hosted `blogs` table.
#[derive(Clone)]
pub struct HttpRemoteMirror {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl HttpRemoteMirror {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| Error::RemoteUnavailable(error.to_string()))?;
        Ok(Self { config, client })
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/blogs", self.config.endpoint)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/json")
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::RemoteUnavailable(parse_api_error(status, &body)))
    }
}

impl RemoteMirror for HttpRemoteMirror {
    async fn fetch_all(&self, author_id: &str) -> Result<Vec<Blog>> {
        let response = self
            .authed(self.client.get(self.rows_url()))
            .query(&[("author_id", format!("eq.{author_id}")), ("select", "*".to_string())])
            .send()
            .await
            .map_err(|error| Error::RemoteUnavailable(error.to_string()))?;

        let rows = Self::check(response)
            .await?
            .json::<Vec<BlogRow>>()
            .await
            .map_err(|error| Error::RemoteUnavailable(error.to_string()))?;

        rows.into_iter().map(BlogRow::into_blog).collect()
    }

    async fn upsert(&self, blog: &Blog) -> Result<()> {
        let row = BlogRow::from(blog);
        let response = self
            .authed(self.client.post(self.rows_url()))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[row])
            .send()
            .await
            .map_err(|error| Error::RemoteUnavailable(error.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &BlogId) -> Result<()> {
        let response = self
            .authed(self.client.delete(self.rows_url()))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await
            .map_err(|error| Error::RemoteUnavailable(error.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
