//! Neynar HTTP client for the Farcaster directory and cast publishing.

use async_trait::async_trait;
use game_core::PlayerId;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::{Broadcaster, Directory, DirectoryError, Profile, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.neynar.com";

#[derive(Clone, Debug)]
pub struct NeynarConfig {
    pub base_url: String,
    pub api_key: String,
    /// Managed signer used to publish casts. Publishing is disabled without it.
    pub signer_uuid: Option<String>,
}

impl NeynarConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            signer_uuid: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_signer(mut self, signer_uuid: impl Into<String>) -> Self {
        self.signer_uuid = Some(signer_uuid.into());
        self
    }
}

/// Directory and broadcaster backed by the Neynar REST API.
#[derive(Clone, Debug)]
pub struct NeynarClient {
    config: NeynarConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct NeynarUser {
    fid: u64,
    username: String,
}

impl From<NeynarUser> for Profile {
    fn from(user: NeynarUser) -> Self {
        Profile::new(PlayerId(user.fid), user.username)
    }
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    users: Vec<NeynarUser>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    users: Vec<NeynarUser>,
}

#[derive(Debug, Deserialize)]
struct FollowingResponse {
    users: Vec<FollowEdge>,
}

#[derive(Debug, Deserialize)]
struct FollowEdge {
    user: NeynarUser,
}

#[derive(Debug, Serialize)]
struct CastRequest<'a> {
    signer_uuid: &'a str,
    text: &'a str,
}

impl NeynarClient {
    pub fn new(config: NeynarConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .http_client
            .get(self.url(path))
            .query(query)
            .header("accept", "application/json")
            .header("x-api-key", &self.config.api_key)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| DirectoryError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Directory for NeynarClient {
    async fn lookup(&self, ids: &[PlayerId]) -> Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let fids = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let response: BulkResponse = self
            .get_json("/v2/farcaster/user/bulk", &[("fids", fids)])
            .await?;
        Ok(response.users.into_iter().map(Profile::from).collect())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Profile>> {
        let response: SearchResponse = self
            .get_json(
                "/v2/farcaster/user/search",
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(response.result.users.into_iter().map(Profile::from).collect())
    }

    async fn following(&self, id: PlayerId, limit: usize) -> Result<Vec<Profile>> {
        let response: FollowingResponse = self
            .get_json(
                "/v2/farcaster/following",
                &[("fid", id.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(response
            .users
            .into_iter()
            .map(|edge| Profile::from(edge.user))
            .collect())
    }
}

#[async_trait]
impl Broadcaster for NeynarClient {
    async fn publish(&self, text: &str) -> Result<()> {
        let signer_uuid = self
            .config
            .signer_uuid
            .as_deref()
            .ok_or(DirectoryError::NotConfigured("NEYNAR_SIGNER_UUID"))?;

        tracing::debug!("Publishing cast: {}", text);

        let response = self
            .http_client
            .post(self.url("/v2/farcaster/cast"))
            .header("accept", "application/json")
            .header("x-api-key", &self.config.api_key)
            .json(&CastRequest { signer_uuid, text })
            .send()
            .await?;
        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn following_payload_decodes() {
        let body = r#"{"users":[{"object":"follow","user":{"fid":7,"username":"bob","display_name":"Bob"}}],"next":{"cursor":null}}"#;
        let parsed: FollowingResponse = serde_json::from_str(body).unwrap();
        let profile = Profile::from(parsed.users.into_iter().next().unwrap().user);
        assert_eq!(profile.id, PlayerId(7));
        assert_eq!(profile.name(), "bob");
    }

    #[test]
    fn search_payload_decodes() {
        let body = r#"{"result":{"users":[{"fid":3,"username":"carol"}]}}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result.users[0].username, "carol");
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = NeynarConfig::new("key").with_base_url("http://localhost:9/");
        assert_eq!(NeynarClient::new(config).url("/x"), "http://localhost:9/x");
    }
}
