//! XRPC client for the Bluesky / AT Protocol service
//!
//! Single-attempt requests behind a client-side token bucket. Retrying is the
//! caller's decision; the only request this client repeats on its own is one
//! rejected with `ExpiredToken`, after refreshing the session.
//!
//! Refresh tokens are single-use. Concurrent requests that hit an expired
//! access token share one `refreshSession` call: refreshing is serialized, and
//! a request whose token was already replaced retries with the new one.

use crate::modules::bluesky::domain::{AtprotoApi, Did, ListPage, Profile, RecordView};
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_info, log_warn};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

pub const DEFAULT_SERVICE: &str = "https://bsky.social";

/// Connection settings for [`BlueskyClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub service: String,
    pub user_agent: String,
    pub requests_per_second: u32,
    pub burst: u32,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            user_agent: format!("starter-packs/{}", env!("CARGO_PKG_VERSION")),
            requests_per_second: 10,
            burst: 10,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    refresh_jwt: String,
    did: Did,
    handle: String,
}

#[derive(Debug, Default, Deserialize)]
struct XrpcErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResolveHandleResponse {
    did: Did,
}

pub struct BlueskyClient {
    client: Client,
    service: String,
    session: RwLock<Option<Session>>,
    refresh_lock: Mutex<()>,
    rate_limiter: DefaultDirectRateLimiter,
}

impl BlueskyClient {
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            service: config.service.trim_end_matches('/').to_string(),
            session: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            rate_limiter: Self::create_rate_limiter(config.requests_per_second, config.burst),
        })
    }

    fn create_rate_limiter(requests_per_second: u32, burst: u32) -> DefaultDirectRateLimiter {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(rate);
        RateLimiter::direct(Quota::per_second(rate).allow_burst(burst))
    }

    /// Open an authenticated session (`com.atproto.server.createSession`)
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<()> {
        let url = self.xrpc_url("com.atproto.server.createSession", &[]);
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .post(&url)
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = Self::read_error_body(response).await;
            return Err(AppError::Unauthorized(format!(
                "createSession for '{}' rejected ({}): {}",
                identifier,
                status,
                body.message.or(body.error).unwrap_or_default()
            )));
        }

        let session: Session = self
            .parse_response("com.atproto.server.createSession", response)
            .await?;
        log_info!("Authenticated as {} ({})", session.handle, session.did);
        *self.session.write().await = Some(session);
        Ok(())
    }

    async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.access_jwt.clone())
    }

    /// Refresh the session unless another request already replaced
    /// `rejected_token` while this one waited for the lock
    async fn refresh_session(&self, rejected_token: Option<&str>) -> AppResult<()> {
        let _refreshing = self.refresh_lock.lock().await;

        let refresh_jwt = match self.session.read().await.as_ref() {
            Some(session) if Some(session.access_jwt.as_str()) != rejected_token => {
                log_debug!("Session already refreshed for {}", session.handle);
                return Ok(());
            }
            Some(session) => session.refresh_jwt.clone(),
            None => {
                return Err(AppError::Unauthorized(
                    "No session to refresh".to_string(),
                ))
            }
        };

        let url = self.xrpc_url("com.atproto.server.refreshSession", &[]);
        self.rate_limiter.until_ready().await;
        let response = self
            .client
            .post(&url)
            .bearer_auth(refresh_jwt)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = Self::read_error_body(response).await;
            return Err(AppError::Unauthorized(format!(
                "refreshSession rejected ({}): {}",
                status,
                body.message.or(body.error).unwrap_or_default()
            )));
        }

        let session: Session = self
            .parse_response("com.atproto.server.refreshSession", response)
            .await?;
        log_info!("Session refreshed for {}", session.handle);
        *self.session.write().await = Some(session);
        Ok(())
    }

    fn xrpc_url(&self, nsid: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/xrpc/{}", self.service, nsid);
        for (i, (key, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// GET an XRPC query; refreshes the session once on `ExpiredToken`
    async fn get<T>(&self, nsid: &str, params: &[(&str, &str)]) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.xrpc_url(nsid, params);

        for attempt in 0..2 {
            self.rate_limiter.until_ready().await;
            log_debug!("XRPC GET {}", url);

            let token = self.access_token().await;
            let response = self.send_get(&url, token.as_deref()).await?;
            let status = response.status();
            if status.is_success() {
                return self.parse_response(nsid, response).await;
            }

            let body = Self::read_error_body(response).await;
            let expired = body.error.as_deref() == Some("ExpiredToken");
            if expired && attempt == 0 && token.is_some() {
                log_warn!("{}: access token expired, refreshing session", nsid);
                self.refresh_session(token.as_deref()).await?;
                continue;
            }

            return Err(Self::status_error(nsid, status, &body));
        }

        Err(AppError::Unauthorized(format!(
            "{}: still rejected after session refresh",
            nsid
        )))
    }

    async fn send_get(&self, url: &str, token: Option<&str>) -> Result<Response, reqwest::Error> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/json");

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        request.send().await
    }

    async fn read_error_body(response: Response) -> XrpcErrorBody {
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str(&text).unwrap_or_default()
    }

    async fn parse_response<T>(&self, nsid: &str, response: Response) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response_text = response.text().await.map_err(|e| {
            AppError::SerializationError(format!("Failed to read {} response: {}", nsid, e))
        })?;

        serde_json::from_str(&response_text).map_err(|e| {
            AppError::SerializationError(format!(
                "Failed to parse {} response: {}. Response: {}",
                nsid,
                e,
                if response_text.chars().count() > 200 {
                    format!("{}...", response_text.chars().take(200).collect::<String>())
                } else {
                    response_text
                }
            ))
        })
    }

    fn status_error(nsid: &str, status: StatusCode, body: &XrpcErrorBody) -> AppError {
        let detail = match (&body.error, &body.message) {
            (Some(error), Some(message)) => format!("{}: {}", error, message),
            (Some(error), None) => error.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => status.to_string(),
        };
        let message = format!("{} failed ({}): {}", nsid, status.as_u16(), detail);

        let not_found = matches!(
            body.error.as_deref(),
            Some("RecordNotFound") | Some("NotFound") | Some("ProfileNotFound")
        );

        match status {
            StatusCode::TOO_MANY_REQUESTS => AppError::RateLimitError(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            _ if not_found => AppError::NotFound(message),
            _ if status.is_server_error() => AppError::ExternalServiceError(message),
            _ => AppError::ApiError(message),
        }
    }
}

#[async_trait]
impl AtprotoApi for BlueskyClient {
    async fn resolve_handle(&self, handle: &str) -> AppResult<Did> {
        let response: ResolveHandleResponse = self
            .get("com.atproto.identity.resolveHandle", &[("handle", handle)])
            .await?;
        Ok(response.did)
    }

    async fn get_record(&self, repo: &Did, collection: &str, rkey: &str) -> AppResult<RecordView> {
        self.get(
            "com.atproto.repo.getRecord",
            &[
                ("repo", repo.as_str()),
                ("collection", collection),
                ("rkey", rkey),
            ],
        )
        .await
    }

    async fn get_list_page(
        &self,
        list: &str,
        limit: u32,
        cursor: Option<String>,
    ) -> AppResult<ListPage> {
        let limit = limit.to_string();
        let mut params = vec![("list", list), ("limit", limit.as_str())];
        if let Some(cursor) = cursor.as_deref() {
            params.push(("cursor", cursor));
        }
        self.get("app.bsky.graph.getList", &params).await
    }

    async fn get_profile(&self, actor: &Did) -> AppResult<Profile> {
        self.get("app.bsky.actor.getProfile", &[("actor", actor.as_str())])
            .await
    }
}
