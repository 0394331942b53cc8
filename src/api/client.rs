//! HTTP client for the gallery REST API.

use super::{ApiError, CardRepository, ProfileStore};
use crate::models::{AvatarUpdate, Card, NewCard, ProfileUpdate, User};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server root, e.g. `https://nomoreparties.co/v1`.
    pub base_url: String,
    /// Tenant path segment appended to the base URL.
    pub cohort: String,
    /// Value of the `authorization` header.
    pub token: String,
    pub timeout_seconds: u64,
}

/// Error body the backend sends along with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// REST client implementing both backend collaborator traits.
pub struct ApiClient {
    client: Client,
    root: Url,
}

impl ApiClient {
    /// Create a client for the configured backend.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let root = api_root(&config.base_url, &config.cohort)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !config.token.is_empty() {
            let value = HeaderValue::from_str(&config.token)
                .map_err(|_| ApiError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        info!("API client ready for {}", root);

        Ok(Self { client, root })
    }

    /// The resolved API root, including the cohort segment.
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Build the absolute URL of an endpoint path like `cards/likes/42`.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.root
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = check_status(request.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Join the base URL and cohort into a root that ends with a slash.
pub(crate) fn api_root(base_url: &str, cohort: &str) -> Result<Url, ApiError> {
    let mut raw = base_url.trim_end_matches('/').to_string();
    let cohort = cohort.trim_matches('/');
    if !cohort.is_empty() {
        raw.push('/');
        raw.push_str(cohort);
    }
    raw.push('/');

    let url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            other, raw
        ))),
    }
}

/// Turn a non-2xx response into [`ApiError::Status`].
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), &body))
}

pub(crate) fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| format!("request failed with status {}", status));

    ApiError::Status { status, message }
}

/// Path of the like endpoint for a card.
fn like_path(card_id: &str) -> String {
    format!("cards/likes/{}", card_id)
}

#[async_trait]
impl CardRepository for ApiClient {
    async fn get_cards(&self) -> Result<Vec<Card>, ApiError> {
        let cards: Vec<Card> = self.send_json(self.request(Method::GET, "cards")?).await?;
        debug!("Fetched {} cards", cards.len());
        Ok(cards)
    }

    async fn add_card(&self, card: &NewCard) -> Result<Card, ApiError> {
        let request = self.request(Method::POST, "cards")?.json(card);
        self.send_json(request).await
    }

    async fn delete_card(&self, card_id: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("cards/{}", card_id))?;
        check_status(request.send().await?).await?;
        Ok(())
    }

    async fn change_like_status(&self, card_id: &str, is_liked: bool) -> Result<Card, ApiError> {
        let method = if is_liked { Method::DELETE } else { Method::PUT };
        let request = self.request(method, &like_path(card_id))?;
        self.send_json(request).await
    }
}

#[async_trait]
impl ProfileStore for ApiClient {
    async fn get_user_info(&self) -> Result<User, ApiError> {
        self.send_json(self.request(Method::GET, "users/me")?).await
    }

    async fn set_user_info(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let request = self.request(Method::PATCH, "users/me")?.json(update);
        self.send_json(request).await
    }

    async fn set_user_avatar(&self, link: &str) -> Result<User, ApiError> {
        let body = AvatarUpdate {
            avatar: link.to_string(),
        };
        let request = self.request(Method::PATCH, "users/me/avatar")?.json(&body);
        self.send_json(request).await
    }
}
