//! Backend collaborators.
//!
//! The controller talks to the backend only through the [`CardRepository`]
//! and [`ProfileStore`] traits; [`ApiClient`] implements both over HTTP.

pub mod client;

use crate::models::{Card, NewCard, ProfileUpdate, User};
use async_trait::async_trait;
use thiserror::Error;

pub use client::{ApiClient, ApiConfig};

/// Errors returned by backend collaborators.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Token is not a valid header value")]
    InvalidToken,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Card persistence.
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Fetch every card in the gallery.
    async fn get_cards(&self) -> Result<Vec<Card>, ApiError>;

    /// Create a card and return the stored version.
    async fn add_card(&self, card: &NewCard) -> Result<Card, ApiError>;

    /// Delete a card.
    async fn delete_card(&self, card_id: &str) -> Result<(), ApiError>;

    /// Flip the current user's like on a card.
    ///
    /// `is_liked` is the state before the change: a liked card gets
    /// unliked, anything else gets liked.
    async fn change_like_status(&self, card_id: &str, is_liked: bool) -> Result<Card, ApiError>;
}

/// Profile of the authenticated user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_user_info(&self) -> Result<User, ApiError>;

    async fn set_user_info(&self, update: &ProfileUpdate) -> Result<User, ApiError>;

    async fn set_user_avatar(&self, link: &str) -> Result<User, ApiError>;
}
