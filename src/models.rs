//! Data models for the gallery client.
//!
//! This module contains the wire types exchanged with the backend
//! (users, cards, request bodies) and the statistics summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A gallery user.
///
/// The same shape is used for the profile owner, card owners and the
/// entries of a card's like list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-side identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short self description.
    #[serde(default)]
    pub about: String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar: String,
}

/// A user who liked a card.
pub type Liker = User;

impl User {
    /// Creates a user with only an id and a display name.
    #[cfg(test)]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            about: String::new(),
            avatar: String::new(),
        }
    }
}

/// A photo card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireCard")]
pub struct Card {
    /// Server-side identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Caption of the card.
    pub name: String,
    /// Image URL.
    #[serde(default)]
    pub link: String,
    /// Users who liked the card, in the order the server returns them.
    pub likes: Vec<Liker>,
    /// Entries of the server's like list that could not be read as a user.
    /// They still count as likes but belong to no one.
    #[serde(skip)]
    pub unattributed_likes: usize,
    /// Author of the card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    /// Creation timestamp.
    #[serde(
        default,
        rename = "createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Creates a card with no owner and no timestamp.
    #[cfg(test)]
    pub fn new(id: impl Into<String>, name: impl Into<String>, likes: Vec<Liker>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            link: String::new(),
            likes,
            unattributed_likes: 0,
            owner: None,
            created_at: None,
        }
    }

    /// Returns true if the given user has liked this card.
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|like| like.id == user_id)
    }

    /// Returns true if the given user created this card.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.id == user_id)
    }

    /// Number of likes on the card, as long as the server's like list.
    pub fn like_count(&self) -> usize {
        self.likes.len() + self.unattributed_likes
    }
}

/// Card as the backend sends it, before the like list is interpreted.
#[derive(Deserialize)]
struct WireCard {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    likes: Option<Value>,
    #[serde(default)]
    owner: Option<User>,
    #[serde(default, rename = "createdAt")]
    created_at: Option<DateTime<Utc>>,
}

impl From<WireCard> for Card {
    fn from(wire: WireCard) -> Self {
        let (likes, unattributed_likes) = split_likes(wire.likes);
        Self {
            id: wire.id,
            name: wire.name,
            link: wire.link,
            likes,
            unattributed_likes,
            owner: wire.owner,
            created_at: wire.created_at,
        }
    }
}

/// Reads a like list leniently.
///
/// A missing, null or non-array value means no likes. Array entries that
/// do not look like a user are counted but not attributed.
fn split_likes(value: Option<Value>) -> (Vec<Liker>, usize) {
    let Some(Value::Array(items)) = value else {
        return (Vec::new(), 0);
    };

    let total = items.len();
    let likes: Vec<Liker> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Liker>(item).ok())
        .collect();
    let unattributed = total - likes.len();

    (likes, unattributed)
}

/// Body of `PATCH /users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub about: String,
}

/// Body of `PATCH /users/me/avatar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarUpdate {
    pub avatar: String,
}

/// Body of `POST /cards`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub name: String,
    pub link: String,
}

/// Aggregate like statistics over a card list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStatistics {
    /// Number of distinct users who liked at least one card.
    pub total_users: usize,
    /// Total number of likes across all cards.
    pub total_likes: usize,
    /// Highest number of likes given by a single user.
    pub max_likes_per_user: usize,
    /// Display name of the top liker, or a placeholder when nobody liked anything.
    pub champion_name: String,
    /// Names of cards the top liker liked (at most three).
    pub champion_cards: Vec<String>,
}

/// Language used for labels and placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Champion name shown when no card has any likes.
    pub fn unknown_user(&self) -> &'static str {
        match self {
            Locale::En => "Unknown",
            Locale::Ru => "Неизвестный",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Ru => write!(f, "ru"),
        }
    }
}

/// Metadata attached to rendered output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Base URL of the backend the data came from.
    pub api_url: String,
    /// When the data was fetched.
    pub generated_at: DateTime<Utc>,
    /// Time spent talking to the backend, in seconds.
    pub duration_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_deserialize_wire_format() {
        let json = r#"{
            "_id": "c1",
            "name": "Baikal",
            "link": "https://example.com/baikal.jpg",
            "likes": [{"_id": "u1", "name": "Al", "about": "x", "avatar": "y"}],
            "owner": {"_id": "u2", "name": "Bo", "about": "", "avatar": ""},
            "createdAt": "2024-03-01T10:00:00.000Z"
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, "c1");
        assert_eq!(card.like_count(), 1);
        assert!(card.is_liked_by("u1"));
        assert!(!card.is_liked_by("u2"));
        assert!(card.is_owned_by("u2"));
        assert!(card.created_at.is_some());
    }

    #[test]
    fn test_missing_likes_is_empty() {
        let card: Card = serde_json::from_str(r#"{"_id": "c1", "name": "A"}"#).unwrap();
        assert!(card.likes.is_empty());
    }

    #[test]
    fn test_null_or_scalar_likes_is_empty() {
        let card: Card =
            serde_json::from_str(r#"{"_id": "c1", "name": "A", "likes": null}"#).unwrap();
        assert!(card.likes.is_empty());

        let card: Card =
            serde_json::from_str(r#"{"_id": "c1", "name": "A", "likes": 7}"#).unwrap();
        assert!(card.likes.is_empty());
    }

    #[test]
    fn test_malformed_like_entries_still_count() {
        let json = r#"{"_id": "c1", "name": "A", "likes": [{"_id": "u1", "name": "Al"}, 3, {"name": "no id"}]}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.likes, vec![User::new("u1", "Al")]);
        assert_eq!(card.unattributed_likes, 2);
        assert_eq!(card.like_count(), 3);
    }

    #[test]
    fn test_serialized_card_omits_unattributed_count() {
        let json = r#"{"_id": "c1", "name": "A", "likes": [1, 2]}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        let out = serde_json::to_string(&card).unwrap();
        assert!(out.contains("\"likes\":[]"));
        assert!(!out.contains("unattributed"));
    }

    #[test]
    fn test_statistics_serialize_camel_case() {
        let stats = CardStatistics {
            total_users: 2,
            total_likes: 3,
            max_likes_per_user: 2,
            champion_name: "Al".to_string(),
            champion_cards: vec!["A".to_string()],
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"totalUsers\":2"));
        assert!(json.contains("\"maxLikesPerUser\":2"));
        assert!(json.contains("\"championCards\":[\"A\"]"));
    }

    #[test]
    fn test_locale_placeholder() {
        assert_eq!(Locale::En.unknown_user(), "Unknown");
        assert_eq!(Locale::Ru.unknown_user(), "Неизвестный");
        assert_eq!(Locale::default(), Locale::En);
    }
}
