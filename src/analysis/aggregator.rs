//! Like aggregation and statistics.
//!
//! This module tallies likes per user across a card list, picks the
//! user who liked the most cards and collects the names of those cards.

use crate::models::{Card, CardStatistics, Liker, Locale};
use std::collections::HashMap;

/// Maximum number of champion card names kept in the summary.
pub const MAX_CHAMPION_CARDS: usize = 3;

/// Per-user tally, kept in first-encountered order.
struct LikerTally<'a> {
    id: &'a str,
    count: usize,
    card_names: Vec<&'a str>,
}

/// Aggregate like statistics using the English placeholder name.
pub fn aggregate(cards: &[Card]) -> CardStatistics {
    aggregate_with_placeholder(cards, Locale::En.unknown_user())
}

/// Aggregate like statistics.
///
/// `placeholder` becomes the champion name when no card has any likes.
/// Ties on the like count go to the user seen first (cards in order, then
/// likes in order).
pub fn aggregate_with_placeholder(cards: &[Card], placeholder: &str) -> CardStatistics {
    let mut total_likes = 0;
    let mut tallies: Vec<LikerTally<'_>> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for card in cards {
        total_likes += card.like_count();

        for like in &card.likes {
            let index = *positions.entry(like.id.as_str()).or_insert_with(|| {
                tallies.push(LikerTally {
                    id: like.id.as_str(),
                    count: 0,
                    card_names: Vec::new(),
                });
                tallies.len() - 1
            });

            let tally = &mut tallies[index];
            tally.count += 1;
            tally.card_names.push(card.name.as_str());
        }
    }

    let mut champion: Option<&LikerTally<'_>> = None;
    let mut max_likes = 0;

    for tally in &tallies {
        if tally.count > max_likes {
            max_likes = tally.count;
            champion = Some(tally);
        }
    }

    let found = champion
        .and_then(|tally| first_liker_record(cards, tally.id).map(|liker| (tally, liker)));

    let (champion_name, champion_cards) = match found {
        Some((tally, liker)) => (
            liker.name.clone(),
            tally
                .card_names
                .iter()
                .take(MAX_CHAMPION_CARDS)
                .map(|name| name.to_string())
                .collect(),
        ),
        None => (placeholder.to_string(), Vec::new()),
    };

    CardStatistics {
        total_users: tallies.len(),
        total_likes,
        max_likes_per_user: max_likes,
        champion_name,
        champion_cards,
    }
}

/// Find the like record for a user on the first card (in input order) they liked.
fn first_liker_record<'a>(cards: &'a [Card], user_id: &str) -> Option<&'a Liker> {
    cards
        .iter()
        .find_map(|card| card.likes.iter().find(|like| like.id == user_id))
}

/// Identify the most liked cards, highest first.
///
/// Cards with equal like counts keep their input order.
pub fn most_liked_cards(cards: &[Card], n: usize) -> Vec<(&Card, usize)> {
    let mut liked: Vec<_> = cards
        .iter()
        .map(|card| (card, card.like_count()))
        .filter(|(_, count)| *count > 0)
        .collect();

    liked.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    liked.truncate(n);

    liked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use pretty_assertions::assert_eq;

    fn card(name: &str, likes: &[(&str, &str)]) -> Card {
        Card::new(
            format!("id-{}", name),
            name,
            likes.iter().map(|(id, n)| User::new(*id, *n)).collect(),
        )
    }

    fn empty_stats() -> CardStatistics {
        CardStatistics {
            total_users: 0,
            total_likes: 0,
            max_likes_per_user: 0,
            champion_name: "Unknown".to_string(),
            champion_cards: Vec::new(),
        }
    }

    #[test]
    fn test_reference_example() {
        let cards = vec![
            card("A", &[("u1", "Al")]),
            card("B", &[("u1", "Al"), ("u2", "Bo")]),
        ];

        let stats = aggregate(&cards);

        assert_eq!(
            stats,
            CardStatistics {
                total_users: 2,
                total_likes: 3,
                max_likes_per_user: 2,
                champion_name: "Al".to_string(),
                champion_cards: vec!["A".to_string(), "B".to_string()],
            }
        );
    }

    #[test]
    fn test_empty_card_list() {
        assert_eq!(aggregate(&[]), empty_stats());
    }

    #[test]
    fn test_cards_without_likes() {
        let cards = vec![card("A", &[]), card("B", &[])];
        assert_eq!(aggregate(&cards), empty_stats());
    }

    #[test]
    fn test_localized_placeholder() {
        let stats = aggregate_with_placeholder(&[card("A", &[])], Locale::Ru.unknown_user());
        assert_eq!(stats.champion_name, "Неизвестный");
    }

    #[test]
    fn test_total_likes_counts_duplicates() {
        let cards = vec![
            card("A", &[("u1", "Al"), ("u2", "Bo")]),
            card("B", &[("u1", "Al")]),
            card("C", &[("u3", "Cy"), ("u2", "Bo"), ("u1", "Al")]),
        ];

        let stats = aggregate(&cards);
        let expected: usize = cards.iter().map(|c| c.like_count()).sum();

        assert_eq!(stats.total_likes, expected);
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.max_likes_per_user, 3);
    }

    #[test]
    fn test_tie_goes_to_first_encountered_user() {
        let cards = vec![
            card("A", &[("u2", "Bo"), ("u1", "Al")]),
            card("B", &[("u1", "Al"), ("u2", "Bo")]),
        ];

        let stats = aggregate(&cards);

        assert_eq!(stats.max_likes_per_user, 2);
        assert_eq!(stats.champion_name, "Bo");
    }

    #[test]
    fn test_later_higher_count_overtakes() {
        let cards = vec![
            card("A", &[("u1", "Al")]),
            card("B", &[("u2", "Bo")]),
            card("C", &[("u2", "Bo")]),
        ];

        let stats = aggregate(&cards);

        assert_eq!(stats.champion_name, "Bo");
        assert_eq!(stats.champion_cards, vec!["B", "C"]);
    }

    #[test]
    fn test_champion_cards_truncated_to_three() {
        let cards: Vec<Card> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|name| card(name, &[("u1", "Al")]))
            .collect();

        let stats = aggregate(&cards);

        assert_eq!(stats.max_likes_per_user, 5);
        assert_eq!(stats.champion_cards, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_champion_name_from_first_occurrence() {
        let cards = vec![
            card("A", &[("u1", "Old Name")]),
            card("B", &[("u1", "New Name")]),
        ];

        let stats = aggregate(&cards);
        assert_eq!(stats.champion_name, "Old Name");
    }

    #[test]
    fn test_repeated_like_on_same_card_appends_again() {
        let cards = vec![card("A", &[("u1", "Al"), ("u1", "Al")])];

        let stats = aggregate(&cards);

        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.max_likes_per_user, 2);
        assert_eq!(stats.champion_cards, vec!["A", "A"]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let cards = vec![
            card("A", &[("u1", "Al"), ("u2", "Bo")]),
            card("B", &[("u2", "Bo")]),
        ];
        let before = cards.clone();

        let first = aggregate(&cards);
        let second = aggregate(&cards);

        assert_eq!(first, second);
        assert_eq!(cards, before);
    }

    #[test]
    fn test_most_liked_cards() {
        let cards = vec![
            card("A", &[("u1", "Al")]),
            card("B", &[]),
            card("C", &[("u1", "Al"), ("u2", "Bo")]),
            card("D", &[("u3", "Cy")]),
        ];

        let top = most_liked_cards(&cards, 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0.name, "C");
        assert_eq!(top[1].0.name, "A");
    }

    #[test]
    fn test_unreadable_likes_count_toward_total_only() {
        let json = r#"[
            {"_id": "c1", "name": "A", "likes": [{"_id": "u1", "name": "Al"}, {"name": "anon"}, 5]},
            {"_id": "c2", "name": "B", "likes": [{"_id": "u1", "name": "Al"}]}
        ]"#;
        let cards: Vec<Card> = serde_json::from_str(json).unwrap();

        let stats = aggregate(&cards);

        assert_eq!(stats.total_likes, 4);
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.max_likes_per_user, 2);
        assert_eq!(stats.champion_name, "Al");
        assert_eq!(stats.champion_cards, vec!["A", "B"]);
    }
}
