//! Markdown and JSON rendering.
//!
//! This module turns profiles, card feeds and like statistics into
//! terminal-friendly Markdown or pretty-printed JSON.

use crate::analysis::{most_liked_cards, MAX_CHAMPION_CARDS};
use crate::config::ReportConfig;
use crate::models::{Card, CardStatistics, Locale, ReportMetadata, User};
use anyhow::Result;
use serde::Serialize;

/// Localized UI strings.
struct Labels {
    feed_title: &'static str,
    profile_title: &'static str,
    statistics_title: &'static str,
    total_users: &'static str,
    total_likes: &'static str,
    max_likes_per_user: &'static str,
    champion: &'static str,
    popular_cards: &'static str,
    likes: &'static str,
    most_liked: &'static str,
    empty_feed: &'static str,
}

const EN: Labels = Labels {
    feed_title: "Cards",
    profile_title: "Profile",
    statistics_title: "Card statistics",
    total_users: "Total users",
    total_likes: "Total likes",
    max_likes_per_user: "Max likes from one user",
    champion: "Like champion",
    popular_cards: "Popular cards:",
    likes: "Likes",
    most_liked: "Most liked",
    empty_feed: "No cards yet.",
};

const RU: Labels = Labels {
    feed_title: "Карточки",
    profile_title: "Профиль",
    statistics_title: "Статистика карточек",
    total_users: "Всего пользователей",
    total_likes: "Всего лайков",
    max_likes_per_user: "Максимально лайков от одного",
    champion: "Чемпион лайков",
    popular_cards: "Популярные карточки:",
    likes: "Лайки",
    most_liked: "Самые популярные",
    empty_feed: "Карточек пока нет.",
};

fn labels(locale: Locale) -> &'static Labels {
    match locale {
        Locale::En => &EN,
        Locale::Ru => &RU,
    }
}

/// Feed payload for JSON output.
#[derive(Debug, Serialize)]
pub struct FeedReport<'a> {
    pub metadata: &'a ReportMetadata,
    pub user: &'a User,
    pub cards: &'a [Card],
}

/// Statistics payload for JSON output.
#[derive(Debug, Serialize)]
pub struct StatisticsReport<'a> {
    pub metadata: &'a ReportMetadata,
    pub statistics: &'a CardStatistics,
}

/// Render the statistics summary.
pub fn generate_statistics_markdown(stats: &CardStatistics, locale: Locale) -> String {
    let l = labels(locale);
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", l.statistics_title));

    let rows: [(&str, String); 4] = [
        (l.total_users, stats.total_users.to_string()),
        (l.total_likes, stats.total_likes.to_string()),
        (l.max_likes_per_user, stats.max_likes_per_user.to_string()),
        (l.champion, stats.champion_name.clone()),
    ];
    for (term, description) in rows {
        output.push_str(&format!("- **{}:** {}\n", term, description));
    }
    output.push('\n');

    output.push_str(l.popular_cards);
    output.push('\n');
    for name in stats.champion_cards.iter().take(MAX_CHAMPION_CARDS) {
        output.push_str(&format!("  - {}\n", name));
    }

    output
}

/// Render the profile header.
pub fn generate_profile_markdown(user: &User, locale: Locale) -> String {
    let l = labels(locale);
    let mut section = String::new();

    section.push_str(&format!("# {}\n\n", l.profile_title));
    section.push_str(&format!("**{}**\n\n", user.name));
    if !user.about.is_empty() {
        section.push_str(&format!("{}\n\n", user.about));
    }
    if !user.avatar.is_empty() {
        section.push_str(&format!("![avatar]({})\n\n", user.avatar));
    }
    section.push_str(&format!("`{}`\n", user.id));

    section
}

/// Render the card feed for the given user.
pub fn generate_feed_markdown(
    user: &User,
    cards: &[Card],
    metadata: &ReportMetadata,
    config: &ReportConfig,
    locale: Locale,
) -> String {
    let l = labels(locale);
    let mut output = String::new();

    output.push_str(&format!("# {} ({})\n\n", l.feed_title, cards.len()));
    output.push_str(&format!(
        "*{} | {}*\n\n",
        metadata.api_url,
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if cards.is_empty() {
        output.push_str(l.empty_feed);
        output.push('\n');
        return output;
    }

    for card in cards {
        output.push_str(&generate_card_block(card, user, config));
    }

    output.push_str(&generate_most_liked_section(cards, config.top_cards, l));

    output
}

/// Render a single card.
fn generate_card_block(card: &Card, user: &User, config: &ReportConfig) -> String {
    let mut block = String::new();

    let heart = if card.is_liked_by(&user.id) { "♥" } else { "♡" };
    block.push_str(&format!("### {} {} {}", heart, card.like_count(), card.name));
    if card.is_owned_by(&user.id) {
        block.push_str(" 🗑");
    }
    block.push('\n');

    block.push_str(&format!("`{}`", card.id));
    if let Some(ref owner) = card.owner {
        block.push_str(&format!(" by {}", owner.name));
    }
    block.push('\n');

    if config.show_links && !card.link.is_empty() {
        block.push_str(&format!("{}\n", card.link));
    }
    block.push('\n');

    block
}

fn generate_most_liked_section(cards: &[Card], n: usize, l: &Labels) -> String {
    let top = most_liked_cards(cards, n);
    if top.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str(&format!("## {}\n\n", l.most_liked));
    section.push_str(&format!("| # | Card | {} |\n", l.likes));
    section.push_str("|:---:|:---|:---:|\n");
    for (i, (card, count)) in top.iter().enumerate() {
        section.push_str(&format!("| {} | {} | {} |\n", i + 1, card.name, count));
    }
    section.push('\n');

    section
}

/// Render any payload as pretty JSON.
pub fn generate_json<T: Serialize>(payload: &T) -> Result<String> {
    serde_json::to_string_pretty(payload).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            api_url: "https://api.example.com/v1/cohort/".to_string(),
            generated_at: Utc::now(),
            duration_seconds: 0.5,
        }
    }

    fn sample_stats() -> CardStatistics {
        CardStatistics {
            total_users: 2,
            total_likes: 3,
            max_likes_per_user: 2,
            champion_name: "Al".to_string(),
            champion_cards: vec!["A".to_string(), "B".to_string()],
        }
    }

    #[test]
    fn test_statistics_markdown() {
        let text = generate_statistics_markdown(&sample_stats(), Locale::En);

        assert!(text.contains("# Card statistics"));
        assert!(text.contains("- **Total users:** 2"));
        assert!(text.contains("- **Total likes:** 3"));
        assert!(text.contains("- **Max likes from one user:** 2"));
        assert!(text.contains("- **Like champion:** Al"));
        assert!(text.contains("  - A\n  - B\n"));
    }

    #[test]
    fn test_statistics_markdown_russian() {
        let text = generate_statistics_markdown(&sample_stats(), Locale::Ru);
        assert!(text.contains("Статистика карточек"));
        assert!(text.contains("Популярные карточки:"));
    }

    #[test]
    fn test_statistics_list_capped() {
        let mut stats = sample_stats();
        stats.champion_cards = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();

        let text = generate_statistics_markdown(&stats, Locale::En);
        assert!(text.contains("  - C\n"));
        assert!(!text.contains("  - D\n"));
    }

    #[test]
    fn test_feed_markdown() {
        let me = User::new("me", "Me");
        let mut mine = Card::new("c1", "Baikal", vec![me.clone()]);
        mine.owner = Some(me.clone());
        mine.link = "https://example.com/baikal.jpg".to_string();
        let theirs = Card::new("c2", "Elbrus", Vec::new());

        let text = generate_feed_markdown(
            &me,
            &[mine, theirs],
            &metadata(),
            &ReportConfig::default(),
            Locale::En,
        );

        assert!(text.contains("# Cards (2)"));
        assert!(text.contains("### ♥ 1 Baikal 🗑"));
        assert!(text.contains("### ♡ 0 Elbrus\n"));
        assert!(text.contains("https://example.com/baikal.jpg"));
        assert!(text.contains("## Most liked"));
    }

    #[test]
    fn test_feed_hides_links() {
        let me = User::new("me", "Me");
        let mut card = Card::new("c1", "Baikal", Vec::new());
        card.link = "https://example.com/baikal.jpg".to_string();
        let config = ReportConfig {
            show_links: false,
            ..ReportConfig::default()
        };

        let text = generate_feed_markdown(&me, &[card], &metadata(), &config, Locale::En);
        assert!(!text.contains("https://example.com/baikal.jpg"));
        assert!(!text.contains("## Most liked"));
    }

    #[test]
    fn test_empty_feed() {
        let me = User::new("me", "Me");
        let text =
            generate_feed_markdown(&me, &[], &metadata(), &ReportConfig::default(), Locale::Ru);
        assert!(text.contains("Карточек пока нет."));
    }

    #[test]
    fn test_profile_markdown() {
        let mut user = User::new("me", "Jacques Cousteau");
        user.about = "Sailor".to_string();

        let text = generate_profile_markdown(&user, Locale::En);
        assert!(text.contains("**Jacques Cousteau**"));
        assert!(text.contains("Sailor"));
        assert!(!text.contains("avatar"));
    }

    #[test]
    fn test_generate_json() {
        let meta = metadata();
        let stats = sample_stats();
        let json = generate_json(&StatisticsReport {
            metadata: &meta,
            statistics: &stats,
        })
        .unwrap();

        assert!(json.contains("\"api_url\""));
        assert!(json.contains("\"totalLikes\": 3"));
        assert!(json.contains("\"championName\": \"Al\""));
    }
}
