//! Form input validation.
//!
//! Rules for the profile, avatar and new-card forms. Inputs are checked
//! before any request reaches the backend.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// A rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: this field is required")]
    Required { field: &'static str },

    #[error("{field}: must be between {min} and {max} characters (got {actual})")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("{field}: only Latin and Cyrillic letters, spaces and hyphens are allowed")]
    Pattern { field: &'static str },

    #[error("{field}: must be an http(s) URL")]
    Url { field: &'static str },
}

/// Length bounds of a text field.
#[derive(Debug, Clone, Copy)]
struct TextRule {
    field: &'static str,
    min: usize,
    max: usize,
    letters_only: bool,
}

const PROFILE_NAME: TextRule = TextRule {
    field: "name",
    min: 2,
    max: 40,
    letters_only: true,
};

const PROFILE_ABOUT: TextRule = TextRule {
    field: "about",
    min: 2,
    max: 200,
    letters_only: true,
};

const CARD_NAME: TextRule = TextRule {
    field: "place name",
    min: 2,
    max: 30,
    letters_only: true,
};

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Zа-яА-ЯёЁ\s-]+$").expect("static regex"))
}

fn check_text(rule: TextRule, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field: rule.field });
    }

    let actual = value.chars().count();
    if actual < rule.min || actual > rule.max {
        return Err(ValidationError::Length {
            field: rule.field,
            min: rule.min,
            max: rule.max,
            actual,
        });
    }

    if rule.letters_only && !name_pattern().is_match(value) {
        return Err(ValidationError::Pattern { field: rule.field });
    }

    Ok(())
}

fn check_link(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }

    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(ValidationError::Url { field }),
    }
}

/// Validate the edit-profile form.
pub fn validate_profile(name: &str, about: &str) -> Result<(), ValidationError> {
    check_text(PROFILE_NAME, name)?;
    check_text(PROFILE_ABOUT, about)
}

/// Validate the avatar form.
pub fn validate_avatar(link: &str) -> Result<(), ValidationError> {
    check_link("avatar link", link)
}

/// Validate the new-card form.
pub fn validate_new_card(name: &str, link: &str) -> Result<(), ValidationError> {
    check_text(CARD_NAME, name)?;
    check_link("image link", link)
}
