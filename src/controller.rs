//! Command dispatch for gallery actions.
//!
//! Every user action is a [`Command`]. The [`Controller`] runs it against
//! the backend collaborators, updates its [`Session`] only when the backend
//! call succeeds, and hands every failure to a single [`ErrorSink`].

use crate::analysis::aggregate_with_placeholder;
use crate::api::{ApiError, CardRepository, ProfileStore};
use crate::models::{Card, CardStatistics, Locale, NewCard, ProfileUpdate, User};
use crate::validation::{validate_avatar, validate_new_card, validate_profile, ValidationError};
use thiserror::Error;
use tracing::{debug, error, info};

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the profile and the card feed.
    Load,
    EditProfile { name: String, about: String },
    UpdateAvatar { link: String },
    AddCard { name: String, link: String },
    /// Mark one of the user's own cards for deletion.
    RequestDelete { card_id: String },
    /// Delete the card marked by `RequestDelete`.
    ConfirmDelete,
    CancelDelete,
    /// Like the card, or remove the like if the user already liked it.
    ToggleLike { card_id: String },
    /// Fetch the card list fresh and summarize likes.
    ShowStatistics,
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load => "load",
            Command::EditProfile { .. } => "edit-profile",
            Command::UpdateAvatar { .. } => "update-avatar",
            Command::AddCard { .. } => "add-card",
            Command::RequestDelete { .. } => "request-delete",
            Command::ConfirmDelete => "confirm-delete",
            Command::CancelDelete => "cancel-delete",
            Command::ToggleLike { .. } => "toggle-like",
            Command::ShowStatistics => "show-statistics",
        }
    }
}

/// What a successful command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Loaded { user: User, cards: Vec<Card> },
    ProfileUpdated(User),
    AvatarUpdated(User),
    CardAdded(Card),
    DeletePending(Card),
    CardDeleted { card_id: String },
    DeleteCancelled,
    LikeToggled { card: Card, liked: bool },
    Statistics(CardStatistics),
}

/// Errors a command can fail with.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Profile and cards are not loaded yet")]
    NotLoaded,

    #[error("Card not found: {0}")]
    UnknownCard(String),

    #[error("Card {0} belongs to another user")]
    NotOwner(String),

    #[error("No card is waiting for deletion")]
    NoPendingDeletion,
}

/// Request-scoped view state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// The authenticated user, once loaded.
    pub user: Option<User>,
    /// The card feed, newest first.
    pub cards: Vec<Card>,
    /// Card waiting for delete confirmation.
    pub pending_delete: Option<String>,
}

impl Session {
    fn user_id(&self) -> Result<&str, ControllerError> {
        self.user
            .as_ref()
            .map(|u| u.id.as_str())
            .ok_or(ControllerError::NotLoaded)
    }

    fn card(&self, card_id: &str) -> Result<&Card, ControllerError> {
        self.cards
            .iter()
            .find(|c| c.id == card_id)
            .ok_or_else(|| ControllerError::UnknownCard(card_id.to_string()))
    }

    fn replace_card(&mut self, card: Card) {
        if let Some(slot) = self.cards.iter_mut().find(|c| c.id == card.id) {
            *slot = card;
        }
    }
}

/// Destination for command failures.
pub trait ErrorSink: Send + Sync {
    fn report(&self, command: &str, error: &ControllerError);
}

/// Reports failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, command: &str, error: &ControllerError) {
        error!("{} failed: {}", command, error);
    }
}

/// Runs commands against a backend.
pub struct Controller<B> {
    backend: B,
    session: Session,
    sink: Box<dyn ErrorSink>,
    locale: Locale,
}

impl<B> Controller<B>
where
    B: CardRepository + ProfileStore,
{
    /// Create a controller that logs failures.
    pub fn new(backend: B, locale: Locale) -> Self {
        Self::with_sink(backend, locale, Box::new(LogSink))
    }

    pub fn with_sink(backend: B, locale: Locale, sink: Box<dyn ErrorSink>) -> Self {
        Self {
            backend,
            session: Session::default(),
            sink,
            locale,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run a command, reporting any failure to the error sink.
    pub async fn dispatch(&mut self, command: Command) -> Result<Outcome, ControllerError> {
        let name = command.name();
        debug!("Dispatching {}", name);

        let result = self.execute(command).await;
        if let Err(ref e) = result {
            self.sink.report(name, e);
        }

        result
    }

    async fn execute(&mut self, command: Command) -> Result<Outcome, ControllerError> {
        match command {
            Command::Load => self.load().await,
            Command::EditProfile { name, about } => self.edit_profile(name, about).await,
            Command::UpdateAvatar { link } => self.update_avatar(link).await,
            Command::AddCard { name, link } => self.add_card(name, link).await,
            Command::RequestDelete { card_id } => self.request_delete(&card_id),
            Command::ConfirmDelete => self.confirm_delete().await,
            Command::CancelDelete => {
                self.session.pending_delete = None;
                Ok(Outcome::DeleteCancelled)
            }
            Command::ToggleLike { card_id } => self.toggle_like(&card_id).await,
            Command::ShowStatistics => self.statistics().await,
        }
    }

    async fn load(&mut self) -> Result<Outcome, ControllerError> {
        let (cards, user) =
            futures::try_join!(self.backend.get_cards(), self.backend.get_user_info())?;

        info!("Loaded {} cards for {}", cards.len(), user.name);

        self.session.user = Some(user.clone());
        self.session.cards = cards.clone();

        Ok(Outcome::Loaded { user, cards })
    }

    async fn edit_profile(&mut self, name: String, about: String) -> Result<Outcome, ControllerError> {
        validate_profile(&name, &about)?;

        let user = self
            .backend
            .set_user_info(&ProfileUpdate { name, about })
            .await?;
        self.session.user = Some(user.clone());

        Ok(Outcome::ProfileUpdated(user))
    }

    async fn update_avatar(&mut self, link: String) -> Result<Outcome, ControllerError> {
        validate_avatar(&link)?;

        let user = self.backend.set_user_avatar(&link).await?;
        self.session.user = Some(user.clone());

        Ok(Outcome::AvatarUpdated(user))
    }

    async fn add_card(&mut self, name: String, link: String) -> Result<Outcome, ControllerError> {
        validate_new_card(&name, &link)?;

        let card = self.backend.add_card(&NewCard { name, link }).await?;
        self.session.cards.insert(0, card.clone());

        Ok(Outcome::CardAdded(card))
    }

    fn request_delete(&mut self, card_id: &str) -> Result<Outcome, ControllerError> {
        let user_id = self.session.user_id()?;
        let card = self.session.card(card_id)?;

        if !card.is_owned_by(user_id) {
            return Err(ControllerError::NotOwner(card_id.to_string()));
        }

        let card = card.clone();
        self.session.pending_delete = Some(card.id.clone());

        Ok(Outcome::DeletePending(card))
    }

    async fn confirm_delete(&mut self) -> Result<Outcome, ControllerError> {
        let card_id = self
            .session
            .pending_delete
            .clone()
            .ok_or(ControllerError::NoPendingDeletion)?;

        self.backend.delete_card(&card_id).await?;

        self.session.cards.retain(|c| c.id != card_id);
        self.session.pending_delete = None;

        Ok(Outcome::CardDeleted { card_id })
    }

    async fn toggle_like(&mut self, card_id: &str) -> Result<Outcome, ControllerError> {
        let user_id = self.session.user_id()?.to_string();
        let is_liked = self.session.card(card_id)?.is_liked_by(&user_id);

        let card = self.backend.change_like_status(card_id, is_liked).await?;
        let liked = card.is_liked_by(&user_id);
        self.session.replace_card(card.clone());

        Ok(Outcome::LikeToggled { card, liked })
    }

    async fn statistics(&mut self) -> Result<Outcome, ControllerError> {
        let cards = self.backend.get_cards().await?;
        let stats = aggregate_with_placeholder(&cards, self.locale.unknown_user());

        debug!(
            "Statistics over {} cards: {} likes from {} users",
            cards.len(),
            stats.total_likes,
            stats.total_users
        );

        Ok(Outcome::Statistics(stats))
    }
}
