use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{
    poll_models::{OptionId, Poll, PollId},
    user_models::{User, UserId},
    vote_record_models::Vote,
};
use crate::utils::error::{AppError, AppResult};

pub mod connection;
pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence for polls, their options and votes.
///
/// Implementations must make `record_vote` atomic with respect to
/// `delete_poll`: a vote is either stored against a live poll or rejected.
#[async_trait]
pub trait PollStore: Send + Sync {
    async fn create_poll(&self, question: &str, options: &[String], owner_id: UserId)
        -> AppResult<Poll>;

    async fn get_poll(&self, id: PollId) -> AppResult<Poll>;

    /// Most recent first.
    async fn list_polls(&self, offset: i64, limit: i64) -> AppResult<Vec<Poll>>;

    async fn list_polls_by_owner(&self, owner_id: UserId, offset: i64, limit: i64)
        -> AppResult<Vec<Poll>>;

    /// Removes the poll with its options and votes when `owner_id` owns it.
    /// A missing poll and a poll owned by someone else both yield `NotFound`.
    async fn delete_poll(&self, id: PollId, owner_id: UserId) -> AppResult<()>;

    /// Stores the caller's vote, replacing any earlier vote on the same poll.
    async fn record_vote(&self, poll_id: PollId, option_id: OptionId, user_id: UserId)
        -> AppResult<Vote>;

    async fn find_vote(&self, poll_id: PollId, user_id: UserId) -> AppResult<Option<Vote>>;

    /// Votes per option. Options without votes may be absent from the map.
    async fn tally_votes(&self, poll_id: PollId) -> AppResult<HashMap<OptionId, i64>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    async fn verify_credential(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(None);
        };

        let password = password.to_owned();
        let hash = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;

        Ok(matches.then_some(user))
    }
}

pub(crate) fn poll_not_found(id: PollId) -> AppError {
    AppError::NotFound(format!("Poll {} not found", id))
}

pub(crate) fn poll_not_found_for_owner(id: PollId) -> AppError {
    AppError::NotFound(format!("Poll {} not found or not authorized", id))
}

pub(crate) fn option_not_found(poll_id: PollId, option_id: OptionId) -> AppError {
    AppError::NotFound(format!(
        "Option {} not found or does not belong to poll {}",
        option_id, poll_id
    ))
}

/// Shared store-level guard: a non-empty question and two or more non-empty options.
pub(crate) fn ensure_poll_input(question: &str, options: &[String]) -> AppResult<()> {
    if question.trim().is_empty() {
        return Err(AppError::ValidationError("Question must not be empty".to_string()));
    }

    let filled = options.iter().filter(|text| !text.trim().is_empty()).count();
    if filled < 2 || filled != options.len() {
        return Err(AppError::ValidationError(
            "At least two non-empty options are required for a poll".to_string(),
        ));
    }

    Ok(())
}
