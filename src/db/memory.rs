use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::db::{
    ensure_poll_input, option_not_found, poll_not_found, poll_not_found_for_owner, PollStore,
    UserStore,
};
use crate::models::{
    poll_models::{OptionId, Poll, PollId, PollOption},
    user_models::{User, UserId},
    vote_record_models::Vote,
};
use crate::utils::error::{AppError, AppResult};

/// In-process store backing both users and polls.
///
/// All tables sit behind one lock, so each operation observes and mutates a
/// consistent snapshot.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    polls: BTreeMap<PollId, Poll>,
    votes: BTreeMap<(PollId, UserId), Vote>,
    next_user_id: i64,
    next_poll_id: i64,
    next_option_id: i64,
    next_vote_id: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<'a>(polls: impl DoubleEndedIterator<Item = &'a Poll>, offset: i64, limit: i64) -> Vec<Poll> {
    polls
        .rev()
        .skip(usize::try_from(offset).unwrap_or(0))
        .take(usize::try_from(limit).unwrap_or(0))
        .cloned()
        .collect()
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn create_poll(
        &self,
        question: &str,
        options: &[String],
        owner_id: UserId,
    ) -> AppResult<Poll> {
        ensure_poll_input(question, options)?;

        let mut tables = self.tables.write().await;
        let poll_id = next(&mut tables.next_poll_id);

        let mut poll_options = Vec::with_capacity(options.len());
        for (position, text) in options.iter().enumerate() {
            poll_options.push(PollOption {
                id: next(&mut tables.next_option_id),
                poll_id,
                text: text.clone(),
                position: position as i32,
            });
        }

        let poll = Poll {
            id: poll_id,
            question: question.to_string(),
            owner_id,
            created_at: Utc::now(),
            options: poll_options,
        };
        tables.polls.insert(poll_id, poll.clone());

        Ok(poll)
    }

    async fn get_poll(&self, id: PollId) -> AppResult<Poll> {
        self.tables
            .read()
            .await
            .polls
            .get(&id)
            .cloned()
            .ok_or_else(|| poll_not_found(id))
    }

    async fn list_polls(&self, offset: i64, limit: i64) -> AppResult<Vec<Poll>> {
        let tables = self.tables.read().await;
        Ok(page(tables.polls.values(), offset, limit))
    }

    async fn list_polls_by_owner(
        &self,
        owner_id: UserId,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Poll>> {
        let tables = self.tables.read().await;
        let owned: Vec<&Poll> = tables
            .polls
            .values()
            .filter(|poll| poll.owner_id == owner_id)
            .collect();
        Ok(page(owned.into_iter(), offset, limit))
    }

    async fn delete_poll(&self, id: PollId, owner_id: UserId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        match tables.polls.get(&id) {
            Some(poll) if poll.owner_id == owner_id => {}
            _ => return Err(poll_not_found_for_owner(id)),
        }

        tables.polls.remove(&id);
        tables.votes.retain(|(poll_id, _), _| *poll_id != id);
        Ok(())
    }

    async fn record_vote(
        &self,
        poll_id: PollId,
        option_id: OptionId,
        user_id: UserId,
    ) -> AppResult<Vote> {
        let mut tables = self.tables.write().await;

        let poll = tables.polls.get(&poll_id).ok_or_else(|| poll_not_found(poll_id))?;
        if poll.option(option_id).is_none() {
            return Err(option_not_found(poll_id, option_id));
        }

        let cast_at = Utc::now();
        let existing = tables.votes.get(&(poll_id, user_id)).cloned();
        let vote = match existing {
            Some(existing) => Vote {
                option_id,
                cast_at,
                ..existing
            },
            None => Vote {
                id: next(&mut tables.next_vote_id),
                poll_id,
                option_id,
                user_id,
                cast_at,
            },
        };
        tables.votes.insert((poll_id, user_id), vote.clone());

        Ok(vote)
    }

    async fn find_vote(&self, poll_id: PollId, user_id: UserId) -> AppResult<Option<Vote>> {
        Ok(self.tables.read().await.votes.get(&(poll_id, user_id)).cloned())
    }

    async fn tally_votes(&self, poll_id: PollId) -> AppResult<HashMap<OptionId, i64>> {
        let tables = self.tables.read().await;
        if !tables.polls.contains_key(&poll_id) {
            return Err(poll_not_found(poll_id));
        }

        let mut tally = HashMap::new();
        for vote in tables
            .votes
            .range((poll_id, UserId::MIN)..=(poll_id, UserId::MAX))
            .map(|(_, vote)| vote)
        {
            *tally.entry(vote.option_id).or_insert(0) += 1;
        }
        Ok(tally)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|user| user.username == username) {
            return Err(AppError::Conflict(format!("Username {} already registered", username)));
        }

        let user = User {
            id: next(&mut tables.next_user_id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}
