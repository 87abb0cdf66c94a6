use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

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

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct PollRow {
    id: PollId,
    question: String,
    owner_id: UserId,
    created_at: DateTime<Utc>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_options(&self, rows: Vec<PollRow>) -> AppResult<Vec<Poll>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<PollId> = rows.iter().map(|row| row.id).collect();
        let options = sqlx::query_as::<_, PollOption>(
            "SELECT id, poll_id, text, position FROM poll_options
             WHERE poll_id = ANY($1)
             ORDER BY poll_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_poll: HashMap<PollId, Vec<PollOption>> = HashMap::new();
        for option in options {
            by_poll.entry(option.poll_id).or_default().push(option);
        }

        Ok(rows
            .into_iter()
            .map(|row| Poll {
                options: by_poll.remove(&row.id).unwrap_or_default(),
                id: row.id,
                question: row.question,
                owner_id: row.owner_id,
                created_at: row.created_at,
            })
            .collect())
    }
}

/// Share-locks the poll row so a concurrent delete waits for the transaction.
async fn lock_poll(tx: &mut Transaction<'_, Postgres>, poll_id: PollId) -> AppResult<()> {
    sqlx::query_scalar::<_, PollId>("SELECT id FROM polls WHERE id = $1 FOR SHARE")
        .bind(poll_id)
        .fetch_optional(&mut **tx)
        .await?
        .map(|_| ())
        .ok_or_else(|| poll_not_found(poll_id))
}

#[async_trait]
impl PollStore for PgStore {
    async fn create_poll(
        &self,
        question: &str,
        options: &[String],
        owner_id: UserId,
    ) -> AppResult<Poll> {
        ensure_poll_input(question, options)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PollRow>(
            "INSERT INTO polls (question, owner_id, created_at)
             VALUES ($1, $2, NOW())
             RETURNING id, question, owner_id, created_at",
        )
        .bind(question)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut poll_options = Vec::with_capacity(options.len());
        for (position, text) in options.iter().enumerate() {
            let option = sqlx::query_as::<_, PollOption>(
                "INSERT INTO poll_options (poll_id, text, position)
                 VALUES ($1, $2, $3)
                 RETURNING id, poll_id, text, position",
            )
            .bind(row.id)
            .bind(text)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;
            poll_options.push(option);
        }

        tx.commit().await?;

        Ok(Poll {
            id: row.id,
            question: row.question,
            owner_id: row.owner_id,
            created_at: row.created_at,
            options: poll_options,
        })
    }

    async fn get_poll(&self, id: PollId) -> AppResult<Poll> {
        let row = sqlx::query_as::<_, PollRow>(
            "SELECT id, question, owner_id, created_at FROM polls WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| poll_not_found(id))?;

        self.attach_options(vec![row])
            .await?
            .pop()
            .ok_or_else(|| poll_not_found(id))
    }

    async fn list_polls(&self, offset: i64, limit: i64) -> AppResult<Vec<Poll>> {
        let rows = sqlx::query_as::<_, PollRow>(
            "SELECT id, question, owner_id, created_at FROM polls
             ORDER BY created_at DESC, id DESC
             OFFSET $1 LIMIT $2",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.attach_options(rows).await
    }

    async fn list_polls_by_owner(
        &self,
        owner_id: UserId,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Poll>> {
        let rows = sqlx::query_as::<_, PollRow>(
            "SELECT id, question, owner_id, created_at FROM polls
             WHERE owner_id = $1
             ORDER BY created_at DESC, id DESC
             OFFSET $2 LIMIT $3",
        )
        .bind(owner_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.attach_options(rows).await
    }

    async fn delete_poll(&self, id: PollId, owner_id: UserId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM polls WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(poll_not_found_for_owner(id));
        }
        Ok(())
    }

    async fn record_vote(
        &self,
        poll_id: PollId,
        option_id: OptionId,
        user_id: UserId,
    ) -> AppResult<Vote> {
        let mut tx = self.pool.begin().await?;

        lock_poll(&mut tx, poll_id).await?;

        sqlx::query_scalar::<_, OptionId>(
            "SELECT id FROM poll_options WHERE id = $1 AND poll_id = $2",
        )
        .bind(option_id)
        .bind(poll_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| option_not_found(poll_id, option_id))?;

        let vote = sqlx::query_as::<_, Vote>(
            "INSERT INTO votes (poll_id, option_id, user_id, cast_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (poll_id, user_id)
             DO UPDATE SET option_id = EXCLUDED.option_id, cast_at = EXCLUDED.cast_at
             RETURNING id, poll_id, option_id, user_id, cast_at",
        )
        .bind(poll_id)
        .bind(option_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(vote)
    }

    async fn find_vote(&self, poll_id: PollId, user_id: UserId) -> AppResult<Option<Vote>> {
        let vote = sqlx::query_as::<_, Vote>(
            "SELECT id, poll_id, option_id, user_id, cast_at FROM votes
             WHERE poll_id = $1 AND user_id = $2",
        )
        .bind(poll_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vote)
    }

    async fn tally_votes(&self, poll_id: PollId) -> AppResult<HashMap<OptionId, i64>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM polls WHERE id = $1)",
        )
        .bind(poll_id)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(poll_not_found(poll_id));
        }

        let counts = sqlx::query_as::<_, (OptionId, i64)>(
            "SELECT option_id, COUNT(*) FROM votes WHERE poll_id = $1 GROUP BY option_id",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts.into_iter().collect())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, created_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (username) DO NOTHING
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Username {} already registered", username)))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
