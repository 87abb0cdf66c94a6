use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::Config;
use crate::utils::error::{AppError, AppResult};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS polls (
        id BIGSERIAL PRIMARY KEY,
        question TEXT NOT NULL,
        owner_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS polls_recent_idx ON polls (created_at DESC, id DESC)",
    "CREATE TABLE IF NOT EXISTS poll_options (
        id BIGSERIAL PRIMARY KEY,
        poll_id BIGINT NOT NULL REFERENCES polls (id) ON DELETE CASCADE,
        text TEXT NOT NULL,
        position INTEGER NOT NULL,
        UNIQUE (poll_id, position)
    )",
    "CREATE TABLE IF NOT EXISTS votes (
        id BIGSERIAL PRIMARY KEY,
        poll_id BIGINT NOT NULL REFERENCES polls (id) ON DELETE CASCADE,
        option_id BIGINT NOT NULL REFERENCES poll_options (id) ON DELETE CASCADE,
        user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        cast_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (poll_id, user_id)
    )",
    "CREATE INDEX IF NOT EXISTS votes_option_idx ON votes (option_id)",
];

pub async fn init_db(config: &Config) -> AppResult<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::InternalError("DATABASE_URL must be set".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect to PostgreSQL: {}", e)))?;

    ensure_schema(&pool).await?;
    info!("Database connection successful");

    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> AppResult<()> {
    for statement in SCHEMA.iter().copied() {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
