use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    poll_models::{OptionId, PollId},
    user_models::UserId,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Vote {
    pub id: i64,
    pub poll_id: PollId,
    pub option_id: OptionId,
    pub user_id: UserId,
    pub cast_at: DateTime<Utc>,
}
