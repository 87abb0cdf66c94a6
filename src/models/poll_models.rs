use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PollId = i64;
pub type OptionId = i64;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct PollOption {
    pub id: OptionId,
    pub poll_id: PollId,
    pub text: String,
    pub position: i32,
}

impl Poll {
    pub fn option(&self, option_id: OptionId) -> Option<&PollOption> {
        self.options.iter().find(|option| option.id == option_id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OptionResult {
    pub option_id: OptionId,
    pub text: String,
    pub vote_count: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PollResults {
    pub poll_id: PollId,
    pub question: String,
    pub total_votes: i64,
    pub results: Vec<OptionResult>,
}

impl PollResults {
    /// Options keep their creation order; options missing from `tally` count zero.
    pub fn from_tally(poll: &Poll, tally: &HashMap<OptionId, i64>) -> Self {
        let mut options: Vec<&PollOption> = poll.options.iter().collect();
        options.sort_by_key(|option| option.position);

        let results: Vec<OptionResult> = options
            .into_iter()
            .map(|option| OptionResult {
                option_id: option.id,
                text: option.text.clone(),
                vote_count: tally.get(&option.id).copied().unwrap_or(0),
            })
            .collect();

        Self {
            poll_id: poll.id,
            question: poll.question.clone(),
            total_votes: results.iter().map(|r| r.vote_count).sum(),
            results,
        }
    }

    /// First option with the highest non-zero count.
    pub fn leader(&self) -> Option<&OptionResult> {
        let mut leader: Option<&OptionResult> = None;
        for result in &self.results {
            if result.vote_count > leader.map_or(0, |l| l.vote_count) {
                leader = Some(result);
            }
        }
        leader
    }
}
