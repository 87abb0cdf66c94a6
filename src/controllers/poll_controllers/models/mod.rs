use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::poll_models::{OptionResult, Poll, PollOption, PollResults};
use crate::models::vote_record_models::Vote;
use crate::services::poll_service::{Page, DEFAULT_PAGE_SIZE};

#[derive(Deserialize, Debug)]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListPollsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListPollsQuery {
    pub fn page(&self) -> Page {
        Page {
            skip: self.skip.unwrap_or(0),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OptionResponse {
    pub id: i64,
    pub text: String,
    pub position: i32,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PollResponse {
    pub id: i64,
    pub question: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub options: Vec<OptionResponse>,
}

impl From<PollOption> for OptionResponse {
    fn from(option: PollOption) -> Self {
        Self {
            id: option.id,
            text: option.text,
            position: option.position,
        }
    }
}

impl From<Poll> for PollResponse {
    fn from(poll: Poll) -> Self {
        Self {
            id: poll.id,
            question: poll.question,
            owner_id: poll.owner_id,
            created_at: poll.created_at,
            options: poll.options.into_iter().map(OptionResponse::from).collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CastVoteRequest {
    pub option_id: i64,
}

#[derive(Serialize, Debug)]
pub struct ResultsResponse {
    #[serde(flatten)]
    pub results: PollResults,
    pub leader: Option<OptionResult>,
}

impl From<PollResults> for ResultsResponse {
    fn from(results: PollResults) -> Self {
        let leader = results.leader().cloned();
        Self { results, leader }
    }
}

#[derive(Serialize, Debug)]
pub struct CheckVoteResponse {
    pub has_voted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast_at: Option<DateTime<Utc>>,
}

impl From<Option<Vote>> for CheckVoteResponse {
    fn from(vote: Option<Vote>) -> Self {
        match vote {
            Some(vote) => Self {
                has_voted: true,
                vote_id: Some(vote.id),
                option_id: Some(vote.option_id),
                cast_at: Some(vote.cast_at),
            },
            None => Self {
                has_voted: false,
                vote_id: None,
                option_id: None,
                cast_at: None,
            },
        }
    }
}
