//! Poll lifecycle and voting rules.
//!
//! Every mutation takes a [`CurrentUser`], which only the auth provider can
//! produce from a verified bearer token, so unauthenticated callers never
//! reach the store.

use std::sync::Arc;

use tracing::{debug, info};

use crate::db::PollStore;
use crate::models::{
    poll_models::{OptionId, Poll, PollId, PollResults},
    user_models::CurrentUser,
    vote_record_models::Vote,
};
use crate::utils::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Offset/limit pair accepted by the listing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Negative `skip` and non-positive `limit` are rejected; oversized
    /// limits are clamped to [`MAX_PAGE_SIZE`].
    pub fn validated(skip: i64, limit: i64) -> AppResult<Self> {
        if skip < 0 {
            return Err(AppError::ValidationError("skip must be >= 0".to_string()));
        }
        if limit <= 0 {
            return Err(AppError::ValidationError("limit must be > 0".to_string()));
        }
        Ok(Self {
            skip,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }
}

pub struct PollService {
    store: Arc<dyn PollStore>,
}

impl PollService {
    pub fn new(store: Arc<dyn PollStore>) -> Self {
        Self { store }
    }

    pub async fn create_poll(
        &self,
        question: &str,
        options: &[String],
        caller: &CurrentUser,
    ) -> AppResult<Poll> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::ValidationError("Question must not be empty".to_string()));
        }

        if options.len() < 2 {
            return Err(AppError::ValidationError(
                "At least two options are required for a poll".to_string(),
            ));
        }

        let options: Vec<String> = options.iter().map(|text| text.trim().to_string()).collect();
        if options.iter().any(|text| text.is_empty()) {
            return Err(AppError::ValidationError("Options must not be empty".to_string()));
        }

        let poll = self.store.create_poll(question, &options, caller.id).await?;
        info!(poll_id = poll.id, owner_id = caller.id, options = poll.options.len(), "poll created");

        Ok(poll)
    }

    pub async fn list_polls(&self, page: Page) -> AppResult<Vec<Poll>> {
        let page = Page::validated(page.skip, page.limit)?;
        self.store.list_polls(page.skip, page.limit).await
    }

    pub async fn list_owned_polls(&self, caller: &CurrentUser, page: Page) -> AppResult<Vec<Poll>> {
        let page = Page::validated(page.skip, page.limit)?;
        self.store
            .list_polls_by_owner(caller.id, page.skip, page.limit)
            .await
    }

    pub async fn get_poll(&self, id: PollId) -> AppResult<Poll> {
        self.store.get_poll(id).await
    }

    /// Only the owner may delete; anyone else sees the poll as missing.
    pub async fn delete_poll(&self, id: PollId, caller: &CurrentUser) -> AppResult<()> {
        self.store.delete_poll(id, caller.id).await.inspect_err(|_| {
            debug!(poll_id = id, caller_id = caller.id, "delete refused");
        })?;
        info!(poll_id = id, owner_id = caller.id, "poll deleted");

        Ok(())
    }

    /// Records the caller's choice; a repeat vote on the same poll replaces
    /// the earlier one.
    pub async fn cast_vote(
        &self,
        poll_id: PollId,
        option_id: OptionId,
        caller: &CurrentUser,
    ) -> AppResult<Vote> {
        let vote = self.store.record_vote(poll_id, option_id, caller.id).await?;
        debug!(poll_id, option_id, user_id = caller.id, vote_id = vote.id, "vote recorded");

        Ok(vote)
    }

    pub async fn caller_vote(&self, poll_id: PollId, caller: &CurrentUser) -> AppResult<Option<Vote>> {
        self.store.get_poll(poll_id).await?;
        self.store.find_vote(poll_id, caller.id).await
    }

    pub async fn get_results(&self, poll_id: PollId) -> AppResult<PollResults> {
        let poll = self.store.get_poll(poll_id).await?;
        let tally = self.store.tally_votes(poll_id).await?;

        Ok(PollResults::from_tally(&poll, &tally))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn service() -> PollService {
        PollService::new(Arc::new(MemoryStore::new()))
    }

    fn user(id: i64) -> CurrentUser {
        CurrentUser {
            id,
            username: format!("user{}", id),
        }
    }

    fn options(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn single_option_is_a_validation_error() {
        let err = service()
            .create_poll("Q?", &options(&["only one"]), &user(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn blank_question_is_a_validation_error() {
        let err = service()
            .create_poll("   ", &options(&["a", "b"]), &user(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn options_are_trimmed_and_ordered() {
        let poll = service()
            .create_poll(" Color? ", &options(&[" Red", "Blue "]), &user(1))
            .await
            .unwrap();

        assert_eq!(poll.question, "Color?");
        assert_eq!(poll.owner_id, 1);
        let texts: Vec<&str> = poll.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["Red", "Blue"]);
        assert_eq!(poll.options[0].position, 0);
        assert_eq!(poll.options[1].position, 1);
    }

    #[tokio::test]
    async fn color_scenario_counts_two_red_zero_blue() {
        let service = service();
        let poll = service
            .create_poll("Color?", &options(&["Red", "Blue"]), &user(1))
            .await
            .unwrap();
        let red = poll.options[0].id;

        service.cast_vote(poll.id, red, &user(2)).await.unwrap();
        service.cast_vote(poll.id, red, &user(3)).await.unwrap();

        let results = service.get_results(poll.id).await.unwrap();
        let rows: Vec<(&str, i64)> = results
            .results
            .iter()
            .map(|r| (r.text.as_str(), r.vote_count))
            .collect();
        assert_eq!(rows, vec![("Red", 2), ("Blue", 0)]);
        assert_eq!(results.question, "Color?");
        assert_eq!(results.total_votes, 2);
    }

    #[tokio::test]
    async fn revote_moves_the_single_ballot() {
        let service = service();
        let poll = service
            .create_poll("Q", &options(&["a", "b"]), &user(1))
            .await
            .unwrap();

        service.cast_vote(poll.id, poll.options[0].id, &user(2)).await.unwrap();
        service.cast_vote(poll.id, poll.options[1].id, &user(2)).await.unwrap();

        let results = service.get_results(poll.id).await.unwrap();
        assert_eq!(results.results[0].vote_count, 0);
        assert_eq!(results.results[1].vote_count, 1);

        let vote = service.caller_vote(poll.id, &user(2)).await.unwrap().unwrap();
        assert_eq!(vote.option_id, poll.options[1].id);
    }

    #[tokio::test]
    async fn option_from_another_poll_is_not_found() {
        let service = service();
        let one = service
            .create_poll("one", &options(&["a", "b"]), &user(1))
            .await
            .unwrap();
        let two = service
            .create_poll("two", &options(&["c", "d"]), &user(1))
            .await
            .unwrap();

        let err = service
            .cast_vote(one.id, two.options[0].id, &user(2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(service.get_results(one.id).await.unwrap().total_votes, 0);
    }

    #[tokio::test]
    async fn vote_on_missing_poll_is_not_found() {
        let err = service().cast_vote(404, 1, &user(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleted_poll_is_gone_for_reads() {
        let service = service();
        let poll = service
            .create_poll("Q", &options(&["a", "b"]), &user(1))
            .await
            .unwrap();
        service.cast_vote(poll.id, poll.options[0].id, &user(2)).await.unwrap();

        service.delete_poll(poll.id, &user(1)).await.unwrap();

        assert!(matches!(service.get_poll(poll.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.get_results(poll.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.delete_poll(poll.id, &user(1)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn non_owner_cannot_delete() {
        let service = service();
        let poll = service
            .create_poll("Q", &options(&["a", "b"]), &user(1))
            .await
            .unwrap();

        let err = service.delete_poll(poll.id, &user(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(service.get_poll(poll.id).await.is_ok());
    }

    #[tokio::test]
    async fn listing_caps_at_limit_most_recent_first() {
        let service = service();
        for i in 0..15 {
            service
                .create_poll(&format!("poll {}", i), &options(&["a", "b"]), &user(1))
                .await
                .unwrap();
        }

        let polls = service.list_polls(Page { skip: 0, limit: 10 }).await.unwrap();
        assert_eq!(polls.len(), 10);
        assert_eq!(polls[0].question, "poll 14");
        assert!(polls.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[tokio::test]
    async fn paging_rejects_bad_values_and_clamps_large_limits() {
        let service = service();
        assert!(matches!(
            service.list_polls(Page { skip: -1, limit: 10 }).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service.list_polls(Page { skip: 0, limit: 0 }).await,
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(
            Page::validated(0, 5_000).unwrap(),
            Page {
                skip: 0,
                limit: MAX_PAGE_SIZE
            }
        );
    }

    #[tokio::test]
    async fn owned_polls_filter_by_caller() {
        let service = service();
        service.create_poll("mine", &options(&["a", "b"]), &user(1)).await.unwrap();
        service.create_poll("theirs", &options(&["a", "b"]), &user(2)).await.unwrap();

        let mine = service.list_owned_polls(&user(1), Page::default()).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].question, "mine");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_votes_from_distinct_users_are_all_counted() {
        let service = Arc::new(service());
        let poll = service
            .create_poll("Q", &options(&["a", "b"]), &user(1))
            .await
            .unwrap();
        let (poll_id, option) = (poll.id, poll.options[0].id);

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.cast_vote(poll_id, option, &user(100 + i)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let results = service.get_results(poll.id).await.unwrap();
        assert_eq!(results.results[0].vote_count, 50);
        assert_eq!(results.results[1].vote_count, 0);
    }
}
