use std::collections::HashMap;
use std::sync::Arc;

use polling_app::db::MemoryStore;
use polling_app::models::user_models::CurrentUser;
use polling_app::services::poll_service::PollService;
use proptest::prelude::*;

fn caller(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        username: format!("voter{}", id),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// `ballots` are (voter, option index) pairs; later ballots by the same
    /// voter replace earlier ones.
    #[test]
    fn results_cover_every_option_and_sum_to_voters(
        option_count in 2usize..6,
        ballots in prop::collection::vec((0i64..20, 0usize..6), 0..60),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let (results, expected) = runtime.block_on(async {
            let service = PollService::new(Arc::new(MemoryStore::new()));
            let texts: Vec<String> = (0..option_count).map(|i| format!("option {}", i)).collect();
            let poll = service.create_poll("Q", &texts, &caller(1_000)).await.unwrap();

            let mut latest: HashMap<i64, usize> = HashMap::new();
            for (voter, index) in &ballots {
                let index = index % option_count;
                service
                    .cast_vote(poll.id, poll.options[index].id, &caller(*voter))
                    .await
                    .unwrap();
                latest.insert(*voter, index);
            }

            let mut expected = vec![0i64; option_count];
            for index in latest.values() {
                expected[*index] += 1;
            }

            (service.get_results(poll.id).await.unwrap(), expected)
        });

        prop_assert_eq!(results.results.len(), option_count);
        let counts: Vec<i64> = results.results.iter().map(|r| r.vote_count).collect();
        prop_assert_eq!(&counts, &expected);
        prop_assert!(counts.iter().all(|c| *c >= 0));
        prop_assert_eq!(results.total_votes, counts.iter().sum::<i64>());
    }
}
