mod common;

use game_reviews_lib::config::SeedConfig;
use game_reviews_lib::database::repository::{
    games_repository::GamesRepository, reviews_repository::ReviewsRepository,
    users_repository::UsersRepository,
};
use game_reviews_lib::seed::{self, SeedOptions};

use clap::Parser;
use common::{MEMORY_DB, games_db};

#[tokio::test]
async fn apply_replaces_previous_data() {
    let db = games_db().await;
    let options = SeedOptions {
        users: 5,
        games: 4,
        max_reviews_per_user: 3,
    };

    let first = seed::plan(&options, &mut seed::rng_from_seed(Some(1)));
    seed::apply(&db, first).await.unwrap();

    let second = seed::plan(&options, &mut seed::rng_from_seed(Some(2)));
    let expected_reviews = second.reviews.len();
    let summary = seed::apply(&db, second).await.unwrap();

    assert_eq!(summary.users, 5);
    assert_eq!(summary.games, 4);
    assert_eq!(summary.reviews, expected_reviews);
    assert_eq!(UsersRepository::count(&db).await.unwrap(), 5);
    assert_eq!(GamesRepository::count(&db).await.unwrap(), 4);
    assert_eq!(
        ReviewsRepository::count(&db).await.unwrap(),
        expected_reviews as u64
    );
    assert!((5..=15).contains(&expected_reviews));
}

#[tokio::test]
async fn run_seed_with_defaults() {
    let config = SeedConfig::try_parse_from(["seed", "--database-url", MEMORY_DB, "--seed", "42"])
        .unwrap();
    let summary = game_reviews_lib::run_seed(config).await.unwrap();
    assert_eq!(summary.users, 100);
    assert_eq!(summary.games, 100);
    assert!((100..=1000).contains(&summary.reviews));
}
