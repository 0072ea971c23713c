use std::sync::Arc;

use game_core::PlayerId;
use runtime::{GameStore, InMemoryStore, Leaderboard, Profile, StaticDirectory};

#[tokio::test]
async fn ranks_by_wins_and_skips_failed_lookups() {
    let store = Arc::new(InMemoryStore::new());
    let x = PlayerId(10);
    let y = PlayerId(20);
    let z = PlayerId(30);
    store.increment_wins(x).await.unwrap();
    store.increment_wins(y).await.unwrap();
    store.increment_wins(x).await.unwrap();
    store.increment_wins(z).await.unwrap();

    let directory = StaticDirectory::new()
        .with_profile(Profile::new(x, "xavier"))
        .with_profile(Profile::new(y, "yolanda"))
        .with_profile(Profile::new(z, "zoe"))
        .failing_lookup(z);
    let leaderboard = Leaderboard::new(store, Arc::new(directory));

    let rows: Vec<(PlayerId, String, u64)> = leaderboard
        .compute()
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.id, e.display_name, e.wins))
        .collect();

    assert_eq!(
        rows,
        vec![(x, "xavier".to_string(), 2), (y, "yolanda".to_string(), 1)]
    );
}

#[tokio::test]
async fn empty_store_gives_empty_board() {
    let leaderboard = Leaderboard::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(StaticDirectory::new()),
    );
    assert!(leaderboard.compute().await.unwrap().is_empty());
}
