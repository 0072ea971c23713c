//! Behaviour when collaborators fail.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use game_core::{AttackEntry, Hp, PlayerId, ScriptedDice, SessionPhase};
use runtime::directory;
use runtime::repository;
use runtime::{
    Broadcaster, DirectoryError, ErrorKind, GameRuntime, GameStore, InMemoryStore, Profile,
    StaticDirectory, StoreError,
};

struct UnreachableStore;

fn down<T>() -> repository::Result<T> {
    Err(StoreError::Unavailable("connection refused".into()))
}

#[async_trait]
impl GameStore for UnreachableStore {
    async fn hp(&self, _id: PlayerId) -> repository::Result<Hp> {
        down()
    }

    async fn set_hp(&self, _id: PlayerId, _hp: Hp) -> repository::Result<()> {
        down()
    }

    async fn wins(&self, _id: PlayerId) -> repository::Result<u64> {
        down()
    }

    async fn increment_wins(&self, _id: PlayerId) -> repository::Result<u64> {
        down()
    }

    async fn append_attack(&self, _target: PlayerId, _entry: &AttackEntry) -> repository::Result<()> {
        down()
    }

    async fn recent_attacks(&self, _target: PlayerId, _limit: usize) -> repository::Result<Vec<AttackEntry>> {
        down()
    }

    async fn winner_ids(&self) -> repository::Result<Vec<PlayerId>> {
        down()
    }
}

#[derive(Default)]
struct RecordingBroadcaster {
    posts: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingBroadcaster {
    fn posts(&self) -> Vec<String> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn publish(&self, text: &str) -> directory::Result<()> {
        self.posts.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(DirectoryError::Status {
                status: 429,
                body: "rate limited".into(),
            });
        }
        Ok(())
    }
}

fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_profile(Profile::new(PlayerId(1), "alice"))
        .with_profile(Profile::new(PlayerId(2), "bob"))
        .with_following(PlayerId(1), [PlayerId(2)])
}

async fn wait_for_posts(broadcaster: &RecordingBroadcaster, count: usize) -> Vec<String> {
    for _ in 0..100 {
        let posts = broadcaster.posts();
        if posts.len() >= count {
            return posts;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    broadcaster.posts()
}

#[tokio::test]
async fn unreachable_store_falls_back_to_defaults() {
    let runtime = GameRuntime::builder()
        .store(Arc::new(UnreachableStore))
        .directory(Arc::new(directory()))
        .dice(ScriptedDice::new())
        .build();
    let session = runtime.start_session(PlayerId(1)).await.unwrap();

    let view = session.view().await.unwrap();
    assert_eq!(view.hp, Hp::MAX);
    assert_eq!(view.wins, 0);
    assert!(view.attacks.is_empty());
    assert_eq!(view.opponents[0].hp, Hp::MAX);

    let err = session.attack(PlayerId(2), "Sword").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);

    let err = runtime.leaderboard().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
}

#[tokio::test]
async fn announcements_are_broadcast_in_order() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let runtime = GameRuntime::builder()
        .directory(Arc::new(directory()))
        .broadcaster(broadcaster.clone())
        .dice(
            ScriptedDice::new()
                .with_damages([15, 20])
                .with_retaliations([true]),
        )
        .build();
    let session = runtime.start_session(PlayerId(1)).await.unwrap();

    session.attack(PlayerId(2), "Sword").await.unwrap();

    assert_eq!(
        wait_for_posts(&broadcaster, 2).await,
        vec![
            "alice attacked bob with Sword for 15 damage!".to_string(),
            "bob retaliated against alice with a Retaliation Strike for 20 damage!".to_string(),
        ]
    );
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn broadcast_failure_does_not_touch_game_state() {
    let store = Arc::new(InMemoryStore::new());
    let broadcaster = Arc::new(RecordingBroadcaster {
        fail: true,
        ..Default::default()
    });
    let runtime = GameRuntime::builder()
        .store(store.clone())
        .directory(Arc::new(directory()))
        .broadcaster(broadcaster.clone())
        .dice(ScriptedDice::new().with_damages([25]))
        .build();
    let session = runtime.start_session(PlayerId(1)).await.unwrap();

    let report = session.attack(PlayerId(2), "Sword").await.unwrap();
    assert_eq!(wait_for_posts(&broadcaster, 1).await.len(), 1);

    assert_eq!(report.outcome.target_hp.get(), 75);
    assert_eq!(store.hp(PlayerId(2)).await.unwrap().get(), 75);
    assert_eq!(store.recent_attacks(PlayerId(2), 10).await.unwrap().len(), 1);
}

/// In-memory store whose `reset_hp` and `append_attack` fail a set number
/// of times before succeeding.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryStore,
    reset_failures: AtomicUsize,
    append_failures: AtomicUsize,
}

impl FlakyStore {
    fn failing_resets(self, count: usize) -> Self {
        self.reset_failures.store(count, Ordering::SeqCst);
        self
    }

    fn failing_appends(self, count: usize) -> Self {
        self.append_failures.store(count, Ordering::SeqCst);
        self
    }
}

fn should_fail(remaining: &AtomicUsize) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl GameStore for FlakyStore {
    async fn hp(&self, id: PlayerId) -> repository::Result<Hp> {
        self.inner.hp(id).await
    }

    async fn set_hp(&self, id: PlayerId, hp: Hp) -> repository::Result<()> {
        self.inner.set_hp(id, hp).await
    }

    async fn apply_damage(&self, id: PlayerId, damage: u32) -> repository::Result<Hp> {
        self.inner.apply_damage(id, damage).await
    }

    async fn reset_hp(&self, ids: &[PlayerId]) -> repository::Result<()> {
        if should_fail(&self.reset_failures) {
            return down();
        }
        self.inner.reset_hp(ids).await
    }

    async fn wins(&self, id: PlayerId) -> repository::Result<u64> {
        self.inner.wins(id).await
    }

    async fn increment_wins(&self, id: PlayerId) -> repository::Result<u64> {
        self.inner.increment_wins(id).await
    }

    async fn append_attack(&self, target: PlayerId, entry: &AttackEntry) -> repository::Result<()> {
        if should_fail(&self.append_failures) {
            return down();
        }
        self.inner.append_attack(target, entry).await
    }

    async fn recent_attacks(&self, target: PlayerId, limit: usize) -> repository::Result<Vec<AttackEntry>> {
        self.inner.recent_attacks(target, limit).await
    }

    async fn winner_ids(&self) -> repository::Result<Vec<PlayerId>> {
        self.inner.winner_ids().await
    }
}

async fn flaky_runtime(store: &Arc<FlakyStore>, damage: u32) -> GameRuntime {
    store.set_hp(PlayerId(2), Hp::clamped(15)).await.unwrap();
    GameRuntime::builder()
        .store(Arc::clone(store) as Arc<dyn GameStore>)
        .directory(Arc::new(directory()))
        .dice(ScriptedDice::new().with_damages([damage]))
        .build()
}

#[tokio::test]
async fn failed_reset_keeps_the_pending_win() {
    let store = Arc::new(FlakyStore::default().failing_resets(1));
    let runtime = flaky_runtime(&store, 20).await;
    let session = runtime.start_session(PlayerId(1)).await.unwrap();

    let report = session.attack(PlayerId(2), "Sword").await.unwrap();
    assert_eq!(report.phase, SessionPhase::GameOver);

    let err = session.reset().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);

    let view = session.view().await.unwrap();
    assert_eq!(view.phase, SessionPhase::GameOver);
    assert!(view.reset_pending);
    assert_eq!(view.opponents[0].hp, Hp::ZERO);
    assert_eq!(store.hp(PlayerId(2)).await.unwrap(), Hp::ZERO);

    let view = session.reset().await.unwrap();
    assert_eq!(view.phase, SessionPhase::Active);
    assert_eq!(view.wins, 1);
    assert_eq!(view.opponents[0].hp, Hp::MAX);
    assert_eq!(store.wins(PlayerId(1)).await.unwrap(), 1);
    assert_eq!(store.hp(PlayerId(2)).await.unwrap(), Hp::MAX);
}

#[tokio::test(start_paused = true)]
async fn failed_scheduled_reset_is_retried() {
    let store = Arc::new(FlakyStore::default().failing_resets(1));
    let runtime = flaky_runtime(&store, 20).await;
    let session = runtime.start_session(PlayerId(1)).await.unwrap();
    session.attack(PlayerId(2), "Sword").await.unwrap();

    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(store.wins(PlayerId(1)).await.unwrap(), 0);
    let view = session.view().await.unwrap();
    assert_eq!(view.phase, SessionPhase::GameOver);
    assert!(view.reset_pending);

    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(store.wins(PlayerId(1)).await.unwrap(), 1);
    let view = session.view().await.unwrap();
    assert_eq!(view.phase, SessionPhase::Active);
    assert!(!view.reset_pending);
}

#[tokio::test]
async fn failed_attack_resyncs_committed_hp() {
    let store = Arc::new(FlakyStore::default().failing_appends(1));
    let runtime = flaky_runtime(&store, 20).await;
    let session = runtime.start_session(PlayerId(1)).await.unwrap();

    let err = session.attack(PlayerId(2), "Sword").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    assert_eq!(store.hp(PlayerId(2)).await.unwrap(), Hp::ZERO);

    let view = session.view().await.unwrap();
    assert_eq!(view.opponents[0].hp, Hp::ZERO);
    assert_eq!(view.phase, SessionPhase::GameOver);
    assert!(view.reset_pending);
}
