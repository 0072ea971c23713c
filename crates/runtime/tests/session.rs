use std::sync::Arc;
use std::time::Duration;

use game_core::{GameConfig, Hp, PlayerId, RosterError, ScriptedDice, SessionPhase};
use runtime::{
    ErrorKind, Event, GameRuntime, GameStore, InMemoryStore, Profile, RuntimeConfig, RuntimeError,
    SessionEvent, StaticDirectory, Topic,
};

const ALICE: PlayerId = PlayerId(1);
const BOB: PlayerId = PlayerId(2);
const CAROL: PlayerId = PlayerId(3);

fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_profile(Profile::new(ALICE, "alice"))
        .with_profile(Profile::new(BOB, "bob"))
        .with_profile(Profile::new(CAROL, "carol"))
        .with_profile(Profile::new(PlayerId(4), "dave"))
}

fn runtime(store: &Arc<InMemoryStore>, directory: StaticDirectory, dice: ScriptedDice) -> GameRuntime {
    runtime_with(store, directory, dice, RuntimeConfig::default())
}

fn runtime_with(
    store: &Arc<InMemoryStore>,
    directory: StaticDirectory,
    dice: ScriptedDice,
    config: RuntimeConfig,
) -> GameRuntime {
    GameRuntime::builder()
        .config(config)
        .store(Arc::clone(store) as Arc<dyn GameStore>)
        .directory(Arc::new(directory))
        .dice(dice)
        .build()
}

#[tokio::test]
async fn session_loads_roster_with_persisted_hp() {
    let store = Arc::new(InMemoryStore::new());
    store.set_hp(BOB, Hp::clamped(40)).await.unwrap();
    let runtime = runtime(
        &store,
        directory().with_following(ALICE, [BOB, CAROL]),
        ScriptedDice::new(),
    );

    let view = runtime.start_session(ALICE).await.unwrap().view().await.unwrap();

    assert_eq!(view.player.display_name, "alice");
    assert_eq!(view.phase, SessionPhase::Active);
    assert_eq!(view.hp, Hp::MAX);
    assert_eq!(view.wins, 0);
    let hps: Vec<(PlayerId, u32)> = view.opponents.iter().map(|o| (o.id, o.hp.get())).collect();
    assert_eq!(hps, vec![(BOB, 40), (CAROL, 100)]);
    assert!(!view.reset_pending);
}

#[tokio::test]
async fn roster_is_capped_and_pairing_is_added() {
    let store = Arc::new(InMemoryStore::new());
    let mut config = RuntimeConfig::default();
    config.game = GameConfig {
        roster_size: 1,
        ..GameConfig::default()
    }
    .with_mutual_pair(PlayerId(9), ALICE);
    let runtime = runtime_with(
        &store,
        directory()
            .with_profile(Profile::new(PlayerId(9), "zed"))
            .with_following(ALICE, [BOB, CAROL]),
        ScriptedDice::new(),
        config,
    );

    let view = runtime.start_session(ALICE).await.unwrap().view().await.unwrap();

    let ids: Vec<PlayerId> = view.opponents.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![BOB, PlayerId(9)]);
    assert_eq!(view.opponents[1].display_name, "zed");
}

#[tokio::test]
async fn directory_outage_fails_open() {
    let store = Arc::new(InMemoryStore::new());
    let directory = directory().with_following(ALICE, [BOB]);
    directory.set_offline(true);
    let runtime = runtime(&store, directory, ScriptedDice::new());

    let view = runtime.start_session(ALICE).await.unwrap().view().await.unwrap();

    assert_eq!(view.player.display_name, "fid:1");
    assert_eq!(view.phase, SessionPhase::Active);
    assert!(view.opponents.is_empty());
    assert!(view.leaderboard.is_empty());
}

#[tokio::test]
async fn loss_resets_everyone_without_a_win() {
    let store = Arc::new(InMemoryStore::new());
    store.set_hp(ALICE, Hp::clamped(15)).await.unwrap();
    let runtime = runtime(
        &store,
        directory().with_following(ALICE, [BOB, CAROL]),
        ScriptedDice::new()
            .with_damages([10, 20])
            .with_retaliations([true]),
    );
    let session = runtime.start_session(ALICE).await.unwrap();

    let report = session.attack(BOB, "Sword").await.unwrap();
    assert_eq!(report.phase, SessionPhase::GameOver);
    assert_eq!(
        report.outcome.retaliation.map(|r| r.attacker_hp),
        Some(Hp::ZERO)
    );
    assert!(session.view().await.unwrap().reset_pending);

    let view = session.reset().await.unwrap();

    assert_eq!(view.phase, SessionPhase::Active);
    assert_eq!(view.hp, Hp::MAX);
    assert!(view.opponents.iter().all(|o| o.hp == Hp::MAX));
    assert!(!view.reset_pending);
    for id in [ALICE, BOB, CAROL] {
        assert_eq!(store.hp(id).await.unwrap(), Hp::MAX);
    }
    assert_eq!(store.wins(ALICE).await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn win_is_recorded_once_by_scheduled_reset() {
    let store = Arc::new(InMemoryStore::new());
    store.set_hp(ALICE, Hp::clamped(40)).await.unwrap();
    store.set_hp(BOB, Hp::clamped(15)).await.unwrap();
    let runtime = runtime(
        &store,
        directory().with_following(ALICE, [BOB]),
        ScriptedDice::new().with_damages([20]),
    );
    let session = runtime.start_session(ALICE).await.unwrap();
    let mut events = session.subscribe(Topic::Session);

    let report = session.attack(BOB, "Sword").await.unwrap();
    assert!(report.outcome.defeated);
    assert_eq!(report.phase, SessionPhase::GameOver);

    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(store.wins(ALICE).await.unwrap(), 1);
    let view = session.view().await.unwrap();
    assert_eq!(view.wins, 1);
    assert_eq!(view.hp, Hp::MAX);
    assert_eq!(view.phase, SessionPhase::Active);
    assert_eq!(view.leaderboard.len(), 1);
    assert_eq!(view.leaderboard[0].display_name, "alice");
    assert_eq!(store.hp(BOB).await.unwrap(), Hp::MAX);

    // A manual reset mid-game is not another win.
    session.reset().await.unwrap();
    assert_eq!(store.wins(ALICE).await.unwrap(), 1);

    let mut saw_game_over = false;
    let mut saw_reset = false;
    while let Ok(event) = events.try_recv() {
        match event {
            Event::Session(SessionEvent::GameOver { player_won, .. }) => {
                assert!(player_won);
                saw_game_over = true;
            }
            Event::Session(SessionEvent::Reset { wins: 1, .. }) => saw_reset = true,
            _ => {}
        }
    }
    assert!(saw_game_over && saw_reset);
}

#[tokio::test(start_paused = true)]
async fn closing_a_session_cancels_the_pending_reset() {
    let store = Arc::new(InMemoryStore::new());
    store.set_hp(BOB, Hp::clamped(10)).await.unwrap();
    let runtime = runtime(
        &store,
        directory().with_following(ALICE, [BOB]),
        ScriptedDice::new().with_damages([30]),
    );
    let session = runtime.start_session(ALICE).await.unwrap();
    session.attack(BOB, "Sword").await.unwrap();

    runtime.end_session(ALICE).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(store.hp(BOB).await.unwrap(), Hp::ZERO);
    assert_eq!(store.wins(ALICE).await.unwrap(), 0);
    assert!(session.is_closed());
    assert!(matches!(
        runtime.session(ALICE).await,
        Err(RuntimeError::UnknownSession(ALICE))
    ));
}

#[tokio::test]
async fn ending_a_session_whose_worker_already_stopped() {
    let store = Arc::new(InMemoryStore::new());
    let runtime = runtime(&store, directory().with_following(ALICE, [BOB]), ScriptedDice::new());
    let session = runtime.start_session(ALICE).await.unwrap();
    session.close().await.unwrap();

    runtime.end_session(ALICE).await.unwrap();

    assert_eq!(runtime.active_sessions().await, 0);
    assert!(matches!(
        runtime.end_session(ALICE).await,
        Err(RuntimeError::UnknownSession(ALICE))
    ));
}

#[tokio::test]
async fn restarting_replaces_the_previous_session() {
    let store = Arc::new(InMemoryStore::new());
    let runtime = runtime(&store, directory(), ScriptedDice::new());

    let first = runtime.start_session(ALICE).await.unwrap();
    let second = runtime.start_session(ALICE).await.unwrap();

    assert!(first.is_closed());
    assert!(second.view().await.is_ok());
    assert_eq!(runtime.active_sessions().await, 1);
}

#[tokio::test]
async fn adding_an_existing_opponent_leaves_roster_unchanged() {
    let store = Arc::new(InMemoryStore::new());
    let runtime = runtime(
        &store,
        directory().with_following(ALICE, [BOB]),
        ScriptedDice::new(),
    );
    let session = runtime.start_session(ALICE).await.unwrap();
    let before = session.view().await.unwrap().opponents;

    let err = session.add_opponent("bob").await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Roster(RosterError::AlreadyOpponent(BOB))
    ));
    assert_eq!(err.kind(), ErrorKind::AlreadyOpponent);
    assert_eq!(session.view().await.unwrap().opponents, before);

    let err = session.add_opponent("nobody").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let added = session.add_opponent("@carol").await.unwrap();
    assert_eq!(added.id, CAROL);
    assert_eq!(session.view().await.unwrap().opponents.len(), 2);
}

#[tokio::test]
async fn session_rules_reject_invalid_attacks() {
    let store = Arc::new(InMemoryStore::new());
    store.set_hp(CAROL, Hp::ZERO).await.unwrap();
    let runtime = runtime(
        &store,
        directory().with_following(ALICE, [BOB, CAROL]),
        ScriptedDice::new(),
    );
    let session = runtime.start_session(ALICE).await.unwrap();

    let unknown = session.attack(PlayerId(42), "Sword").await.unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::Conflict);

    let defeated = session.attack(CAROL, "Sword").await.unwrap_err();
    assert_eq!(defeated.kind(), ErrorKind::Conflict);

    let blank = session.attack(BOB, "  ").await.unwrap_err();
    assert_eq!(blank.kind(), ErrorKind::Validation);

    assert!(store.recent_attacks(CAROL, 10).await.unwrap().is_empty());
}
