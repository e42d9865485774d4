//! End-to-end checks of the runtime: chat commands in, notices and teleports
//! out, with the clock advanced by hand.

use essentials_core::{
    ActionError, ActionKind, CommandError, EngineConfig, LocationStore, MessageKey, Notice,
    Outcome, PlayerId, Vec3,
};
use essentials_runtime::{
    Event, FileLocationStore, InMemoryLocationStore, Runtime, RuntimeConfig, RuntimeError,
    RuntimeHandle, SimWorld, Topic,
};
use tokio::sync::broadcast;

const ALICE: PlayerId = PlayerId(1);
const BOB: PlayerId = PlayerId(2);

/// Every verb warms up for 5 ticks and cools down for 20; requests live 30.
fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    for kind in [
        ActionKind::Home,
        ActionKind::Back,
        ActionKind::Spawn,
        ActionKind::Tpa,
        ActionKind::Tpr,
    ] {
        if let Some(settings) = config.settings_mut(kind) {
            settings.warmup_ticks = 5;
            settings.cooldown_ticks = 20;
            settings.request_ttl_ticks = 30;
        }
    }
    config
}

async fn start(store: impl LocationStore + Send + 'static) -> Runtime {
    Runtime::builder()
        .config(RuntimeConfig {
            engine: fast_config(),
            ..RuntimeConfig::default()
        })
        .world(SimWorld::new(64.0).with_liquid_column(50, 50))
        .store(store)
        .build()
        .await
        .expect("runtime should start")
}

async fn join_pair(handle: &RuntimeHandle) {
    handle
        .join(ALICE, "Alice", Some("suplayer"), Vec3::new(0.0, 64.0, 0.0))
        .await
        .expect("alice joins");
    handle
        .join(BOB, "Bob", Some("suplayer"), Vec3::new(30.0, 64.0, -12.0))
        .await
        .expect("bob joins");
}

/// Drains every notice currently buffered on the receiver.
fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::Notice(notice) = event {
            notices.push(notice);
        }
    }
    notices
}

fn keys_for(notices: &[Notice], player: PlayerId) -> Vec<MessageKey> {
    notices
        .iter()
        .filter(|n| n.recipient == player)
        .map(|n| n.key)
        .collect()
}

fn action_error(err: RuntimeError) -> ActionError {
    match err {
        RuntimeError::Command(CommandError::Action(action)) => action,
        other => panic!("expected an action error, got {other:?}"),
    }
}

#[tokio::test]
async fn tpa_negotiation_runs_through_the_worker() {
    let runtime = start(InMemoryLocationStore::new()).await;
    let handle = runtime.handle();
    let mut notices = handle.subscribe(Topic::Notices);
    let mut ticks = handle.subscribe(Topic::Ticks);
    join_pair(&handle).await;

    // ================================================================
    // PHASE 1: Request and accept
    // ================================================================
    let outcome = handle.dispatch(ALICE, "/tpa", "bo").await.expect("request");
    assert_eq!(outcome, Outcome::Requested { receiver: BOB });

    let status = handle.player(ALICE).await.expect("query").expect("alice");
    assert_eq!(status.outgoing.len(), 1);

    let outcome = handle.dispatch(BOB, "tpaccept", "").await.expect("accept");
    assert_eq!(outcome, Outcome::WarmupStarted { ticks: 5 });

    let sent = drain(&mut notices);
    assert!(keys_for(&sent, ALICE).contains(&MessageKey::RequestSent));
    assert!(keys_for(&sent, BOB).contains(&MessageKey::RequestReceived));
    assert!(keys_for(&sent, ALICE).contains(&MessageKey::WarmupStarted));

    // ================================================================
    // PHASE 2: Warmup elapses
    // ================================================================
    let status = handle.player(ALICE).await.expect("query").expect("alice");
    assert_eq!(status.warmup, Some(ActionKind::Tpa));
    assert!(status.outgoing.is_empty());

    assert_eq!(handle.advance(5).await.expect("advance").0, 5);

    let alice = handle.player(ALICE).await.expect("query").expect("alice");
    assert_eq!(alice.position, Vec3::new(30.0, 64.0, -12.0));
    assert!(!alice.is_warming_up());

    match ticks.try_recv() {
        Ok(Event::Tick { report, .. }) => assert_eq!(report.executed, 1),
        other => panic!("expected a tick report, got {other:?}"),
    }
    let done = drain(&mut notices);
    assert!(keys_for(&done, ALICE).contains(&MessageKey::Teleported));
    assert!(keys_for(&done, BOB).contains(&MessageKey::PartnerTeleported));

    // ================================================================
    // PHASE 3: Sender is now on cooldown
    // ================================================================
    let err = handle
        .dispatch(ALICE, "tpa", "Bob")
        .await
        .expect_err("cooldown should reject");
    assert!(matches!(action_error(err), ActionError::OnCooldown { .. }));

    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn movement_cancels_a_home_warmup() {
    let runtime = start(InMemoryLocationStore::new()).await;
    let handle = runtime.handle();
    let mut notices = handle.subscribe(Topic::Notices);
    join_pair(&handle).await;

    handle.dispatch(ALICE, "sethome", "base").await.expect("sethome");
    handle
        .move_player(ALICE, Vec3::new(100.0, 64.0, 100.0))
        .await
        .expect("move");
    handle.dispatch(ALICE, "home", "").await.expect("warmup");

    handle.advance(2).await.expect("advance");
    handle
        .move_player(ALICE, Vec3::new(103.0, 64.0, 100.0))
        .await
        .expect("move");
    handle.advance(10).await.expect("advance");

    let alice = handle.player(ALICE).await.expect("query").expect("alice");
    assert_eq!(alice.position, Vec3::new(103.0, 64.0, 100.0));
    assert_eq!(alice.warmup, None);
    assert!(keys_for(&drain(&mut notices), ALICE).contains(&MessageKey::CanceledMoved));

    // No cooldown was armed by the canceled attempt.
    let retry = handle.dispatch(ALICE, "home", "base").await.expect("retry");
    assert_eq!(retry, Outcome::WarmupStarted { ticks: 5 });

    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn lethal_damage_records_death_point_for_back() {
    let runtime = start(InMemoryLocationStore::new()).await;
    let handle = runtime.handle();
    join_pair(&handle).await;

    let death = Vec3::new(-20.0, 64.0, 8.0);
    handle.move_player(BOB, death).await.expect("move");
    assert_eq!(handle.damage(BOB, 50.0).await.expect("damage"), 0.0);

    let bob = handle.player(BOB).await.expect("query").expect("bob");
    assert_eq!(bob.death_point.map(|l| l.position), Some(death));
    assert_eq!(bob.health, 20.0);
    assert_ne!(bob.position, death);

    handle.dispatch(BOB, "back", "").await.expect("back warmup");
    handle.advance(5).await.expect("advance");

    let bob = handle.player(BOB).await.expect("query").expect("bob");
    assert_eq!(bob.position, death);

    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn disconnect_cancels_partner_warmup() {
    let runtime = start(InMemoryLocationStore::new()).await;
    let handle = runtime.handle();
    let mut notices = handle.subscribe(Topic::Notices);
    join_pair(&handle).await;

    handle.dispatch(ALICE, "tpr", "Bob").await.expect("request");
    handle.dispatch(BOB, "tpraccept", "").await.expect("accept");
    drain(&mut notices);

    handle.leave(ALICE).await.expect("leave");
    handle.advance(10).await.expect("advance");

    let bob = handle.player(BOB).await.expect("query").expect("bob");
    assert_eq!(bob.warmup, None);
    assert_eq!(bob.position, Vec3::new(30.0, 64.0, -12.0));
    assert!(keys_for(&drain(&mut notices), BOB).contains(&MessageKey::PartnerCanceled));

    assert!(matches!(
        handle.leave(ALICE).await,
        Err(RuntimeError::UnknownPlayer(id)) if id == ALICE
    ));

    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn malformed_commands_are_parse_errors() {
    let runtime = start(InMemoryLocationStore::new()).await;
    let handle = runtime.handle();
    let mut notices = handle.subscribe(Topic::Notices);
    join_pair(&handle).await;

    assert!(matches!(
        handle.dispatch(ALICE, "warp", "x").await,
        Err(RuntimeError::Parse(_))
    ));
    assert!(matches!(
        handle.dispatch(ALICE, "tpa", "").await,
        Err(RuntimeError::Parse(_))
    ));

    // Only the missing argument earns a usage reminder.
    let usage = drain(&mut notices);
    assert_eq!(keys_for(&usage, ALICE), vec![MessageKey::Usage]);
    assert_eq!(usage[0].subs.get("usage"), Some("/tpa <player>"));

    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn homes_and_spawn_persist_across_restarts() {
    let dir = tempfile::tempdir().expect("temp dir");

    // ================================================================
    // PHASE 1: First server run
    // ================================================================
    {
        let runtime = start(FileLocationStore::new(dir.path()).expect("store")).await;
        let handle = runtime.handle();
        join_pair(&handle).await;
        handle
            .join(PlayerId(3), "Notch", None, Vec3::new(7.0, 64.0, 7.0))
            .await
            .expect("notch joins");

        handle.dispatch(ALICE, "sethome", "Base").await.expect("sethome");
        let outcome = handle
            .dispatch(PlayerId(3), "setspawn", "")
            .await
            .expect("setspawn");
        assert!(matches!(outcome, Outcome::SpawnSet(_)));

        runtime.shutdown().await.expect("shutdown");
    }

    // ================================================================
    // PHASE 2: Restart picks both up
    // ================================================================
    let runtime = start(FileLocationStore::new(dir.path()).expect("store")).await;
    let handle = runtime.handle();
    join_pair(&handle).await;

    assert_eq!(
        handle.dispatch(ALICE, "homes", "").await.expect("list"),
        Outcome::HomeList(vec!["base".to_string()])
    );

    handle.dispatch(BOB, "spawn", "").await.expect("spawn warmup");
    handle.advance(5).await.expect("advance");
    let bob = handle.player(BOB).await.expect("query").expect("bob");
    assert_eq!(bob.position, Vec3::new(7.0, 64.0, 7.0));

    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn realtime_clock_advances_without_manual_ticks() {
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            tick_interval: Some(std::time::Duration::from_millis(1)),
            ..RuntimeConfig::realtime(fast_config())
        })
        .build()
        .await
        .expect("runtime should start");
    let handle = runtime.handle();

    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
    assert!(handle.now().await.expect("now").0 > 0);

    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn shutdown_completes_while_handle_clones_are_alive() {
    let runtime = start(InMemoryLocationStore::new()).await;
    let handle = runtime.handle();
    join_pair(&handle).await;
    handle.dispatch(ALICE, "tpa", "Bob").await.expect("request");

    tokio::time::timeout(std::time::Duration::from_secs(2), runtime.shutdown())
        .await
        .expect("shutdown should not wait for outstanding handles")
        .expect("shutdown");

    let err = handle.now().await.expect_err("worker is gone");
    assert!(matches!(err, RuntimeError::CommandChannelClosed));
}

// ============================================================================
// Settings reload
// ============================================================================

const ROOT: PlayerId = PlayerId(3);

#[tokio::test]
async fn admin_reload_swaps_settings_and_drops_disabled_requests() {
    let next = std::sync::Arc::new(std::sync::Mutex::new(fast_config()));
    let source = std::sync::Arc::clone(&next);
    let runtime = Runtime::builder()
        .engine_config(fast_config())
        .settings_source(move || Ok(source.lock().expect("settings lock").clone()))
        .build()
        .await
        .expect("runtime should start");
    let handle = runtime.handle();
    let mut notices = handle.subscribe(Topic::Notices);
    join_pair(&handle).await;
    handle
        .join(ROOT, "Root", Some("admin"), Vec3::new(5.0, 64.0, 5.0))
        .await
        .expect("root joins");

    handle.dispatch(ALICE, "tpa", "Bob").await.expect("request");
    next.lock()
        .expect("settings lock")
        .settings_mut(ActionKind::Tpa)
        .expect("tpa")
        .enabled = false;

    let err = handle
        .dispatch(ALICE, "essentialsx", "reload")
        .await
        .expect_err("players may not reload");
    assert_eq!(action_error(err), ActionError::PermissionDenied);

    assert_eq!(
        handle.dispatch(ROOT, "essentialsx", "reload").await.expect("reload"),
        Outcome::ReloadRequested
    );
    let sent = drain(&mut notices);
    assert_eq!(
        keys_for(&sent, ROOT),
        vec![MessageKey::Reloading, MessageKey::Reloaded]
    );
    assert!(keys_for(&sent, BOB).contains(&MessageKey::RequestCanceled));

    let alice = handle.player(ALICE).await.expect("query").expect("alice");
    assert!(alice.outgoing.is_empty());
    let err = handle.dispatch(ALICE, "tpa", "Bob").await.expect_err("disabled");
    assert!(matches!(action_error(err), ActionError::Disabled(_)));

    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn reload_keeps_old_settings_when_it_cannot_apply() {
    let runtime = start(InMemoryLocationStore::new()).await;
    let handle = runtime.handle();
    assert!(matches!(
        handle.reload().await,
        Err(RuntimeError::ReloadUnavailable)
    ));
    runtime.shutdown().await.expect("shutdown");

    let runtime = Runtime::builder()
        .engine_config(fast_config())
        .settings_source(|| {
            let mut config = fast_config();
            config.tick_rate_hz = 20;
            Ok(config)
        })
        .build()
        .await
        .expect("runtime should start");
    let handle = runtime.handle();
    let mut notices = handle.subscribe(Topic::Notices);
    handle
        .join(ROOT, "Root", Some("admin"), Vec3::new(5.0, 64.0, 5.0))
        .await
        .expect("root joins");

    let err = handle
        .dispatch(ROOT, "essentialsx", "reload")
        .await
        .expect_err("tick rate is fixed");
    assert!(matches!(
        err,
        RuntimeError::TickRateChanged { from: 10, to: 20 }
    ));
    assert_eq!(
        keys_for(&drain(&mut notices), ROOT),
        vec![MessageKey::Reloading, MessageKey::ReloadFailed]
    );

    runtime.shutdown().await.expect("shutdown");
}
