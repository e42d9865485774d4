mod common;

use common::{FakeServer, GROUND_Y, advance, config, run};
use essentials_core::{
    ActionError, ActionKind, CommandError, Engine, HomeError, MessageKey, Outcome, Tick, Vec3,
};

fn home_err(result: Result<Outcome, CommandError>) -> HomeError {
    match result {
        Err(CommandError::Home(err)) => err,
        other => panic!("expected home error, got {other:?}"),
    }
}

fn action_err(result: Result<Outcome, CommandError>) -> ActionError {
    match result {
        Err(CommandError::Action(err)) => err,
        other => panic!("expected action error, got {other:?}"),
    }
}

// ============================================================================
// sethome / delhome / homes
// ============================================================================

#[test]
fn role_limit_caps_number_of_homes() {
    let server = FakeServer::new();
    let crafter = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(0, 10, 30));

    run(&mut engine, &server, crafter, "sethome", "one", 0).expect("first home");
    run(&mut engine, &server, crafter, "sethome", "two", 0).expect("second home");
    assert_eq!(
        home_err(run(&mut engine, &server, crafter, "sethome", "three", 0)),
        HomeError::LimitReached { limit: 2 }
    );
    assert_eq!(server.homes_of(crafter).len(), 2);
    assert!(server.keys_for(crafter).contains(&MessageKey::LimitReached));
}

#[test]
fn players_without_role_cannot_set_homes() {
    let server = FakeServer::new();
    let nobody = server.join(1, "Alice", None);
    let mut engine = Engine::new(config(0, 10, 30));

    assert_eq!(
        home_err(run(&mut engine, &server, nobody, "sethome", "base", 0)),
        HomeError::LimitReached { limit: 0 }
    );
}

#[test]
fn player_override_beats_role_limit() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let mut cfg = config(0, 10, 30);
    cfg.homes.player_overrides.insert("alice".into(), 3);
    let mut engine = Engine::new(cfg);

    for name in ["a", "b", "c"] {
        run(&mut engine, &server, alice, "sethome", name, 0).expect("home within override");
    }
    assert_eq!(server.homes_of(alice).len(), 3);
}

#[test]
fn home_names_are_validated_and_case_folded() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(0, 10, 30));

    assert_eq!(
        home_err(run(&mut engine, &server, alice, "sethome", "bad/name", 0)),
        HomeError::InvalidName
    );
    assert_eq!(
        home_err(run(&mut engine, &server, alice, "sethome", &"x".repeat(25), 0)),
        HomeError::NameTooLong { max: 24 }
    );

    assert_eq!(
        run(&mut engine, &server, alice, "sethome", "\"My Base\"", 0),
        Ok(Outcome::HomeSaved("my base".into()))
    );
    assert_eq!(
        home_err(run(&mut engine, &server, alice, "sethome", "MY BASE", 0)),
        HomeError::DuplicateName("my base".into())
    );
}

#[test]
fn sethome_requires_solid_dry_ground() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(0, 10, 30));

    server.move_to(alice, Vec3::new(0.0, GROUND_Y + 10.0, 0.0));
    assert_eq!(
        home_err(run(&mut engine, &server, alice, "sethome", "sky", 0)),
        HomeError::NotOnGround
    );

    server.move_to(alice, Vec3::new(0.0, GROUND_Y, 0.0));
    server.liquid.set(true);
    assert_eq!(
        home_err(run(&mut engine, &server, alice, "sethome", "pond", 0)),
        HomeError::InLiquid
    );
    assert!(server.homes_of(alice).is_empty());
}

#[test]
fn delhome_and_listing() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(0, 10, 30));

    run(&mut engine, &server, alice, "sethome", "mine", 0).expect("home");
    run(&mut engine, &server, alice, "sethome", "farm", 0).expect("home");
    assert_eq!(
        run(&mut engine, &server, alice, "homes", "", 0),
        Ok(Outcome::HomeList(vec!["farm".into(), "mine".into()]))
    );

    assert_eq!(
        run(&mut engine, &server, alice, "delhome", "FARM", 0),
        Ok(Outcome::HomeDeleted("farm".into()))
    );
    assert_eq!(
        home_err(run(&mut engine, &server, alice, "delhome", "farm", 0)),
        HomeError::NoSuchHome("farm".into())
    );
    assert_eq!(server.homes_of(alice).names(), vec!["mine".to_string()]);

    let list = server
        .notices()
        .into_iter()
        .filter(|n| n.key == MessageKey::HomeList)
        .last()
        .expect("listing notice");
    assert_eq!(list.subs.get("count"), Some("2"));
    assert_eq!(list.subs.get("list"), Some("farm, mine"));
}

// ============================================================================
// home
// ============================================================================

#[test]
fn bare_home_uses_last_used_home() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(0, 0, 30));

    server.move_to(alice, Vec3::new(1.0, GROUND_Y, 1.0));
    run(&mut engine, &server, alice, "sethome", "first", 0).expect("home");
    server.move_to(alice, Vec3::new(2.0, GROUND_Y, 2.0));
    run(&mut engine, &server, alice, "sethome", "second", 0).expect("home");

    run(&mut engine, &server, alice, "home", "first", 1).expect("named home");
    assert_eq!(server.homes_of(alice).last_used.as_deref(), Some("first"));

    server.move_to(alice, Vec3::new(50.0, GROUND_Y, 50.0));
    run(&mut engine, &server, alice, "home", "", 2).expect("last used home");
    assert_eq!(server.position_of(alice), Vec3::new(1.0, GROUND_Y, 1.0));
}

#[test]
fn home_without_any_home_has_no_destination() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(0, 0, 30));

    assert_eq!(
        action_err(run(&mut engine, &server, alice, "home", "", 0)),
        ActionError::NoDestination
    );
    assert_eq!(
        home_err(run(&mut engine, &server, alice, "home", "nowhere", 0)),
        HomeError::NoSuchHome("nowhere".into())
    );
}

#[test]
fn home_warmup_executes_after_duration() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(5, 10, 30));

    server.move_to(alice, Vec3::new(7.0, GROUND_Y, 7.0));
    run(&mut engine, &server, alice, "sethome", "base", 0).expect("home");
    server.move_to(alice, Vec3::new(300.0, GROUND_Y, 0.0));

    assert_eq!(
        run(&mut engine, &server, alice, "home", "base", 10),
        Ok(Outcome::WarmupStarted { ticks: 5 })
    );
    advance(&mut engine, &server, 11, 14);
    assert!(server.teleports().is_empty());

    let report = engine.tick(Tick(15), server.env());
    assert_eq!(report.executed, 1);
    assert_eq!(server.position_of(alice), Vec3::new(7.0, GROUND_Y, 7.0));
    assert!(!engine.ledger().is_ready(alice, ActionKind::Home, Tick(16)));
    assert!(server.keys_for(alice).contains(&MessageKey::Teleported));
}

#[test]
fn damage_during_warmup_cancels_and_tags_player() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(5, 10, 30));

    run(&mut engine, &server, alice, "sethome", "base", 0).expect("home");
    run(&mut engine, &server, alice, "home", "base", 0).expect("warmup");
    server.set_health(alice, 15.0);
    let report = engine.tick(Tick(1), server.env());
    assert_eq!(report.canceled, 1);
    assert!(server.keys_for(alice).contains(&MessageKey::CanceledDamaged));

    // Combat tag lasts five seconds from the hit.
    match action_err(run(&mut engine, &server, alice, "home", "base", 2)) {
        ActionError::CombatTagged { seconds } => assert_eq!(seconds, 5),
        other => panic!("expected combat tag, got {other:?}"),
    }
    assert!(matches!(
        action_err(run(&mut engine, &server, alice, "sethome", "other", 2)),
        ActionError::CombatTagged { .. }
    ));
    assert_eq!(
        run(&mut engine, &server, alice, "home", "base", 51),
        Ok(Outcome::WarmupStarted { ticks: 5 })
    );
}

#[test]
fn combat_tag_survives_reconnect() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(5, 10, 30));

    run(&mut engine, &server, alice, "sethome", "base", 0).expect("home");
    engine.on_damaged(alice, Tick(1));
    // Log out and straight back in.
    engine.on_disconnect(alice, server.env());

    assert!(matches!(
        action_err(run(&mut engine, &server, alice, "home", "base", 2)),
        ActionError::CombatTagged { .. }
    ));
    assert_eq!(
        run(&mut engine, &server, alice, "home", "base", 101),
        Ok(Outcome::WarmupStarted { ticks: 5 })
    );
}

#[test]
fn small_health_jitter_does_not_cancel() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("crplayer"));
    let mut engine = Engine::new(config(3, 10, 30));

    run(&mut engine, &server, alice, "sethome", "base", 0).expect("home");
    run(&mut engine, &server, alice, "home", "base", 0).expect("warmup");
    server.set_health(alice, 19.995);
    advance(&mut engine, &server, 1, 3);
    assert_eq!(server.teleports().len(), 1);
}

// ============================================================================
// back / spawn
// ============================================================================

#[test]
fn back_returns_to_death_point() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let mut engine = Engine::new(config(0, 100, 30));

    assert_eq!(
        action_err(run(&mut engine, &server, alice, "back", "", 0)),
        ActionError::NoDestination
    );

    let died_at = Vec3::new(-20.0, GROUND_Y, 33.0);
    engine.on_death(alice, died_at, server.env());
    assert_eq!(engine.death_point(alice).map(|l| l.position), Some(died_at));
    assert!(server.keys_for(alice).contains(&MessageKey::DeathSaved));

    run(&mut engine, &server, alice, "back", "", 1).expect("back");
    assert_eq!(server.position_of(alice), died_at);
    assert!(matches!(
        action_err(run(&mut engine, &server, alice, "back", "", 2)),
        ActionError::OnCooldown { .. }
    ));
}

#[test]
fn death_point_survives_disconnect() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let mut engine = Engine::new(config(0, 100, 30));

    engine.on_death(alice, Vec3::new(5.0, GROUND_Y, 5.0), server.env());
    engine.on_disconnect(alice, server.env());
    assert!(engine.death_point(alice).is_some());
}

#[test]
fn safe_teleport_drops_to_ground_below() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let mut cfg = config(0, 100, 30);
    cfg.settings_mut(ActionKind::Back)
        .expect("back settings")
        .safe_teleport = true;
    let mut engine = Engine::new(cfg);

    engine.on_death(alice, Vec3::new(3.0, GROUND_Y + 6.0, 3.0), server.env());
    run(&mut engine, &server, alice, "back", "", 0).expect("back");
    assert_eq!(server.position_of(alice), Vec3::new(3.0, GROUND_Y, 3.0));
}

#[test]
fn setspawn_requires_permission_and_persists() {
    let server = FakeServer::new();
    let admin = server.join(1, "Root", Some("admin"));
    let alice = server.join(2, "Alice", Some("suplayer"));
    let mut engine = Engine::new(config(0, 100, 30));

    assert_eq!(
        action_err(run(&mut engine, &server, alice, "setspawn", "", 0)),
        ActionError::PermissionDenied
    );

    server.move_to(admin, Vec3::new(8.0, GROUND_Y, 8.0));
    run(&mut engine, &server, admin, "setspawn", "", 0).expect("setspawn");
    assert_eq!(
        server.saved_spawn().map(|l| l.position),
        Some(Vec3::new(8.0, GROUND_Y, 8.0))
    );

    run(&mut engine, &server, alice, "spawn", "", 1).expect("spawn");
    assert_eq!(server.position_of(alice), Vec3::new(8.0, GROUND_Y, 8.0));

    // A fresh engine picks the stored spawn up on init.
    let mut restarted = Engine::new(config(0, 100, 30));
    restarted.init(server.env()).expect("init");
    assert_eq!(
        restarted.custom_spawn().map(|l| l.position),
        Some(Vec3::new(8.0, GROUND_Y, 8.0))
    );
}

#[test]
fn spawn_without_any_spawn_point_has_no_destination() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    server.default_spawn.set(None);
    let mut engine = Engine::new(config(0, 100, 30));

    assert_eq!(
        action_err(run(&mut engine, &server, alice, "spawn", "", 0)),
        ActionError::NoDestination
    );
    assert!(engine.ledger().is_empty());
}
