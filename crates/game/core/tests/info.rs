mod common;

use common::{FakeServer, config, run};
use essentials_core::{
    ActionError, ActionKind, CommandError, Engine, MessageKey, Module, NegotiationKind, Notice,
    Outcome, PlayerId, Tick,
};

fn lines(server: &FakeServer, id: PlayerId, key: MessageKey) -> Vec<Notice> {
    server
        .notices()
        .into_iter()
        .filter(|n| n.recipient == id && n.key == key)
        .collect()
}

fn usages(server: &FakeServer, id: PlayerId) -> Vec<String> {
    lines(server, id, MessageKey::HelpLine)
        .iter()
        .filter_map(|n| n.subs.get("usage").map(str::to_string))
        .collect()
}

// ============================================================================
// Rules
// ============================================================================

#[test]
fn rules_are_paged_and_clamped_to_last_page() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let mut cfg = config(5, 50, 30);
    cfg.rules.lines_per_page = 4;
    let mut engine = Engine::new(cfg);

    assert_eq!(
        run(&mut engine, &server, alice, "rules", "", 0),
        Ok(Outcome::Rules { page: 1, pages: 2 })
    );
    let first = lines(&server, alice, MessageKey::RulesLine);
    assert_eq!(first.len(), 4);
    assert_eq!(first[0].subs.get("index"), Some("1"));
    assert_eq!(first[0].subs.get("text"), Some("Be respectful to other players."));

    server.clear_notices();
    assert_eq!(
        run(&mut engine, &server, alice, "rules", "9", 0),
        Ok(Outcome::Rules { page: 2, pages: 2 })
    );
    let second = lines(&server, alice, MessageKey::RulesLine);
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].subs.get("index"), Some("5"));
    let footer = lines(&server, alice, MessageKey::RulesPage);
    assert_eq!(footer[0].subs.get("page"), Some("2"));
    assert_eq!(footer[0].subs.get("total"), Some("2"));
}

#[test]
fn empty_or_disabled_rules() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let mut cfg = config(5, 50, 30);
    cfg.rules.lines.clear();
    let mut engine = Engine::new(cfg.clone());

    assert_eq!(
        run(&mut engine, &server, alice, "rules", "", 0),
        Ok(Outcome::Rules { page: 0, pages: 0 })
    );
    assert_eq!(server.keys_for(alice), vec![MessageKey::NoRules]);

    cfg.rules.enabled = false;
    let mut engine = Engine::new(cfg);
    assert_eq!(
        run(&mut engine, &server, alice, "rules", "", 0),
        Err(CommandError::Action(ActionError::Disabled(Module::Rules)))
    );
}

// ============================================================================
// Info and help
// ============================================================================

#[test]
fn info_lists_enabled_modules() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let mut cfg = config(5, 50, 30);
    cfg.settings_mut(ActionKind::Back).expect("back").enabled = false;
    let mut engine = Engine::new(cfg);

    assert_eq!(run(&mut engine, &server, alice, "essentialsx", "info", 0), Ok(Outcome::Info));
    let info = &lines(&server, alice, MessageKey::Info)[0];
    assert_eq!(info.module, Module::Info);
    assert_eq!(info.subs.get("status"), Some("6/7"));
    assert_eq!(info.subs.get("modules"), Some("home, spawn, tpa, tpr, rules, info"));
    assert!(info.subs.get("version").is_some());
}

#[test]
fn help_hides_disabled_modules_and_admin_page() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let root = server.join(2, "Root", Some("admin"));
    let mut cfg = config(5, 50, 30);
    cfg.settings_mut(ActionKind::Tpr).expect("tpr").enabled = false;
    let mut engine = Engine::new(cfg);

    assert_eq!(run(&mut engine, &server, alice, "essentialsx", "", 0), Ok(Outcome::Help));
    let player_help = usages(&server, alice);
    assert!(player_help.contains(&"/tpa <player>".to_string()));
    assert!(!player_help.contains(&"/tpr <player>".to_string()));
    assert!(!player_help.contains(&"/setspawn".to_string()));
    assert!(!player_help.contains(&"/essentialsx reload".to_string()));

    run(&mut engine, &server, root, "essentialsx", "help", 0).expect("help");
    let admin_help = usages(&server, root);
    assert!(admin_help.contains(&"/setspawn".to_string()));
    assert!(admin_help.contains(&"/essentialsx reload".to_string()));
}

#[test]
fn help_topic_shows_one_section_or_falls_back_to_index() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let mut engine = Engine::new(config(5, 50, 30));

    run(&mut engine, &server, alice, "essentialsx", "help homes", 0).expect("help");
    let sections = lines(&server, alice, MessageKey::HelpSection);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].subs.get("section"), Some("Homes"));
    assert_eq!(usages(&server, alice).len(), 4);

    server.clear_notices();
    run(&mut engine, &server, alice, "essentialsx", "help admin", 0).expect("help");
    assert_eq!(lines(&server, alice, MessageKey::HelpSection).len(), 5);
}

// ============================================================================
// Reload
// ============================================================================

#[test]
fn only_admins_may_request_reload() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let notch = server.join(2, "Notch", None);
    let mut engine = Engine::new(config(5, 50, 30));

    assert_eq!(
        run(&mut engine, &server, alice, "essentialsx", "reload", 0),
        Err(CommandError::Action(ActionError::PermissionDenied))
    );
    assert_eq!(
        run(&mut engine, &server, notch, "essentialsx", "reload", 0),
        Ok(Outcome::ReloadRequested)
    );
    assert!(server.keys_for(notch).contains(&MessageKey::Reloading));
}

#[test]
fn reconfigure_cancels_work_of_disabled_kinds_only() {
    let server = FakeServer::new();
    let alice = server.join(1, "Alice", Some("suplayer"));
    let bob = server.join(2, "Bob", Some("suplayer"));
    let carol = server.join(3, "Carol", Some("suplayer"));
    let mut engine = Engine::new(config(5, 50, 30));

    run(&mut engine, &server, alice, "tpa", "Bob", 0).expect("tpa");
    run(&mut engine, &server, carol, "spawn", "", 0).expect("spawn warmup");
    run(&mut engine, &server, bob, "tpr", "Carol", 0).expect("tpr");

    let mut next = config(5, 50, 30);
    next.settings_mut(ActionKind::Tpa).expect("tpa").enabled = false;
    engine.reconfigure(next, Tick(1), server.env());

    assert!(
        engine
            .registry()
            .outgoing(NegotiationKind::Tpa, alice, Tick(1))
            .is_none()
    );
    assert!(server.keys_for(alice).contains(&MessageKey::Disabled));
    assert!(server.keys_for(bob).contains(&MessageKey::RequestCanceled));
    assert!(engine.warmups().is_busy(carol));
    assert_eq!(engine.registry().len(), 1);
    assert_eq!(
        run(&mut engine, &server, alice, "tpa", "Bob", 2),
        Err(CommandError::Action(ActionError::Disabled(Module::Tpa)))
    );
}
